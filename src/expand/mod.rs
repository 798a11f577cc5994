//! Row-loop expansion: one template row group in, paginated table blocks out.
//!
//! Nothing is edited in place. A [`Paginator`] builds the replacement blocks
//! (`Table`, `PageBreak`, `Table`, ...) from the template parts and the caller
//! splices them into the document in one step, so no row index is ever reused
//! after the table it pointed into has changed.

pub mod anchor;
pub mod capacity;
mod fill;
mod merge;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::FillMode;
use crate::error::Error;
use crate::model::{Block, CellBorder, Document, Table};
use crate::render::CellRenderer;
use crate::scope::{Scope, item_frame};

pub use anchor::{LoopTemplate, TemplateAnchor, loop_markers};
pub use capacity::{CapacityPlan, FillPlan};

/// What one loop tag expanded into.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExpansionReport {
    pub tag: String,
    pub items: usize,
    pub nested_items: usize,
    /// Table blocks emitted, sub-tables included.
    pub pages: usize,
    pub fill_rows: usize,
}

/// Keep the reports for `tags`; an empty selection keeps all of them.
pub fn select_reports(reports: Vec<ExpansionReport>, tags: &[String]) -> Vec<ExpansionReport> {
    if tags.is_empty() {
        return reports;
    }
    reports.into_iter().filter(|r| tags.contains(&r.tag)).collect()
}

pub struct Expansion {
    pub blocks: Vec<Block>,
    pub report: ExpansionReport,
}

/// Expand every loop table of the document in place.
///
/// The environment is only read. On error the document may be half rewritten
/// and must be discarded.
pub fn render_document(
    doc: &mut Document,
    env: &Map<String, Value>,
    renderer: &mut dyn CellRenderer,
) -> Result<Vec<ExpansionReport>, Error> {
    let root = Scope::root(env);
    let mut reports = Vec::new();
    let mut i = 0;
    while i < doc.blocks.len() {
        let expansion = match &doc.blocks[i] {
            Block::Table(table) => match TemplateAnchor::find_first(table) {
                Some(anchor) => expand_table(table, &anchor, &root, renderer)?,
                None => {
                    i += 1;
                    continue;
                }
            },
            Block::Paragraph(p) => {
                let text = p.text();
                if let Some(tag) = loop_markers(&text)
                    .into_iter()
                    .find(|t| matches!(root.get(t), Some(Value::Array(_))))
                {
                    return Err(Error::structural(tag, "loop tag is not inside a table cell"));
                }
                i += 1;
                continue;
            }
            Block::PageBreak => {
                i += 1;
                continue;
            }
        };

        let produced = expansion.blocks.len();
        doc.blocks.splice(i..=i, expansion.blocks);
        i += produced;
        log::info!(
            "Expanded '{}': items={} nested={} pages={} fill_rows={}",
            expansion.report.tag,
            expansion.report.items,
            expansion.report.nested_items,
            expansion.report.pages,
            expansion.report.fill_rows,
        );
        reports.push(expansion.report);
    }
    Ok(reports)
}

/// Expand one template table using the data bound to the anchor's tag.
pub fn expand_table(
    table: &Table,
    anchor: &TemplateAnchor,
    scope: &Scope,
    renderer: &mut dyn CellRenderer,
) -> Result<Expansion, Error> {
    let template = LoopTemplate::from_table(table, anchor, scope)?;
    let pages = expand_template(&template, scope.get(&anchor.tag), scope, renderer)?;
    let report = ExpansionReport {
        tag: anchor.tag.clone(),
        items: pages.items,
        nested_items: pages.nested_items,
        pages: pages.blocks.iter().filter(|b| matches!(b, Block::Table(_))).count(),
        fill_rows: pages.fill_rows,
    };
    Ok(Expansion {
        blocks: pages.blocks,
        report,
    })
}

struct Pages {
    blocks: Vec<Block>,
    items: usize,
    nested_items: usize,
    fill_rows: usize,
}

fn expand_template(
    template: &LoopTemplate,
    data: Option<&Value>,
    scope: &Scope,
    renderer: &mut dyn CellRenderer,
) -> Result<Pages, Error> {
    let config = &template.config;
    let items: &[Value] = match data {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(other) if config.lenient => {
            log::warn!(
                "Loop '{}' bound to {} instead of a list; dropping its template rows",
                config.tag,
                json_type(other)
            );
            let page = template.new_page();
            let blocks = if page.rows.is_empty() {
                Vec::new()
            } else {
                vec![Block::Table(page)]
            };
            return Ok(Pages {
                blocks,
                items: 0,
                nested_items: 0,
                fill_rows: 0,
            });
        }
        Some(other) => {
            return Err(Error::data_type(
                &config.tag,
                format!("expected a list, found {}", json_type(other)),
            ));
        }
    };

    let plan = CapacityPlan::for_config(config, items.len(), template.default_steady_rows)?;
    log::debug!(
        "Loop '{}': items={} rows_per_item={} first={} steady={} planned_pages={}",
        config.tag,
        items.len(),
        plan.rows_per_item,
        plan.first_rows,
        plan.steady_rows,
        plan.page_count(),
    );
    Paginator::new(template, plan).run(items, scope, renderer)
}

/// Page-by-page builder for one loop. Nested loops get their own paginator.
struct Paginator<'t> {
    template: &'t LoopTemplate,
    plan: CapacityPlan,
    merge_columns: Vec<usize>,
    grid_columns: usize,
    blocks: Vec<Block>,
    /// Page under construction; `None` right after a sub-table closed it.
    current: Option<Table>,
    page: usize,
    rows_on_page: usize,
    groups_on_page: usize,
    nested_items: usize,
    fill_rows: usize,
}

impl<'t> Paginator<'t> {
    fn new(template: &'t LoopTemplate, plan: CapacityPlan) -> Self {
        Self {
            template,
            plan,
            merge_columns: merge::merge_columns(&template.group),
            grid_columns: template.grid_columns(),
            blocks: Vec::new(),
            current: Some(template.new_page()),
            page: 0,
            rows_on_page: 0,
            groups_on_page: 0,
            nested_items: 0,
            fill_rows: 0,
        }
    }

    fn run(
        mut self,
        items: &[Value],
        scope: &Scope,
        renderer: &mut dyn CellRenderer,
    ) -> Result<Pages, Error> {
        let template = self.template;
        let rows_per_item = template.rows_per_item();
        for (i, item) in items.iter().enumerate() {
            if self.current.is_none() {
                self.blocks.push(Block::PageBreak);
                self.open_page();
            } else if self.rows_on_page + rows_per_item > self.plan.page_capacity_rows(self.page) {
                debug_assert!(template.sub.is_some() || self.plan.is_page_start(i));
                self.break_page();
            }

            let has_next = i + 1 < items.len();
            let item_scope = scope.child(item_frame(item, i, has_next));
            self.push_item(&item_scope, renderer)?;

            if let Some(sub) = &template.sub {
                self.expand_sub(sub, item, &item_scope, renderer)?;
            }
        }
        Ok(self.finish(items.len()))
    }

    fn push_item(&mut self, scope: &Scope, renderer: &mut dyn CellRenderer) -> Result<(), Error> {
        let template = self.template;
        let mut rows = template.group.clone();
        let continue_previous = template.config.vmerge && self.groups_on_page > 0;
        merge::apply_group_merge(&mut rows, &self.merge_columns, continue_previous);
        for row in &mut rows {
            for cell in &mut row.cells {
                renderer.render_cell(cell, scope)?;
            }
        }
        self.rows_on_page += rows.len();
        self.groups_on_page += 1;
        self.current
            .get_or_insert_with(|| template.new_page())
            .rows
            .extend(rows);
        Ok(())
    }

    /// Emit the sub-table blocks for one item's nested collection. The outer
    /// page is padded to capacity and closed before them; the next outer item
    /// opens a new page.
    fn expand_sub(
        &mut self,
        sub: &LoopTemplate,
        item: &Value,
        item_scope: &Scope,
        renderer: &mut dyn CellRenderer,
    ) -> Result<(), Error> {
        let nested = match item {
            Value::Object(fields) => fields.get(&self.template.config.sub_key),
            _ => None,
        };
        match nested {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Array(list)) if list.is_empty() => return Ok(()),
            _ => {}
        }

        let inner = expand_template(sub, nested, item_scope, renderer)?;
        if inner.blocks.is_empty() {
            return Ok(());
        }
        log::debug!(
            "Loop '{}': item on page {} carries {} nested items",
            self.template.config.tag,
            self.page + 1,
            inner.items
        );
        if self.template.config.fill != FillMode::None {
            let capacity = self.plan.page_capacity_rows(self.page);
            self.pad(capacity.saturating_sub(self.rows_on_page));
        }
        self.close_page();
        self.blocks.push(Block::PageBreak);
        self.blocks.extend(inner.blocks);
        self.nested_items += inner.items + inner.nested_items;
        self.fill_rows += inner.fill_rows;
        self.page += 1;
        Ok(())
    }

    fn open_page(&mut self) {
        self.current = Some(self.template.new_page());
        self.rows_on_page = 0;
        self.groups_on_page = 0;
    }

    fn close_page(&mut self) {
        let Some(mut table) = self.current.take() else {
            return;
        };
        if self.template.config.bottom_border_from_page_two && self.page >= 1 {
            if let Some(last) = table.rows.last_mut() {
                last.set_bottom_border(CellBorder::visible(None, 0.5));
            }
        }
        self.blocks.push(Block::Table(table));
    }

    fn break_page(&mut self) {
        log::debug!(
            "Loop '{}': page {} closed with {} rows",
            self.template.config.tag,
            self.page + 1,
            self.rows_on_page
        );
        self.close_page();
        self.blocks.push(Block::PageBreak);
        self.page += 1;
        self.open_page();
    }

    fn pad(&mut self, count: usize) {
        let config = &self.template.config;
        let rows = fill::fill_rows(
            &self.template.group,
            count,
            config.fill,
            &config.blank_text,
            self.grid_columns,
        );
        self.fill_rows += rows.len();
        self.rows_on_page += rows.len();
        if let Some(table) = self.current.as_mut() {
            table.rows.extend(rows);
        }
    }

    fn finish(mut self, items: usize) -> Pages {
        if self.current.is_some() && self.template.config.fill != FillMode::None {
            let plan = self.plan.last_page_fill(self.page, self.rows_on_page);
            log::debug!(
                "Loop '{}': last page {} holds {} rows, fill {:?}",
                self.template.config.tag,
                self.page + 1,
                self.rows_on_page,
                plan
            );
            match plan {
                FillPlan::None => {}
                FillPlan::Rows(n) => self.pad(n),
                FillPlan::SplitFooter { current, next } => {
                    self.pad(current);
                    self.break_page();
                    self.pad(next);
                }
            }
        }
        self.close_page();
        Pages {
            blocks: self.blocks,
            items,
            nested_items: self.nested_items,
            fill_rows: self.fill_rows,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
