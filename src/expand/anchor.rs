//! Locating loop anchors and cutting a template table into its parts.
//!
//! A table template looks like this (one item = `rows_per_item` rows):
//!
//! ```text
//! header rows        copied to the top of every page
//! {{tag}} row        removed, unless the row also carries [placeholders]
//! item rows          cloned once per item
//! leftover rows      dropped, but counted for the default page capacity
//! ```
//!
//! With `<tag>_remove_next_line` the row right below the item rows is cut
//! from the template: it neither counts toward the capacity nor starts the
//! sub-template region.
//!
//! An optional sub-template (`{{tag_sub}}`) below the item rows turns every
//! row between the item rows and the sub-anchor into the sub-table's header.

use crate::config::LoopConfig;
use crate::error::Error;
use crate::model::{Table, TableRow};
use crate::render::delimited;
use crate::scope::Scope;

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateAnchor {
    pub tag: String,
    pub row: usize,
    pub cell: usize,
    /// Item content starts on the anchor's own row instead of the row below.
    pub on_same_line: bool,
}

impl TemplateAnchor {
    /// First loop marker in the table, scanning rows top to bottom.
    pub fn find_first(table: &Table) -> Option<Self> {
        Self::scan(&table.rows, |_| true)
    }

    pub fn find(rows: &[TableRow], tag: &str) -> Option<Self> {
        Self::scan(rows, |t| t == tag)
    }

    fn scan(rows: &[TableRow], accept: impl Fn(&str) -> bool) -> Option<Self> {
        for (ri, row) in rows.iter().enumerate() {
            for (ci, cell) in row.cells.iter().enumerate() {
                let text = cell.text();
                if let Some(tag) = loop_markers(&text).into_iter().find(|t| accept(t)) {
                    let on_same_line = row
                        .cells
                        .iter()
                        .any(|c| !delimited(&c.text(), "[", "]").is_empty());
                    return Some(Self {
                        tag: tag.to_string(),
                        row: ri,
                        cell: ci,
                        on_same_line,
                    });
                }
            }
        }
        None
    }

    pub fn first_template_row(&self) -> usize {
        if self.on_same_line { self.row } else { self.row + 1 }
    }

    fn marker(&self) -> String {
        format!("{{{{{}}}}}", self.tag)
    }
}

/// Loop tag names written as `{{name}}` in the text.
pub fn loop_markers(text: &str) -> Vec<&str> {
    delimited(text, "{{", "}}")
        .into_iter()
        .map(|(_, tag)| tag)
        .collect()
}

/// A table template split into the parts the paginator works with.
#[derive(Clone, Debug)]
pub struct LoopTemplate {
    pub config: LoopConfig,
    /// Row-less copy of the source table carrying grid and table properties.
    pub table: Table,
    pub header: Vec<TableRow>,
    pub group: Vec<TableRow>,
    /// Capacity used when `<tag>_number` is absent: the rows the template
    /// table reserves below its header.
    pub default_steady_rows: usize,
    pub sub: Option<Box<LoopTemplate>>,
}

impl LoopTemplate {
    pub fn from_table(table: &Table, anchor: &TemplateAnchor, scope: &Scope) -> Result<Self, Error> {
        Self::from_rows(table, &table.rows, anchor, scope)
    }

    fn from_rows(
        table: &Table,
        rows: &[TableRow],
        anchor: &TemplateAnchor,
        scope: &Scope,
    ) -> Result<Self, Error> {
        let config = LoopConfig::resolve(&anchor.tag, scope)?;
        let tag = &anchor.tag;
        let rows_per_item = config.rows_per_item;
        if rows_per_item == 0 {
            return Err(Error::config(tag, "rows per item must be at least 1"));
        }

        let header = rows[..anchor.row].to_vec();
        let header_table = Table {
            rows: header.clone(),
            ..table.empty_like()
        };
        if let Some((ri, ci)) = header_table.merge_violation() {
            return Err(Error::structural(
                tag,
                format!("header cell {ci} of row {ri} continues a vertical merge that never started"),
            ));
        }

        let group_start = anchor.first_template_row();
        let group_end = group_start + rows_per_item;
        if group_end > rows.len() {
            return Err(Error::structural(
                tag,
                format!(
                    "template needs {rows_per_item} item rows from row {group_start}, table has {}",
                    rows.len()
                ),
            ));
        }
        let mut group = rows[group_start..group_end].to_vec();
        if anchor.on_same_line {
            strip_marker(&mut group[0], anchor.cell, &anchor.marker());
        }

        let removed = usize::from(config.remove_next_line && group_end < rows.len());
        let sub_tag = config.sub_tag();
        let tail = &rows[group_end + removed..];
        let (sub, region_end) = match TemplateAnchor::find(tail, &sub_tag) {
            Some(sub_anchor) => {
                let sub = Self::from_rows(table, tail, &sub_anchor, scope)?;
                (Some(Box::new(sub)), group_end)
            }
            None => (None, rows.len() - removed),
        };

        let tag_row = usize::from(!anchor.on_same_line);
        let default_steady_rows = region_end - tag_row - header.len();

        Ok(Self {
            table: table.empty_like(),
            config,
            header,
            group,
            default_steady_rows,
            sub,
        })
    }

    pub fn rows_per_item(&self) -> usize {
        self.group.len()
    }

    /// A new page: the table properties plus a fresh copy of the header rows.
    pub fn new_page(&self) -> Table {
        Table {
            rows: self.header.clone(),
            ..self.table.empty_like()
        }
    }

    pub fn grid_columns(&self) -> usize {
        let with_group = Table {
            rows: self.group.clone(),
            ..self.table.empty_like()
        };
        with_group.grid_columns()
    }
}

fn strip_marker(row: &mut TableRow, cell: usize, marker: &str) {
    let Some(cell) = row.cells.get_mut(cell) else {
        return;
    };
    for para in &mut cell.paragraphs {
        for run in &mut para.runs {
            if run.text.contains(marker) {
                run.text = run.text.replace(marker, "");
            }
        }
    }
}
