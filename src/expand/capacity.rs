//! Page capacity arithmetic. Pure: no table is touched here.
//!
//! Capacities are in rows. The first page may hold a different number of rows
//! than every following ("steady") page; both must be whole multiples of the
//! rows one item occupies, otherwise an item would straddle a page boundary.

use crate::config::LoopConfig;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapacityPlan {
    pub items: usize,
    pub rows_per_item: usize,
    pub first_rows: usize,
    pub steady_rows: usize,
    pub footer_rows: usize,
    pub reduce: usize,
}

/// Padding needed to close the last page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillPlan {
    None,
    /// Pad the current page with this many rows.
    Rows(usize),
    /// The footer does not fit: pad the current page to capacity, break, then
    /// pad the next page up to where the footer starts.
    SplitFooter { current: usize, next: usize },
}

impl CapacityPlan {
    /// `first_rows` of 0 means the first page holds as much as any other.
    pub fn new(
        tag: &str,
        items: usize,
        rows_per_item: usize,
        first_rows: usize,
        steady_rows: usize,
    ) -> Result<Self, Error> {
        if rows_per_item == 0 {
            return Err(Error::config(tag, "rows per item must be at least 1"));
        }
        if steady_rows == 0 {
            return Err(Error::config(tag, "page capacity must be at least 1 row"));
        }
        let first_rows = if first_rows == 0 { steady_rows } else { first_rows };
        if rows_per_item > first_rows {
            return Err(Error::config(
                tag,
                format!("{rows_per_item} rows per item exceed the first page capacity of {first_rows}"),
            ));
        }
        if first_rows % rows_per_item != 0 {
            return Err(Error::config(
                tag,
                format!("first page capacity {first_rows} is not a multiple of {rows_per_item} rows per item"),
            ));
        }
        if steady_rows % rows_per_item != 0 {
            return Err(Error::config(
                tag,
                format!("page capacity {steady_rows} is not a multiple of {rows_per_item} rows per item"),
            ));
        }
        Ok(Self {
            items,
            rows_per_item,
            first_rows,
            steady_rows,
            footer_rows: 0,
            reduce: 0,
        })
    }

    pub fn for_config(config: &LoopConfig, items: usize, default_steady: usize) -> Result<Self, Error> {
        let plan = Self::new(
            &config.tag,
            items,
            config.rows_per_item,
            config.first_rows,
            config.steady_rows.unwrap_or(default_steady),
        )?;
        Ok(plan.with_footer(config.external_footer, config.reduce))
    }

    pub fn with_footer(mut self, footer_rows: usize, reduce: usize) -> Self {
        self.footer_rows = footer_rows;
        self.reduce = reduce;
        self
    }

    pub fn first_page_items(&self) -> usize {
        self.first_rows / self.rows_per_item
    }

    pub fn steady_page_items(&self) -> usize {
        self.steady_rows / self.rows_per_item
    }

    pub fn page_count(&self) -> usize {
        let rows = self.items * self.rows_per_item;
        if rows <= self.first_rows {
            1
        } else {
            1 + (rows - self.first_rows).div_ceil(self.steady_rows)
        }
    }

    pub fn on_first_page(&self, index: usize) -> bool {
        index < self.first_page_items()
    }

    /// True when item `index` (0-based) is the first item of a page.
    pub fn is_page_start(&self, index: usize) -> bool {
        let first = self.first_page_items();
        index == 0 || (index >= first && (index - first) % self.steady_page_items() == 0)
    }

    pub fn page_of(&self, index: usize) -> usize {
        let first = self.first_page_items();
        if index < first {
            0
        } else {
            1 + (index - first) / self.steady_page_items()
        }
    }

    pub fn page_capacity_rows(&self, page: usize) -> usize {
        if page == 0 { self.first_rows } else { self.steady_rows }
    }

    /// Padding for a last page that already holds `rows_written` rows.
    /// The reduce margin only shrinks padding; whether the footer moves to a
    /// new page depends on the footer size alone.
    pub fn last_page_fill(&self, page: usize, rows_written: usize) -> FillPlan {
        let capacity = self.page_capacity_rows(page);
        if self.footer_rows > 0 && rows_written + self.footer_rows > capacity {
            return FillPlan::SplitFooter {
                current: capacity.saturating_sub(rows_written),
                next: self
                    .steady_rows
                    .saturating_sub(self.footer_rows + self.reduce),
            };
        }
        match capacity.checked_sub(rows_written + self.footer_rows + self.reduce) {
            Some(n) if n > 0 => FillPlan::Rows(n),
            _ => FillPlan::None,
        }
    }
}
