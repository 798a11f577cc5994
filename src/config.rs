use serde_json::Value;

use crate::error::Error;
use crate::scope::Scope;

pub const DEFAULT_BLANK_TEXT: &str = "below is blank";
pub const DEFAULT_SUB_KEY: &str = "children";

/// How the remainder of the last page is padded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FillMode {
    /// Only drop the unused template rows.
    None,
    /// Empty copies of the template row.
    Blank,
    /// Blank rows merged into one cell crossed by a diagonal line.
    Diagonal,
    /// Blank rows merged into one cell carrying a marker text.
    Marker,
}

impl FillMode {
    fn from_id(id: u64) -> Option<Self> {
        match id {
            0 => Some(FillMode::None),
            1 => Some(FillMode::Blank),
            2 => Some(FillMode::Diagonal),
            3 => Some(FillMode::Marker),
            _ => None,
        }
    }
}

/// Everything that shapes one loop tag's expansion, read from `<tag>_*` keys.
#[derive(Clone, Debug, PartialEq)]
pub struct LoopConfig {
    pub tag: String,
    /// Rows per page after the first; `None` = derived from the template table.
    pub steady_rows: Option<usize>,
    /// Rows on the first page; 0 = same as steady.
    pub first_rows: usize,
    pub rows_per_item: usize,
    pub fill: FillMode,
    pub reduce: usize,
    pub bottom_border_from_page_two: bool,
    pub external_footer: usize,
    pub remove_next_line: bool,
    pub vmerge: bool,
    pub blank_text: String,
    pub sub_key: String,
    pub lenient: bool,
}

impl LoopConfig {
    pub fn resolve(tag: &str, scope: &Scope) -> Result<Self, Error> {
        let key = |suffix: &str| format!("{tag}{suffix}");
        let number = |suffix: &str| read_count(tag, &key(suffix), scope);

        let fill = if scope.is_set(&key("_nofill")) {
            FillMode::None
        } else {
            let id = number("_mode")?.unwrap_or(1);
            FillMode::from_id(id as u64)
                .ok_or_else(|| Error::config(tag, format!("unknown fill mode {id}")))?
        };

        let text = |suffix: &str, default: &str| match scope.get(&key(suffix)) {
            Some(Value::String(s)) => s.clone(),
            _ => default.to_string(),
        };

        Ok(Self {
            tag: tag.to_string(),
            steady_rows: number("_number")?,
            first_rows: number("_first_number")?.unwrap_or(0),
            rows_per_item: number("_row_number")?.unwrap_or(1),
            fill,
            reduce: number("_reduce")?.unwrap_or(0),
            bottom_border_from_page_two: scope.is_set(&key("_fpdb")),
            external_footer: number("_external_footer")?.unwrap_or(0),
            remove_next_line: scope.is_set(&key("_remove_next_line")),
            vmerge: scope.is_set(&key("_vmerge")),
            blank_text: text("_blank_text", DEFAULT_BLANK_TEXT),
            sub_key: text("_sub_key", DEFAULT_SUB_KEY),
            lenient: scope.is_set(&key("_lenient")),
        })
    }

    /// Tag name of the nested loop scoped to this one's sub-table region.
    pub fn sub_tag(&self) -> String {
        format!("{}_sub", self.tag)
    }
}

fn read_count(tag: &str, key: &str, scope: &Scope) -> Result<Option<usize>, Error> {
    let parsed = match scope.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    parsed
        .map(|n| Some(n as usize))
        .ok_or_else(|| Error::config(tag, format!("{key} must be a non-negative integer")))
}
