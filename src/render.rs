use std::ops::Range;

use serde_json::Value;

use crate::error::Error;
use crate::model::TableCell;
use crate::scope::Scope;

/// Binds scope values into a cloned cell. This is the seam to whatever
/// template system surrounds the engine; it is called once per cell of
/// every expanded row.
pub trait CellRenderer {
    fn render_cell(&mut self, cell: &mut TableCell, scope: &Scope) -> Result<(), Error>;
}

/// Replaces `[path]` placeholders in run text with values from the scope.
/// Missing values render as empty text.
#[derive(Debug, Default)]
pub struct PlaceholderRenderer {
    pub unresolved: usize,
}

impl CellRenderer for PlaceholderRenderer {
    fn render_cell(&mut self, cell: &mut TableCell, scope: &Scope) -> Result<(), Error> {
        for para in &mut cell.paragraphs {
            for run in &mut para.runs {
                let spans = delimited(&run.text, "[", "]");
                if spans.is_empty() {
                    continue;
                }
                let mut out = String::with_capacity(run.text.len());
                let mut last = 0;
                for (range, path) in spans {
                    out.push_str(&run.text[last..range.start]);
                    match scope.lookup(path) {
                        Some(v) => out.push_str(&value_text(v)),
                        None => {
                            log::debug!("Unresolved placeholder [{path}]");
                            self.unresolved += 1;
                        }
                    }
                    last = range.end;
                }
                out.push_str(&run.text[last..]);
                run.text = out;
            }
        }
        Ok(())
    }
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Spans of `open path close` where `path` is a dotted identifier.
/// Returns the byte range of the whole token and the inner path.
pub(crate) fn delimited<'t>(text: &'t str, open: &str, close: &str) -> Vec<(Range<usize>, &'t str)> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(rel) = text[from..].find(open) {
        let start = from + rel;
        let inner_start = start + open.len();
        let Some(inner_len) = text[inner_start..].find(close) else {
            break;
        };
        let inner = &text[inner_start..inner_start + inner_len];
        if is_path(inner) {
            let end = inner_start + inner_len + close.len();
            found.push((start..end, inner));
            from = end;
        } else {
            from = inner_start;
        }
    }
    found
}

fn is_path(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && !s.ends_with('.')
        && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}
