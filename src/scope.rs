//! Lexical scopes for data binding.
//!
//! The environment handed to a render is never mutated. Each loop iteration
//! pushes a frame with the current item's bindings on top of its parent scope;
//! dropping the frame is all it takes to restore the outer view, on success
//! and on error alike. Nested loops just stack further frames.

use std::borrow::Cow;

use serde_json::{Map, Value};

pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    vars: Cow<'a, Map<String, Value>>,
}

impl<'a> Scope<'a> {
    pub fn root(env: &'a Map<String, Value>) -> Self {
        Self {
            parent: None,
            vars: Cow::Borrowed(env),
        }
    }

    /// A new innermost frame; lookups fall through to `self` for unbound keys.
    pub fn child(&self, vars: Map<String, Value>) -> Scope<'_> {
        Scope {
            parent: Some(self),
            vars: Cow::Owned(vars),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if let Some(v) = s.vars.get(key) {
                return Some(v);
            }
            scope = s.parent;
        }
        None
    }

    /// Dotted path lookup: `customer.name`, `lines.0.sku`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.get(segments.next()?)?;
        for seg in segments {
            value = match value {
                Value::Object(map) => map.get(seg)?,
                Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }

    /// Presence-only flag: bound to anything except `null` or `false`.
    pub fn is_set(&self, key: &str) -> bool {
        !matches!(self.get(key), None | Some(Value::Null) | Some(Value::Bool(false)))
    }

    /// Number of frames between this scope and the root, root included.
    pub fn depth(&self) -> usize {
        self.parent.map_or(1, |p| p.depth() + 1)
    }
}

/// Bindings for one loop iteration: the item's own fields (or `item` for
/// scalars), its 1-based `index` and whether another item follows.
pub fn item_frame(item: &Value, index: usize, has_next: bool) -> Map<String, Value> {
    let mut vars = match item {
        Value::Object(fields) => fields.clone(),
        other => {
            let mut m = Map::new();
            m.insert("item".into(), other.clone());
            m
        }
    };
    vars.insert("index".into(), Value::from(index + 1));
    vars.insert("hasNext".into(), Value::Bool(has_next));
    vars
}
