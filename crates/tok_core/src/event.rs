//! Dotted-path access into raw StatsBomb event records.
//!
//! Events arrive as nested JSON objects (`{"type": {"id": 16}, "location":
//! [103.7, 48.2], ...}`). Feature specs address values with dotted paths such
//! as `shot.end_location[1]`; this module resolves those paths without
//! committing the whole feed to a rigid struct model.

use serde_json::Value;

/// Borrowed view over one raw event record.
#[derive(Clone, Copy)]
pub struct RawEvent<'a> {
    value: &'a Value,
}

impl<'a> RawEvent<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Resolve a dotted path. A trailing `[i]` segment indexes into an array,
    /// e.g. `location[0]` or `tactics.lineup[3]`.
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        let mut current = self.value;
        for segment in path.split('.') {
            current = match segment.split_once('[') {
                Some((key, index)) => {
                    let index: usize = index.strip_suffix(']')?.parse().ok()?;
                    current.get(key)?.get(index)?
                }
                None => current.get(segment)?,
            };
        }
        Some(current)
    }

    pub fn f64_at(&self, path: &str) -> Option<f64> {
        self.get(path)?.as_f64()
    }

    pub fn i64_at(&self, path: &str) -> Option<i64> {
        self.get(path)?.as_i64()
    }

    /// Boolean flags are simply absent when false in StatsBomb feeds.
    pub fn bool_at(&self, path: &str) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn array_at(&self, path: &str) -> Option<&'a [Value]> {
        self.get(path)?.as_array().map(Vec::as_slice)
    }
}
