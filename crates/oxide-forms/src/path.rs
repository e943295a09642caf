//! Dotted field paths over JSON objects.
//!
//! A field named `address.city` is stored as `{"address": {"city": ..}}`.

use serde_json::{Map, Value};

/// Inserts `value` at a dotted path, creating intermediate objects.
///
/// A non-object found on the way is replaced by an object.
pub fn insert_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = map;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }

        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
}

/// Looks up the value at a dotted path.
pub fn get_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    segments.try_fold(map.get(first)?, |value, segment| value.get(segment))
}

/// Flattens a nested object into `(path, leaf)` pairs in key order.
pub fn flatten(map: &Map<String, Value>) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    flatten_into(map, "", &mut out);
    out
}

fn flatten_into<'a>(map: &'a Map<String, Value>, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(inner, &path, out),
            leaf => out.push((path, leaf)),
        }
    }
}
