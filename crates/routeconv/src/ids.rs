//! Removal of editor-generated ids
//!
//! Visual editors tag every node with ids like `to-3f9a`. Those carry no
//! meaning and are dropped before building XML.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};

#[allow(clippy::unwrap_used)]
static GENERATED_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\b[0-9a-f]{4}\b$").unwrap());

/// Whether `id` looks editor-generated (`name-` plus four lowercase hex digits)
pub fn is_generated_id(id: &str) -> bool {
    GENERATED_ID.is_match(id)
}

/// Drop every generated `id` key at any depth of the tree
pub fn strip_generated_ids(value: &Value) -> Value {
    match value {
        Value::Sequence(items) => Value::Sequence(items.iter().map(strip_generated_ids).collect()),
        Value::Mapping(map) => {
            let mut result = Mapping::with_capacity(map.len());
            for (key, value) in map {
                let generated = key.as_str() == Some("id")
                    && value.as_str().is_some_and(is_generated_id);
                if !generated {
                    result.insert(key.clone(), strip_generated_ids(value));
                }
            }
            Value::Mapping(result)
        }
        other => other.clone(),
    }
}
