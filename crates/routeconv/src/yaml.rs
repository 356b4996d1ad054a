//! YAML tree adapter over `serde_yaml`
//!
//! Mappings keep insertion order, which is what both directions rely on for
//! ordered attributes and sections.

use serde_yaml::{Mapping, Value};

use crate::error::{Error, ErrorKind, Result, Span};

/// Parse YAML text into a value tree; blank input is `Null`
pub fn parse(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_yaml::from_str(input)?)
}

/// Serialize a value tree as YAML text
pub fn to_string(value: &Value) -> Result<String> {
    serde_yaml::to_string(value)
        .map_err(|err| Error::with_message(ErrorKind::Serialize, Span::empty(), err.to_string()))
}

/// String form of a scalar; numbers and booleans are stringified
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// True for strings, numbers and booleans
pub fn is_scalar(value: &Value) -> bool {
    scalar_to_string(value).is_some()
}

/// Look up a key and return its scalar string form
pub fn get_str(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_to_string)
}

/// Single-key map `{key: value}` split into its parts
pub fn single_entry(map: &Mapping) -> Option<(String, &Value)> {
    let (key, value) = map.iter().next()?;
    Some((scalar_to_string(key)?, value))
}

/// Short description of a value's shape for messages
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Build `{key: value}`
pub fn entry(key: impl Into<String>, value: Value) -> Value {
    let mut map = Mapping::new();
    map.insert(Value::String(key.into()), value);
    Value::Mapping(map)
}

/// Insert a string key into a mapping
pub fn insert(map: &mut Mapping, key: impl Into<String>, value: Value) {
    map.insert(Value::String(key.into()), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_is_null() -> Result<()> {
        assert_eq!(parse("")?, Value::Null);
        assert_eq!(parse("  \n")?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_parse_error_kind() {
        match parse("- route: {id: [") {
            Err(err) => assert_eq!(err.kind(), &ErrorKind::Yaml),
            Ok(value) => panic!("expected error, got {value:?}"),
        }
    }

    #[test]
    fn test_scalar_to_string() -> Result<()> {
        let value = parse("{a: 1000, b: true, c: text, d: 1.5, e: ~, f: [1]}")?;
        let map = value.as_mapping().cloned().unwrap_or_default();
        assert_eq!(get_str(&map, "a").as_deref(), Some("1000"));
        assert_eq!(get_str(&map, "b").as_deref(), Some("true"));
        assert_eq!(get_str(&map, "c").as_deref(), Some("text"));
        assert_eq!(get_str(&map, "d").as_deref(), Some("1.5"));
        assert_eq!(get_str(&map, "e"), None);
        assert_eq!(get_str(&map, "f"), None);
        Ok(())
    }

    #[test]
    fn test_single_entry_and_key_order() -> Result<()> {
        let value = parse("{to: {uri: log:out}}")?;
        let map = value.as_mapping().cloned().unwrap_or_default();
        match single_entry(&map) {
            Some((key, body)) => {
                assert_eq!(key, "to");
                assert!(body.is_mapping());
            }
            None => panic!("expected a single entry"),
        }

        let mut ordered = Mapping::new();
        insert(&mut ordered, "z", Value::from(1));
        insert(&mut ordered, "a", Value::from(2));
        let text = to_string(&Value::Mapping(ordered))?;
        assert_eq!(text, "z: 1\na: 2\n");
        Ok(())
    }
}
