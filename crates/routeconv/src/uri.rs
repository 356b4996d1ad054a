//! Endpoint URI packing and unpacking
//!
//! YAML may describe an endpoint as `uri` plus a `parameters` map, XML always
//! carries the whole `scheme:primary?k=v&...` string. Unpacking only splits
//! URIs it can rebuild byte for byte.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::model::Attributes;
use crate::yaml::scalar_to_string;

#[allow(clippy::unwrap_used)]
static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*$").unwrap());

const URI: &str = "uri";
const PARAMETERS: &str = "parameters";
const PRIMARY_KEYS: [&str; 4] = ["name", "bucketName", "timerName", "dataSourceName"];

/// Parameter naming the segment between `scheme:` and `?`
pub fn primary_key(scheme: &str) -> &'static str {
    match scheme {
        "minio" => "bucketName",
        "timer" => "timerName",
        "jdbc" => "dataSourceName",
        _ => "name",
    }
}

/// Split `scheme:primary?k=v&...` into the bare scheme and its parameters
///
/// The primary segment lands under [`primary_key`] ahead of the query
/// parameters, which is exactly what [`pack`] folds back. Returns `None` when
/// the URI has no query, an empty primary segment, a parameter without `=`,
/// an empty or repeated key, or an invalid scheme.
pub fn unpack(uri: &str) -> Option<(String, Attributes)> {
    let (base, query) = uri.split_once('?')?;
    let (scheme, primary) = base.split_once(':')?;
    if !SCHEME.is_match(scheme) || primary.is_empty() || query.is_empty() {
        return None;
    }

    let mut parameters = Attributes::new();
    parameters.insert(primary_key(scheme), primary);
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=')?;
        if key.is_empty() || parameters.contains_key(key) {
            return None;
        }
        parameters.insert(key, value);
    }

    Some((scheme.to_string(), parameters))
}

/// Join a URI and its parameters back into one string
///
/// A bare scheme takes its primary segment from the scheme's primary key,
/// falling back to any known primary key.
pub fn pack(uri: &str, parameters: &Attributes) -> String {
    let mut parameters = parameters.clone();
    let mut packed = uri.to_string();

    if !uri.contains(':') {
        let scheme = uri.split_once('?').map_or(uri, |(scheme, _)| scheme);
        let primary = parameters.remove(primary_key(scheme)).or_else(|| {
            PRIMARY_KEYS
                .iter()
                .find_map(|key| parameters.remove(key))
        });
        if let Some(primary) = primary {
            packed = match uri.split_once('?') {
                Some((scheme, query)) => format!("{scheme}:{primary}?{query}"),
                None => format!("{uri}:{primary}"),
            };
        }
    }

    for (key, value) in &parameters {
        packed.push(if packed.contains('?') { '&' } else { '?' });
        packed.push_str(key);
        packed.push('=');
        packed.push_str(value);
    }
    packed
}

/// Fold every `uri` + `parameters` pair in the tree into a single `uri`
pub fn pack_tree(value: &Value) -> Value {
    match value {
        Value::Sequence(items) => Value::Sequence(items.iter().map(pack_tree).collect()),
        Value::Mapping(map) => Value::Mapping(pack_mapping(map)),
        other => other.clone(),
    }
}

fn pack_mapping(map: &Mapping) -> Mapping {
    let uri = map.get(URI).and_then(Value::as_str);
    let parameters = map.get(PARAMETERS).and_then(scalar_parameters);

    let packed = match (uri, parameters) {
        (Some(uri), Some(parameters)) => Some(pack(uri, &parameters)),
        _ => None,
    };

    let mut result = Mapping::with_capacity(map.len());
    for (key, value) in map {
        match (key.as_str(), &packed) {
            (Some(URI), Some(packed)) => {
                result.insert(key.clone(), Value::String(packed.clone()));
            }
            (Some(PARAMETERS), Some(_)) => {}
            _ => {
                result.insert(key.clone(), pack_tree(value));
            }
        }
    }
    result
}

/// Parameters map whose values are all scalars
fn scalar_parameters(value: &Value) -> Option<Attributes> {
    let map = value.as_mapping()?;
    map.iter()
        .map(|(key, value)| Some((scalar_to_string(key)?, scalar_to_string(value)?)))
        .collect()
}

/// Split every unpackable `uri` in the tree into `uri` + `parameters`
pub fn unpack_tree(value: &Value) -> Value {
    match value {
        Value::Sequence(items) => Value::Sequence(items.iter().map(unpack_tree).collect()),
        Value::Mapping(map) => Value::Mapping(unpack_mapping(map)),
        other => other.clone(),
    }
}

fn unpack_mapping(map: &Mapping) -> Mapping {
    let unpacked = if map.contains_key(PARAMETERS) {
        None
    } else {
        map.get(URI).and_then(Value::as_str).and_then(unpack)
    };

    let mut result = Mapping::with_capacity(map.len() + 1);
    for (key, value) in map {
        match (key.as_str(), &unpacked) {
            (Some(URI), Some((base, parameters))) => {
                result.insert(key.clone(), Value::String(base.clone()));
                let mut params = Mapping::with_capacity(parameters.len());
                for (name, value) in parameters {
                    params.insert(Value::String(name.clone()), Value::String(value.clone()));
                }
                result.insert(Value::String(PARAMETERS.to_string()), Value::Mapping(params));
            }
            _ => {
                result.insert(key.clone(), unpack_tree(value));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_primary_keys() {
        assert_eq!(primary_key("minio"), "bucketName");
        assert_eq!(primary_key("timer"), "timerName");
        assert_eq!(primary_key("jdbc"), "dataSourceName");
        assert_eq!(primary_key("kafka"), "name");
    }

    #[test]
    fn test_unpack() {
        let (base, params) = unpack("timer:foo?period=1000&delay=5").unwrap_or_default();
        assert_eq!(base, "timer");
        assert_eq!(
            params,
            attrs(&[("timerName", "foo"), ("period", "1000"), ("delay", "5")])
        );
        let keys: Vec<&str> = params.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["timerName", "period", "delay"]);

        let (base, params) = unpack("jms:queue:orders?transacted=true").unwrap_or_default();
        assert_eq!(base, "jms");
        assert_eq!(params.get("name"), Some("queue:orders"));
    }

    #[test]
    fn test_unpack_rejects_query_repeating_primary_key() {
        assert_eq!(unpack("timer:foo?timerName=bar"), None);
        assert_eq!(unpack("kafka:orders?name=x"), None);
        // another scheme's primary key is an ordinary parameter
        let (_, params) = unpack("timer:foo?name=x").unwrap_or_default();
        assert_eq!(params, attrs(&[("timerName", "foo"), ("name", "x")]));
    }

    #[test]
    fn test_unpack_rejects_unsafe_uris() {
        assert_eq!(unpack("direct:big"), None);
        assert_eq!(unpack("timer:?period=1"), None);
        assert_eq!(unpack("timer:foo?"), None);
        assert_eq!(unpack("timer:foo?period"), None);
        assert_eq!(unpack("timer:foo?a=1&a=2"), None);
        assert_eq!(unpack("timer:foo?=1"), None);
        assert_eq!(unpack("1x:foo?a=1"), None);
        assert_eq!(unpack("foo?a=b:c"), None);
    }

    #[test]
    fn test_unpack_then_pack_is_identity() {
        for uri in [
            "timer:foo?period=1000",
            "jms:queue:orders?concurrentConsumers=5&transacted=true",
            "sql:select * from t where a = :#x?dataSource=#ds",
            "http://host:8080/path?a=b=c",
        ] {
            let (base, params) = unpack(uri).unwrap_or_default();
            assert_eq!(pack(&base, &params), uri);
        }
    }

    #[test]
    fn test_pack_bare_scheme_uses_primary_key() {
        let params = attrs(&[("period", "1000"), ("timerName", "foo")]);
        assert_eq!(pack("timer", &params), "timer:foo?period=1000");

        let params = attrs(&[("bucketName", "b"), ("region", "eu")]);
        assert_eq!(pack("minio", &params), "minio:b?region=eu");

        // fallback to any known primary key
        let params = attrs(&[("name", "x")]);
        assert_eq!(pack("timer", &params), "timer:x");

        let params = attrs(&[("period", "1000")]);
        assert_eq!(pack("timer", &params), "timer?period=1000");
    }

    #[test]
    fn test_pack_appends_to_existing_query() {
        let params = attrs(&[("b", "2")]);
        assert_eq!(pack("jms:q?a=1", &params), "jms:q?a=1&b=2");
        assert_eq!(pack("jms:q", &Attributes::new()), "jms:q");
    }

    #[test]
    fn test_tree_passes() -> crate::Result<()> {
        let tree = crate::yaml::parse(
            "- route:\n    from:\n      uri: timer:foo?period=1000\n      steps:\n        - to: {uri: direct:x}\n",
        )?;
        let unpacked = unpack_tree(&tree);
        let from = unpacked
            .get(0)
            .and_then(|item| item.get("route"))
            .and_then(|route| route.get("from"))
            .cloned()
            .unwrap_or_default();
        let keys: Vec<&str> = from
            .as_mapping()
            .map(|map| map.keys().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, ["uri", "parameters", "steps"]);
        assert_eq!(from.get("uri").and_then(Value::as_str), Some("timer"));
        let parameter = |name: &str| {
            from.get("parameters")
                .and_then(|params| params.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        assert_eq!(parameter("timerName").as_deref(), Some("foo"));
        assert_eq!(parameter("period").as_deref(), Some("1000"));
        assert_eq!(pack_tree(&unpacked), tree);
        Ok(())
    }

    #[test]
    fn test_pack_tree_stringifies_scalars() -> crate::Result<()> {
        let tree = crate::yaml::parse("uri: timer\nparameters: {timerName: t, period: 1000, fixedRate: true}\n")?;
        let packed = pack_tree(&tree);
        let uri = packed
            .as_mapping()
            .and_then(|map| map.get("uri"))
            .and_then(Value::as_str);
        assert_eq!(uri, Some("timer:t?period=1000&fixedRate=true"));
        assert_eq!(packed.as_mapping().map(Mapping::len), Some(1));
        Ok(())
    }
}
