//! Canonical document model
//!
//! Both directions meet here: XML is normalized into these types and YAML is
//! built into them, then each side is emitted from them. Every list keeps
//! document order.

use std::fmt;

use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;

use crate::kind::ExpressionLanguage;

/// Ordered attribute map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes(pub(crate) IndexMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert or replace, keeping the original position of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Attributes {
    type Item = (String, String);
    type IntoIter = IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<IndexMap<String, String>> for Attributes {
    fn from(map: IndexMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A whole routing definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub beans: Vec<Bean>,
    pub references: Vec<Reference>,
    pub rest_configuration: Option<RestConfiguration>,
    pub rest_apis: Vec<RestApi>,
    pub routes: Vec<Route>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
            && self.references.is_empty()
            && self.rest_configuration.is_none()
            && self.rest_apis.is_empty()
            && self.routes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bean {
    pub name: String,
    pub bean_type: Option<String>,
    pub factory_bean: Option<String>,
    pub factory_method: Option<String>,
    /// Positional constructor arguments
    pub arguments: Vec<String>,
    pub properties: IndexMap<String, PropertyValue>,
    /// Other scalar attributes such as `init-method` or `scope`
    pub extra: Attributes,
}

/// Bean property value: a literal or a reference to another bean
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Value(String),
    Ref(String),
}

const BEAN_REF_PREFIX: &str = "#bean:";

impl PropertyValue {
    /// Parse the YAML form, where `#bean:x` is a reference
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix(BEAN_REF_PREFIX) {
            Some(name) if !name.is_empty() => Self::Ref(name.to_string()),
            _ => Self::Value(text.to_string()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.write_str(value),
            Self::Ref(name) => write!(f, "{BEAN_REF_PREFIX}{name}"),
        }
    }
}

/// Service reference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reference {
    pub id: String,
    pub interface: String,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestConfiguration {
    pub attributes: Attributes,
    /// Property-list children keyed by tag, e.g. `dataFormatProperty`
    pub property_lists: IndexMap<String, Vec<Attributes>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpVerb {
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Options,
        Self::Head,
    ];

    /// Case-insensitive tag lookup
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.tag().eq_ignore_ascii_case(tag))
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Options => "options",
            Self::Head => "head",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestApi {
    pub id: Option<String>,
    pub path: Option<String>,
    pub attributes: Attributes,
    pub description: Option<String>,
    pub verbs: IndexMap<HttpVerb, Vec<Verb>>,
}

/// One operation under a REST verb
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Verb {
    pub attributes: Attributes,
    pub description: Option<String>,
    /// Target endpoint URI
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    pub id: Option<String>,
    pub error_handler_ref: Option<String>,
    pub attributes: Attributes,
    pub description: Option<String>,
    pub from: Endpoint,
    pub steps: Vec<Step>,
}

/// Route consumer endpoint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Endpoint {
    pub uri: String,
    pub parameters: Attributes,
    pub attributes: Attributes,
}

/// Canonical processing step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step {
    /// Tag name
    pub kind: String,
    pub attributes: Attributes,
    /// Sole scalar value of a leaf element
    pub text: Option<String>,
    pub expression: Option<Expression>,
    /// Children in document order
    pub slots: Vec<Slot>,
}

impl Step {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// True when the step carries nothing but its kind
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && self.text.is_none()
            && self.expression.is_none()
            && self.slots.is_empty()
    }

    /// Nested steps of the `steps` slot, in order
    pub fn steps(&self) -> impl Iterator<Item = &Self> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Step(step) => Some(step),
            Slot::Child { .. } => None,
        })
    }

    /// Singular children with tag `tag`, in order
    pub fn children<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.slots.iter().filter_map(move |slot| match slot {
            Slot::Child { tag: t, node } if t == tag => Some(node),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Named child keyed by its tag; repeated tags become YAML lists
    Child { tag: String, node: Node },
    /// Entry of the `steps` list
    Step(Step),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(Step),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub language: ExpressionLanguage,
    pub text: Option<String>,
    /// Attributes of the language element, e.g. `resultType`
    pub attributes: Attributes,
}

impl Expression {
    pub fn new(language: ExpressionLanguage, text: impl Into<String>) -> Self {
        Self {
            language,
            text: Some(text.into()),
            attributes: Attributes::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_order() {
        let mut attrs = Attributes::new();
        attrs.insert("uri", "log:out");
        attrs.insert("id", "to1");
        attrs.insert("uri", "log:in");
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["uri", "id"]);
        assert_eq!(attrs.get("uri"), Some("log:in"));
        assert_eq!(attrs.remove("uri").as_deref(), Some("log:in"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_property_value_ref_syntax() {
        assert_eq!(
            PropertyValue::parse("#bean:dataSource"),
            PropertyValue::Ref("dataSource".to_string())
        );
        assert_eq!(
            PropertyValue::parse("#bean:"),
            PropertyValue::Value("#bean:".to_string())
        );
        assert_eq!(PropertyValue::Ref("ds".to_string()).to_string(), "#bean:ds");
        assert_eq!(PropertyValue::Value("42".to_string()).to_string(), "42");
    }

    #[test]
    fn test_http_verb_lookup() {
        assert_eq!(HttpVerb::from_tag("GET"), Some(HttpVerb::Get));
        assert_eq!(HttpVerb::from_tag("options"), Some(HttpVerb::Options));
        assert_eq!(HttpVerb::from_tag("fetch"), None);
    }

    #[test]
    fn test_step_accessors() {
        let mut choice = Step::new("choice");
        choice.slots.push(Slot::Child {
            tag: "when".to_string(),
            node: Node::Element(Step::new("when")),
        });
        choice.slots.push(Slot::Step(Step::new("to").with_attribute("uri", "log:x")));
        assert_eq!(choice.children("when").count(), 1);
        assert_eq!(choice.steps().count(), 1);
        assert!(!choice.is_empty());
        assert!(Step::new("stop").is_empty());
    }
}
