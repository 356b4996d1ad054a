//! YAML emitter: canonical document into a YAML DSL tree

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::diagnostics::{child_path, Diagnostics};
use crate::kind::{self, Multiplicity, StepKind};
use crate::model::{
    Attributes, Bean, Document, Expression, Node, Reference, RestApi, RestConfiguration, Route,
    Slot, Step,
};
use crate::yaml::{entry, insert};

const STEPS: &str = "steps";

/// Top-level sequence of single-key section maps, empty sections omitted
pub fn document(document: &Document, diagnostics: &mut Diagnostics) -> Value {
    let mut sections = Vec::new();

    if !document.beans.is_empty() {
        let beans = document.beans.iter().map(bean).collect();
        sections.push(entry("beans", Value::Sequence(beans)));
    }
    for item in &document.references {
        sections.push(entry("reference", reference(item)));
    }
    if let Some(configuration) = &document.rest_configuration {
        sections.push(entry("restConfiguration", rest_configuration(configuration)));
    }
    for api in &document.rest_apis {
        sections.push(entry("rest", rest(api)));
    }
    for (index, item) in document.routes.iter().enumerate() {
        let path = match &item.id {
            Some(id) => format!("route[{id}]"),
            None => format!("route[{index}]"),
        };
        sections.push(entry("route", route(item, &path, diagnostics)));
    }

    Value::Sequence(sections)
}

fn string(value: &str) -> Value {
    Value::String(value.to_string())
}

fn insert_optional(map: &mut Mapping, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        insert(map, key, string(value));
    }
}

fn insert_attributes(map: &mut Mapping, attributes: &Attributes) {
    for (key, value) in attributes {
        insert(map, key.as_str(), string(value));
    }
}

fn attributes_map(attributes: &Attributes) -> Value {
    let mut map = Mapping::with_capacity(attributes.len());
    insert_attributes(&mut map, attributes);
    Value::Mapping(map)
}

fn bean(bean: &Bean) -> Value {
    let mut map = Mapping::new();
    insert(&mut map, "name", string(&bean.name));
    insert_optional(&mut map, "type", bean.bean_type.as_ref());
    insert_optional(&mut map, "factoryBean", bean.factory_bean.as_ref());
    insert_optional(&mut map, "factoryMethod", bean.factory_method.as_ref());
    insert_attributes(&mut map, &bean.extra);

    if !bean.arguments.is_empty() {
        let mut constructors = Mapping::with_capacity(bean.arguments.len());
        for (index, argument) in bean.arguments.iter().enumerate() {
            constructors.insert(Value::from(index), string(argument));
        }
        insert(&mut map, "constructors", Value::Mapping(constructors));
    }
    if !bean.properties.is_empty() {
        let mut properties = Mapping::with_capacity(bean.properties.len());
        for (name, value) in &bean.properties {
            insert(&mut properties, name.as_str(), Value::String(value.to_string()));
        }
        insert(&mut map, "properties", Value::Mapping(properties));
    }
    Value::Mapping(map)
}

fn reference(reference: &Reference) -> Value {
    let mut map = Mapping::new();
    insert(&mut map, "id", string(&reference.id));
    insert(&mut map, "interface", string(&reference.interface));
    insert_optional(&mut map, "filter", reference.filter.as_ref());
    Value::Mapping(map)
}

fn rest_configuration(configuration: &RestConfiguration) -> Value {
    let mut map = Mapping::new();
    insert_attributes(&mut map, &configuration.attributes);
    for (tag, list) in &configuration.property_lists {
        let items = list.iter().map(attributes_map).collect();
        insert(&mut map, tag.as_str(), Value::Sequence(items));
    }
    Value::Mapping(map)
}

fn rest(api: &RestApi) -> Value {
    let mut map = Mapping::new();
    insert_optional(&mut map, "id", api.id.as_ref());
    insert_optional(&mut map, "path", api.path.as_ref());
    insert_attributes(&mut map, &api.attributes);
    insert_optional(&mut map, "description", api.description.as_ref());

    for (verb, operations) in &api.verbs {
        let items = operations
            .iter()
            .map(|operation| {
                let mut item = Mapping::new();
                insert_attributes(&mut item, &operation.attributes);
                insert_optional(&mut item, "description", operation.description.as_ref());
                insert_optional(&mut item, "to", operation.to.as_ref());
                Value::Mapping(item)
            })
            .collect();
        insert(&mut map, verb.tag(), Value::Sequence(items));
    }
    Value::Mapping(map)
}

fn route(route: &Route, path: &str, diagnostics: &mut Diagnostics) -> Value {
    let mut map = Mapping::new();
    insert_optional(&mut map, "id", route.id.as_ref());
    insert_optional(&mut map, "errorHandlerRef", route.error_handler_ref.as_ref());
    insert_attributes(&mut map, &route.attributes);
    insert_optional(&mut map, "description", route.description.as_ref());

    let mut from = Mapping::new();
    insert(&mut from, "uri", string(&route.from.uri));
    if !route.from.parameters.is_empty() {
        insert(&mut from, "parameters", attributes_map(&route.from.parameters));
    }
    insert_attributes(&mut from, &route.from.attributes);
    let steps = route
        .steps
        .iter()
        .map(|step| step_entry(step, &child_path(path, &step.kind), diagnostics))
        .collect();
    insert(&mut from, STEPS, Value::Sequence(steps));

    insert(&mut map, "from", Value::Mapping(from));
    Value::Mapping(map)
}

/// `{kind: body}`
pub fn step_entry(step: &Step, path: &str, diagnostics: &mut Diagnostics) -> Value {
    entry(step.kind.as_str(), step_body(step, path, diagnostics))
}

/// Body of a step: `{}` when empty, a bare scalar for text-only leaves,
/// otherwise attributes, text, expression and child groups in that order
pub fn step_body(step: &Step, path: &str, diagnostics: &mut Diagnostics) -> Value {
    if step.attributes.is_empty() && step.expression.is_none() && step.slots.is_empty() {
        return match &step.text {
            Some(text) => string(text),
            None => Value::Mapping(Mapping::new()),
        };
    }

    let mut map = Mapping::new();
    insert_attributes(&mut map, &step.attributes);
    insert_optional(&mut map, "text", step.text.as_ref());

    if let Some(expression) = &step.expression {
        let language = expression.language.tag();
        if StepKind::classify(&step.kind).inline_expression() {
            insert(&mut map, language, expression_body(expression));
        } else {
            insert(&mut map, "expression", entry(language, expression_body(expression)));
        }
    }

    // child groups keyed by tag in first-occurrence order
    let mut groups: IndexMap<&str, Vec<Value>> = IndexMap::new();
    for slot in &step.slots {
        match slot {
            Slot::Child { tag, node } => {
                let value = match node {
                    Node::Text(text) => string(text),
                    Node::Element(child) => step_body(child, &child_path(path, tag), diagnostics),
                };
                groups.entry(tag.as_str()).or_default().push(value);
            }
            Slot::Step(child) => {
                let value = step_entry(child, &child_path(path, &child.kind), diagnostics);
                groups.entry(STEPS).or_default().push(value);
            }
        }
    }

    for (tag, mut values) in groups {
        if map.contains_key(tag) {
            diagnostics.unknown_shape(
                &child_path(path, tag),
                format!("child `{tag}` collides with an existing key and was dropped"),
            );
            continue;
        }
        let list = tag == STEPS
            || values.len() > 1
            || kind::branch(&step.kind, tag) == Some(Multiplicity::List);
        let value = if list {
            Value::Sequence(values)
        } else {
            values.pop().unwrap_or_default()
        };
        insert(&mut map, tag, value);
    }

    Value::Mapping(map)
}

/// `{expression: text, <language attributes>}`
fn expression_body(expression: &Expression) -> Value {
    let mut map = Mapping::new();
    insert_optional(&mut map, "expression", expression.text.as_ref());
    insert_attributes(&mut map, &expression.attributes);
    Value::Mapping(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ExpressionLanguage;
    use crate::yaml;

    fn child(tag: &str, node: Node) -> Slot {
        Slot::Child {
            tag: tag.to_string(),
            node,
        }
    }

    fn render(step: &Step) -> crate::Result<String> {
        let mut diagnostics = Diagnostics::new();
        yaml::to_string(&step_entry(step, "", &mut diagnostics))
    }

    #[test]
    fn test_choice_shape() -> crate::Result<()> {
        let mut when = Step::new("when");
        when.expression = Some(Expression::new(ExpressionLanguage::Simple, "${body} > 5"));
        when.slots
            .push(Slot::Step(Step::new("to").with_attribute("uri", "direct:big")));
        let mut otherwise = Step::new("otherwise");
        otherwise
            .slots
            .push(Slot::Step(Step::new("to").with_attribute("uri", "direct:small")));
        let mut choice = Step::new("choice");
        choice.slots.push(child("when", Node::Element(when)));
        choice.slots.push(child("otherwise", Node::Element(otherwise)));

        let expected = yaml::parse(
            r#"
choice:
  when:
    - simple: {expression: "${body} > 5"}
      steps:
        - to: {uri: "direct:big"}
  otherwise:
    steps:
      - to: {uri: "direct:small"}
"#,
        )?;
        let mut diagnostics = Diagnostics::new();
        assert_eq!(step_entry(&choice, "", &mut diagnostics), expected);
        Ok(())
    }

    #[test]
    fn test_expression_wrapper_for_plain_steps() -> crate::Result<()> {
        let mut set_header = Step::new("setHeader").with_attribute("name", "x");
        let mut expression = Expression::new(ExpressionLanguage::Groovy, "1 + 1");
        expression.attributes.insert("resultType", "int");
        set_header.expression = Some(expression);

        let expected = yaml::parse(
            "setHeader: {name: x, expression: {groovy: {expression: 1 + 1, resultType: int}}}",
        )?;
        let mut diagnostics = Diagnostics::new();
        assert_eq!(step_entry(&set_header, "", &mut diagnostics), expected);
        Ok(())
    }

    #[test]
    fn test_repeat_promotion() -> crate::Result<()> {
        let mut split = Step::new("split");
        split.slots.push(child("header", Node::Text("a".to_string())));
        split.slots.push(child("header", Node::Text("b".to_string())));
        let mut mixed = Step::new("enrich");
        mixed.slots.push(child("x", Node::Text("a".to_string())));
        mixed.slots.push(child(
            "x",
            Node::Element(Step::new("x").with_attribute("k", "v")),
        ));

        assert_eq!(render(&split)?, "split:\n  header:\n  - a\n  - b\n");
        assert_eq!(render(&mixed)?, "enrich:\n  x:\n  - a\n  - k: v\n");
        Ok(())
    }

    #[test]
    fn test_leaf_bodies() -> crate::Result<()> {
        assert_eq!(render(&Step::new("stop"))?, "stop: {}\n");
        let mut text_only = Step::new("setBody");
        text_only.text = Some("hello".to_string());
        assert_eq!(render(&text_only)?, "setBody: hello\n");
        let mut mixed = Step::new("description").with_attribute("lang", "en");
        mixed.text = Some("Polls".to_string());
        assert_eq!(render(&mixed)?, "description:\n  lang: en\n  text: Polls\n");
        Ok(())
    }

    #[test]
    fn test_key_collision_reported() {
        let mut log = Step::new("log").with_attribute("message", "a");
        log.slots.push(child("message", Node::Text("b".to_string())));
        let mut diagnostics = Diagnostics::new();
        let body = step_body(&log, "route[0]/log", &mut diagnostics);
        assert_eq!(body.get("message").and_then(Value::as_str), Some("a"));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_document_sections_in_order() -> crate::Result<()> {
        let mut document = Document::default();
        document.routes.push(Route {
            id: Some("r1".to_string()),
            from: crate::model::Endpoint {
                uri: "direct:a".to_string(),
                ..Default::default()
            },
            ..Route::default()
        });
        document.references.push(Reference {
            id: "ds".to_string(),
            interface: "javax.sql.DataSource".to_string(),
            filter: None,
        });
        let mut diagnostics = Diagnostics::new();
        let text = yaml::to_string(&self::document(&document, &mut diagnostics))?;
        assert_eq!(
            text,
            "- reference:\n    id: ds\n    interface: javax.sql.DataSource\n- route:\n    id: r1\n    from:\n      uri: direct:a\n      steps: []\n"
        );
        Ok(())
    }
}
