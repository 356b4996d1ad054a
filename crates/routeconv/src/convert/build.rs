//! Entity and step-tree builder: YAML DSL tree into the canonical document

use serde_yaml::{Mapping, Value};

use crate::diagnostics::{child_path, Diagnostics};
use crate::error::{Error, ErrorKind, Result, Span};
use crate::kind::{self, ExpressionLanguage, StepKind};
use crate::model::{
    Attributes, Bean, Document, Endpoint, Expression, HttpVerb, Node, PropertyValue, Reference,
    RestApi, RestConfiguration, Route, Slot, Step, Verb,
};
use crate::xml::model::is_valid_name;
use crate::yaml::{describe, get_str, is_scalar, scalar_to_string, single_entry};

/// Build the canonical document from a YAML tree
///
/// The root must be a sequence of section maps; `null` is an empty document.
pub fn document(root: &Value, diagnostics: &mut Diagnostics) -> Result<Document> {
    let items = match root {
        Value::Null => return Ok(Document::default()),
        Value::Sequence(items) => items,
        other => {
            return Err(Error::new(
                ErrorKind::UnexpectedRoot {
                    found: describe(other).to_string(),
                },
                Span::empty(),
            ))
        }
    };

    let mut builder = Builder {
        document: Document::default(),
        diagnostics,
    };
    for (index, item) in items.iter().enumerate() {
        let path = format!("[{index}]");
        match item.as_mapping() {
            Some(sections) => builder.sections(sections, &path),
            None => builder.diagnostics.unknown_shape(
                &path,
                format!("expected a section map, found {}", describe(item)),
            ),
        }
    }
    Ok(builder.document)
}

struct Builder<'a> {
    document: Document,
    diagnostics: &'a mut Diagnostics,
}

/// A map, or every map of a list
fn one_or_many(value: &Value) -> Option<Vec<&Mapping>> {
    match value {
        Value::Mapping(map) => Some(vec![map]),
        Value::Sequence(items) => items.iter().map(Value::as_mapping).collect(),
        _ => None,
    }
}

fn key_of(key: &Value) -> Option<String> {
    scalar_to_string(key)
}

impl Builder<'_> {
    fn sections(&mut self, sections: &Mapping, path: &str) {
        for (key, value) in sections {
            let Some(key) = key_of(key) else {
                self.diagnostics.unknown_shape(path, "non-scalar section key skipped");
                continue;
            };
            let path = child_path(path, &key);
            match key.as_str() {
                "beans" => self.beans(value, &path),
                "reference" => self.each(value, &path, Self::reference),
                "restConfiguration" => self.each(value, &path, Self::rest_configuration),
                "rest" => self.each(value, &path, Self::rest),
                "route" => self.each(value, &path, Self::route),
                "from" => match value.as_mapping() {
                    Some(from) => {
                        let mut route = Mapping::new();
                        route.insert(Value::from("from"), Value::Mapping(from.clone()));
                        self.route(&route, &path);
                    }
                    None => self.expected(&path, "a map", value),
                },
                _ => self
                    .diagnostics
                    .unknown_shape(&path, format!("unsupported section `{key}` skipped")),
            }
        }
    }

    fn each(&mut self, value: &Value, path: &str, mut build: impl FnMut(&mut Self, &Mapping, &str)) {
        match one_or_many(value) {
            Some(maps) if maps.len() == 1 && value.is_mapping() => {
                for map in maps {
                    build(self, map, path);
                }
            }
            Some(maps) => {
                for (index, map) in maps.into_iter().enumerate() {
                    build(self, map, &format!("{path}[{index}]"));
                }
            }
            None => self.expected(path, "a map or a list of maps", value),
        }
    }

    fn expected(&mut self, path: &str, expected: &str, found: &Value) {
        self.diagnostics.unknown_shape(
            path,
            format!("expected {expected}, found {}, skipped", describe(found)),
        );
    }

    /// Scalar attribute with a writable name
    fn attribute(&mut self, attributes: &mut Attributes, key: &str, value: &Value, path: &str) {
        if !is_valid_name(key) {
            self.diagnostics
                .unknown_shape(path, format!("`{key}` is not a valid XML name, skipped"));
            return;
        }
        match scalar_to_string(value) {
            Some(text) => {
                attributes.insert(key, text);
            }
            None => self.expected(&child_path(path, key), "a scalar", value),
        }
    }

    fn beans(&mut self, value: &Value, path: &str) {
        let Some(items) = value.as_sequence() else {
            self.expected(path, "a list of beans", value);
            return;
        };
        for (index, item) in items.iter().enumerate() {
            let path = format!("{path}[{index}]");
            match item.as_mapping() {
                Some(map) => {
                    if let Some(bean) = self.bean(map, &path) {
                        self.document.beans.push(bean);
                    }
                }
                None => self.expected(&path, "a map", item),
            }
        }
    }

    fn bean(&mut self, map: &Mapping, path: &str) -> Option<Bean> {
        let Some(name) = get_str(map, "name") else {
            self.diagnostics.missing_field(path, "name");
            return None;
        };
        let mut bean = Bean {
            name,
            ..Bean::default()
        };

        for (key, value) in map {
            let Some(key) = key_of(key) else { continue };
            match key.as_str() {
                "name" => {}
                "type" => bean.bean_type = scalar_to_string(value),
                "factoryBean" => bean.factory_bean = scalar_to_string(value),
                "factoryMethod" => bean.factory_method = scalar_to_string(value),
                "constructors" => bean.arguments = self.constructors(value, &child_path(path, &key)),
                "properties" => match value.as_mapping() {
                    Some(properties) => {
                        for (name, value) in properties {
                            let (Some(name), Some(value)) = (key_of(name), scalar_to_string(value))
                            else {
                                self.diagnostics.unknown_shape(
                                    &child_path(path, "properties"),
                                    "property must map a name to a scalar, skipped",
                                );
                                continue;
                            };
                            bean.properties.insert(name, PropertyValue::parse(&value));
                        }
                    }
                    None => self.expected(&child_path(path, &key), "a map", value),
                },
                _ => self.attribute(&mut bean.extra, &key, value, path),
            }
        }
        Some(bean)
    }

    /// Positional arguments from `{0: a, 1: b}` (ordered by index) or `[a, b]`
    fn constructors(&mut self, value: &Value, path: &str) -> Vec<String> {
        match value {
            Value::Mapping(map) => {
                let mut indexed: Vec<(usize, String)> = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let index = key_of(key).and_then(|key| key.parse::<usize>().ok());
                    match (index, scalar_to_string(value)) {
                        (Some(index), Some(value)) => indexed.push((index, value)),
                        _ => self
                            .diagnostics
                            .unknown_shape(path, "constructor argument skipped"),
                    }
                }
                indexed.sort_by_key(|(index, _)| *index);
                indexed.into_iter().map(|(_, value)| value).collect()
            }
            Value::Sequence(items) => items
                .iter()
                .filter_map(|item| {
                    let value = scalar_to_string(item);
                    if value.is_none() {
                        self.diagnostics
                            .unknown_shape(path, "constructor argument skipped");
                    }
                    value
                })
                .collect(),
            other => {
                self.expected(path, "a map or a list", other);
                Vec::new()
            }
        }
    }

    fn reference(&mut self, map: &Mapping, path: &str) {
        let Some(id) = get_str(map, "id") else {
            self.diagnostics.missing_field(path, "id");
            return;
        };
        let Some(interface) = get_str(map, "interface") else {
            self.diagnostics.missing_field(path, "interface");
            return;
        };
        for key in map.keys().filter_map(key_of) {
            if !matches!(key.as_str(), "id" | "interface" | "filter") {
                self.diagnostics
                    .unknown_shape(path, format!("reference key `{key}` ignored"));
            }
        }
        self.document.references.push(Reference {
            id,
            interface,
            filter: get_str(map, "filter"),
        });
    }

    fn rest_configuration(&mut self, map: &Mapping, path: &str) {
        if self.document.rest_configuration.is_some() {
            self.diagnostics.unknown_shape(
                path,
                "only one restConfiguration is allowed, extra one dropped",
            );
            return;
        }

        let mut configuration = RestConfiguration::default();
        for (key, value) in map {
            let Some(key) = key_of(key) else { continue };
            if is_scalar(value) {
                self.attribute(&mut configuration.attributes, &key, value, path);
                continue;
            }
            if !is_valid_name(&key) {
                self.expected(&child_path(path, &key), "a valid XML name", value);
                continue;
            }
            let Some(items) = one_or_many(value) else {
                self.expected(&child_path(path, &key), "a list of property maps", value);
                continue;
            };
            let list = items
                .into_iter()
                .map(|item| self.flat_attributes(item, &child_path(path, &key)))
                .collect();
            configuration.property_lists.insert(key, list);
        }
        self.document.rest_configuration = Some(configuration);
    }

    fn flat_attributes(&mut self, map: &Mapping, path: &str) -> Attributes {
        let mut attributes = Attributes::new();
        for (key, value) in map {
            if let Some(key) = key_of(key) {
                self.attribute(&mut attributes, &key, value, path);
            }
        }
        attributes
    }

    fn rest(&mut self, map: &Mapping, path: &str) {
        let mut api = RestApi::default();
        for (key, value) in map {
            let Some(key) = key_of(key) else { continue };
            let key_path = child_path(path, &key);
            match key.as_str() {
                "id" => api.id = scalar_to_string(value),
                "path" => api.path = scalar_to_string(value),
                "description" => api.description = scalar_to_string(value),
                _ => match HttpVerb::from_tag(&key) {
                    Some(verb) => {
                        let Some(items) = one_or_many(value) else {
                            self.expected(&key_path, "a list of operations", value);
                            continue;
                        };
                        let operations: Vec<Verb> = items
                            .into_iter()
                            .map(|item| self.verb(item, &key_path))
                            .collect();
                        api.verbs.entry(verb).or_default().extend(operations);
                    }
                    None => self.attribute(&mut api.attributes, &key, value, path),
                },
            }
        }
        self.document.rest_apis.push(api);
    }

    fn verb(&mut self, map: &Mapping, path: &str) -> Verb {
        let mut verb = Verb::default();
        for (key, value) in map {
            let Some(key) = key_of(key) else { continue };
            match key.as_str() {
                "description" => verb.description = scalar_to_string(value),
                "to" => {
                    verb.to = scalar_to_string(value).or_else(|| get_uri(value));
                    if verb.to.is_none() {
                        self.expected(&child_path(path, "to"), "an endpoint uri", value);
                    }
                }
                _ => self.attribute(&mut verb.attributes, &key, value, path),
            }
        }
        verb
    }

    fn route(&mut self, map: &Mapping, path: &str) {
        let mut route = Route::default();
        let mut from: Option<Endpoint> = None;
        let mut route_steps = Vec::new();

        for (key, value) in map {
            let Some(key) = key_of(key) else { continue };
            let key_path = child_path(path, &key);
            match key.as_str() {
                "id" => route.id = scalar_to_string(value),
                "errorHandlerRef" => route.error_handler_ref = scalar_to_string(value),
                "description" => route.description = scalar_to_string(value),
                "from" => match value.as_mapping() {
                    Some(endpoint) => from = self.endpoint(endpoint, &key_path, &mut route.steps),
                    None => self.expected(&key_path, "a map", value),
                },
                "steps" => route_steps = self.step_list(value, &key_path),
                _ => self.attribute(&mut route.attributes, &key, value, path),
            }
        }
        route.steps.extend(route_steps);

        match from {
            Some(from) => {
                route.from = from;
                self.document.routes.push(route);
            }
            None => self.diagnostics.missing_field(path, "from.uri"),
        }
    }

    /// Endpoint fields; `from.steps` are appended to `steps`
    fn endpoint(&mut self, map: &Mapping, path: &str, steps: &mut Vec<Step>) -> Option<Endpoint> {
        let mut endpoint = Endpoint::default();
        for (key, value) in map {
            let Some(key) = key_of(key) else { continue };
            let key_path = child_path(path, &key);
            match key.as_str() {
                "uri" => endpoint.uri = scalar_to_string(value).unwrap_or_default(),
                "parameters" => match value.as_mapping() {
                    Some(parameters) => {
                        endpoint.parameters = self.flat_attributes(parameters, &key_path);
                    }
                    None => self.expected(&key_path, "a map", value),
                },
                "steps" => steps.extend(self.step_list(value, &key_path)),
                _ => self.attribute(&mut endpoint.attributes, &key, value, path),
            }
        }
        if endpoint.uri.is_empty() {
            None
        } else {
            Some(endpoint)
        }
    }

    fn step_list(&mut self, value: &Value, path: &str) -> Vec<Step> {
        let Some(items) = value.as_sequence() else {
            self.expected(path, "a list of steps", value);
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| self.step_entry(item, &format!("{path}[{index}]")))
            .collect()
    }

    /// One `{kind: body}` list entry
    fn step_entry(&mut self, item: &Value, path: &str) -> Option<Step> {
        let Some(map) = item.as_mapping() else {
            self.expected(path, "a `{kind: body}` map", item);
            return None;
        };
        let Some((kind, body)) = single_entry(map) else {
            self.expected(path, "a `{kind: body}` map", item);
            return None;
        };
        if map.len() > 1 {
            self.diagnostics.unknown_shape(
                path,
                format!("step `{kind}` has extra keys, only the first is used"),
            );
        }
        self.step(&kind, body, &child_path(path, &kind))
    }

    fn step(&mut self, kind: &str, body: &Value, path: &str) -> Option<Step> {
        if !is_valid_name(kind) || kind::is_reserved(kind) {
            self.diagnostics
                .unknown_shape(path, format!("`{kind}` cannot be used as a tag, skipped"));
            return None;
        }

        let mut step = Step::new(kind);
        match body {
            Value::Null => {}
            Value::Mapping(map) => self.step_body(&mut step, map, path),
            Value::Sequence(_) | Value::Tagged(_) => {
                self.expected(path, "a map, a scalar or null", body);
                return None;
            }
            scalar => {
                let text = scalar_to_string(scalar).unwrap_or_default();
                match kind::shorthand_attribute(kind) {
                    Some(attribute) => {
                        step.attributes.insert(attribute, text);
                    }
                    None => step.text = Some(text),
                }
            }
        }
        Some(step)
    }

    fn step_body(&mut self, step: &mut Step, map: &Mapping, path: &str) {
        let step_kind = StepKind::classify(&step.kind);
        let container = step_kind.is_container();

        for (key, value) in map {
            let Some(key) = key_of(key) else {
                self.diagnostics.unknown_shape(path, "non-scalar key skipped");
                continue;
            };
            let key_path = child_path(path, &key);

            match key.as_str() {
                "steps" => {
                    if !container {
                        self.diagnostics.unknown_shape(
                            &key_path,
                            format!("`{}` does not take nested steps", step.kind),
                        );
                    }
                    self.nested_steps(step, value, &key_path, container);
                    continue;
                }
                "expression" => {
                    self.expression_wrapper(step, value, &key_path);
                    continue;
                }
                "text" if is_scalar(value) => {
                    step.text = scalar_to_string(value);
                    continue;
                }
                "children" | "item" | "text" => {
                    self.expected(&key_path, "no reserved key", value);
                    continue;
                }
                _ => {}
            }

            if let StepKind::Expression(language) = StepKind::classify(&key) {
                let scalar_allowed = is_scalar(value) && step_kind.takes_scalar_expression();
                if value.is_mapping() || scalar_allowed {
                    if step.expression.is_none() {
                        step.expression = Some(self.expression(language, value, &key_path));
                        continue;
                    }
                    self.diagnostics.unknown_shape(
                        &key_path,
                        format!("`{}` already has an expression, `{key}` kept as a child", step.kind),
                    );
                }
            }

            self.child(step, &key, value, path);
        }
    }

    /// Entries of a `steps` list; inside containers bare scalar entries
    /// collapse to the expression or a text child
    fn nested_steps(&mut self, step: &mut Step, value: &Value, path: &str, container: bool) {
        let Some(items) = value.as_sequence() else {
            self.expected(path, "a list of steps", value);
            return;
        };
        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{index}]");
            if container && self.collapse(step, item) {
                continue;
            }
            if let Some(nested) = self.step_entry(item, &item_path) {
                step.slots.push(Slot::Step(nested));
            }
        }
    }

    fn collapse(&mut self, step: &mut Step, item: &Value) -> bool {
        let Some(map) = item.as_mapping().filter(|map| map.len() == 1) else {
            return false;
        };
        let Some((tag, body)) = single_entry(map) else {
            return false;
        };
        let Some(text) = scalar_to_string(body) else {
            return false;
        };
        if kind::shorthand_attribute(&tag).is_some()
            || !is_valid_name(&tag)
            || kind::is_reserved(&tag)
        {
            return false;
        }
        match StepKind::classify(&tag) {
            StepKind::Expression(language) if step.expression.is_none() => {
                step.expression = Some(Expression::new(language, text));
            }
            _ => step.slots.push(Slot::Child {
                tag,
                node: Node::Text(text),
            }),
        }
        true
    }

    /// `expression: {lang: {expression: text, ...}}` or `expression: {lang: text}`
    fn expression_wrapper(&mut self, step: &mut Step, value: &Value, path: &str) {
        let parsed = value.as_mapping().and_then(single_entry).and_then(|(tag, body)| {
            ExpressionLanguage::from_tag(&tag).map(|language| (language, body))
        });
        let Some((language, body)) = parsed else {
            self.expected(path, "`{language: expression}`", value);
            return;
        };
        if step.expression.is_some() {
            self.diagnostics.unknown_shape(
                path,
                format!("`{}` already has an expression, wrapper ignored", step.kind),
            );
            return;
        }
        step.expression = Some(self.expression(language, body, path));
    }

    fn expression(&mut self, language: ExpressionLanguage, body: &Value, path: &str) -> Expression {
        let mut expression = Expression {
            language,
            text: None,
            attributes: Attributes::new(),
        };
        match body {
            Value::Mapping(map) => {
                for (key, value) in map {
                    let Some(key) = key_of(key) else { continue };
                    if key == "expression" {
                        expression.text = scalar_to_string(value);
                    } else {
                        self.attribute(&mut expression.attributes, &key, value, path);
                    }
                }
            }
            other => expression.text = scalar_to_string(other),
        }
        expression
    }

    /// Singular children; scalars are attributes unless the tag is a text child
    fn child(&mut self, step: &mut Step, key: &str, value: &Value, path: &str) {
        if !is_valid_name(key) {
            self.diagnostics
                .unknown_shape(path, format!("`{key}` is not a valid XML name, skipped"));
            return;
        }
        let key_path = child_path(path, key);
        match value {
            Value::Sequence(items) => {
                for item in items {
                    self.child_item(step, key, item, &key_path);
                }
            }
            Value::Mapping(_) | Value::Null => self.child_item(step, key, value, &key_path),
            scalar if is_scalar(scalar) && !kind::is_text_child(key) => {
                self.attribute(&mut step.attributes, key, scalar, path);
            }
            other => self.child_item(step, key, other, &key_path),
        }
    }

    fn child_item(&mut self, step: &mut Step, tag: &str, item: &Value, path: &str) {
        let node = match item {
            Value::Null => Node::Element(Step::new(tag)),
            Value::Mapping(_) => match self.step(tag, item, path) {
                Some(node) => Node::Element(node),
                None => return,
            },
            other => match scalar_to_string(other) {
                Some(text) => Node::Text(text),
                None => {
                    self.expected(path, "a scalar or a map", other);
                    return;
                }
            },
        };
        step.slots.push(Slot::Child {
            tag: tag.to_string(),
            node,
        });
    }
}

/// `uri` of an endpoint map
fn get_uri(value: &Value) -> Option<String> {
    value.as_mapping().and_then(|map| get_str(map, "uri"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::yaml;

    fn build(input: &str) -> Result<(Document, Diagnostics)> {
        let mut diagnostics = Diagnostics::new();
        let document = document(&yaml::parse(input)?, &mut diagnostics)?;
        Ok((document, diagnostics))
    }

    fn first_route(document: &Document) -> Route {
        document.routes.first().cloned().unwrap_or_default()
    }

    fn element_child(step: &Step, tag: &str) -> Step {
        match step.children(tag).next() {
            Some(Node::Element(child)) => child.clone(),
            other => panic!("expected `{tag}` element, got {other:?}"),
        }
    }

    #[test]
    fn test_route_steps_from_both_places() -> Result<()> {
        let (document, diagnostics) = build(
            r#"
- route:
    id: r1
    from:
      uri: "timer:foo?period=1000"
      steps:
        - log: first
    steps:
      - to: {uri: "log:out"}
"#,
        )?;
        assert!(diagnostics.is_empty());
        let route = first_route(&document);
        assert_eq!(route.id.as_deref(), Some("r1"));
        assert_eq!(route.from.uri, "timer:foo?period=1000");
        let kinds: Vec<&str> = route.steps.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, ["log", "to"]);
        assert_eq!(
            route.steps.first().and_then(|s| s.attributes.get("message")),
            Some("first")
        );
        Ok(())
    }

    #[test]
    fn test_choice_builds_branches() -> Result<()> {
        let (document, _) = build(
            r#"
- from:
    uri: direct:a
    steps:
      - choice:
          when:
            - simple: "${body} > 5"
              steps:
                - to: {uri: direct:big}
          otherwise:
            steps:
              - to: direct:small
"#,
        )?;
        let route = first_route(&document);
        let choice = route.steps.first().cloned().unwrap_or_default();
        assert_eq!(choice.kind, "choice");
        let when = element_child(&choice, "when");
        assert_eq!(
            when.expression,
            Some(Expression::new(ExpressionLanguage::Simple, "${body} > 5"))
        );
        assert_eq!(when.steps().count(), 1);
        let otherwise = element_child(&choice, "otherwise");
        assert_eq!(
            otherwise.steps().next().and_then(|s| s.attributes.get("uri")),
            Some("direct:small")
        );
        Ok(())
    }

    #[test]
    fn test_expression_wrapper_and_attributes() -> Result<()> {
        let (document, _) = build(
            r#"
- from:
    uri: direct:a
    steps:
      - setHeader:
          name: count
          expression:
            groovy: {expression: "1 + 1", resultType: int}
      - process: {ref: myProcessor}
      - setBody:
          expression: {constant: hello}
"#,
        )?;
        let route = first_route(&document);
        let header = route.steps.first().cloned().unwrap_or_default();
        assert_eq!(header.attributes.get("name"), Some("count"));
        let expression = header.expression.clone();
        assert_eq!(expression.as_ref().map(|e| e.language), Some(ExpressionLanguage::Groovy));
        assert_eq!(
            expression.as_ref().and_then(|e| e.attributes.get("resultType")),
            Some("int")
        );

        let process = route.steps.get(1).cloned().unwrap_or_default();
        assert!(process.expression.is_none());
        assert_eq!(process.attributes.get("ref"), Some("myProcessor"));

        let body = route.steps.get(2).cloned().unwrap_or_default();
        assert_eq!(
            body.expression,
            Some(Expression::new(ExpressionLanguage::Constant, "hello"))
        );
        Ok(())
    }

    #[test]
    fn test_scalar_steps_collapse_in_containers() -> Result<()> {
        let (document, _) = build(
            r#"
- from:
    uri: direct:a
    steps:
      - filter:
          steps:
            - simple: "${header.ok}"
            - header: x
            - to: log:kept
"#,
        )?;
        let filter = first_route(&document).steps.first().cloned().unwrap_or_default();
        assert_eq!(
            filter.expression.as_ref().map(|e| e.language),
            Some(ExpressionLanguage::Simple)
        );
        assert_eq!(
            filter.children("header").collect::<Vec<_>>(),
            [&Node::Text("x".to_string())]
        );
        assert_eq!(filter.steps().count(), 1);
        Ok(())
    }

    #[test]
    fn test_lists_expand_to_repeated_children() -> Result<()> {
        let (document, _) = build(
            r#"
- from:
    uri: direct:a
    steps:
      - doTry:
          steps:
            - to: direct:risky
          doCatch:
            - exception: [java.io.IOException, java.sql.SQLException]
              onWhen: {simple: "${exception.message} contains 'x'"}
              steps:
                - log: caught
"#,
        )?;
        let try_step = first_route(&document).steps.first().cloned().unwrap_or_default();
        let catch = element_child(&try_step, "doCatch");
        assert_eq!(catch.children("exception").count(), 2);
        let on_when = element_child(&catch, "onWhen");
        assert!(on_when.expression.is_some());
        assert_eq!(catch.steps().count(), 1);
        Ok(())
    }

    #[test]
    fn test_flat_entities() -> Result<()> {
        let (document, diagnostics) = build(
            r##"
- beans:
    - name: ds
      type: org.example.DataSource
      factoryBean: factory
      factoryMethod: create
      init-method: start
      constructors: {1: second, 0: first}
      properties:
        url: "jdbc:h2:mem:test"
        pool: "#bean:pool"
        size: 10
- reference: {id: tx, interface: javax.transaction.TransactionManager}
- restConfiguration:
    component: netty-http
    port: 8080
    dataFormatProperty:
      - {key: prettyPrint, value: true}
- rest:
    id: orders
    path: /orders
    get:
      - uri: "/{id}"
        description: Find
        to: direct:find
"##,
        )?;
        assert!(diagnostics.is_empty());

        let bean = document.beans.first().cloned().unwrap_or_default();
        assert_eq!(bean.arguments, ["first", "second"]);
        assert_eq!(bean.extra.get("init-method"), Some("start"));
        assert_eq!(
            bean.properties.get("pool"),
            Some(&PropertyValue::Ref("pool".to_string()))
        );
        assert_eq!(
            bean.properties.get("size"),
            Some(&PropertyValue::Value("10".to_string()))
        );
        assert_eq!(document.references.len(), 1);

        let configuration = document.rest_configuration.clone().unwrap_or_default();
        assert_eq!(configuration.attributes.get("port"), Some("8080"));
        let property = configuration
            .property_lists
            .get("dataFormatProperty")
            .and_then(|list| list.first())
            .cloned()
            .unwrap_or_default();
        assert_eq!(property.get("value"), Some("true"));

        let api = document.rest_apis.first().cloned().unwrap_or_default();
        let get = api.verbs.get(&HttpVerb::Get).cloned().unwrap_or_default();
        assert_eq!(get.first().and_then(|v| v.to.as_deref()), Some("direct:find"));
        Ok(())
    }

    #[test]
    fn test_problems_become_diagnostics() -> Result<()> {
        let (document, diagnostics) = build(
            r#"
- beans:
    - type: NoName
- reference: {id: only-id}
- route:
    id: no-from
    steps: []
- route:
    from:
      uri: direct:ok
      steps:
        - log: [not, allowed]
        - "bad entry"
        - "bad name": {}
- unknownSection: {}
"#,
        )?;
        assert!(document.beans.is_empty());
        assert!(document.references.is_empty());
        assert_eq!(document.routes.len(), 1);
        assert!(first_route(&document).steps.is_empty());

        let kinds: Vec<DiagnosticKind> = diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            [
                DiagnosticKind::MissingRequiredField,
                DiagnosticKind::MissingRequiredField,
                DiagnosticKind::MissingRequiredField,
                DiagnosticKind::UnknownShape,
                DiagnosticKind::UnknownShape,
                DiagnosticKind::UnknownShape,
                DiagnosticKind::UnknownShape,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_item_key_is_rejected_not_wrapped() -> Result<()> {
        let (document, diagnostics) = build(
            r#"
- from:
    uri: direct:a
    steps:
      - enrich: {uri: "direct:b", item: [a, b]}
      - split:
          simple: "${body}"
          steps:
            - item: c
"#,
        )?;
        let steps = first_route(&document).steps;
        let enrich = steps.first().cloned().unwrap_or_default();
        assert_eq!(enrich.attributes.get("uri"), Some("direct:b"));
        assert!(enrich.slots.is_empty());
        let split = steps.get(1).cloned().unwrap_or_default();
        assert!(split.slots.is_empty());

        assert_eq!(diagnostics.len(), 2);
        let suffixes = ["steps[0]/enrich/item", "split/steps[0]/item"];
        for (diagnostic, suffix) in diagnostics.iter().zip(suffixes) {
            assert!(diagnostic.path.ends_with(suffix), "{}", diagnostic.path);
            assert_eq!(diagnostic.kind, DiagnosticKind::UnknownShape);
        }
        Ok(())
    }

    #[test]
    fn test_root_shapes() -> Result<()> {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(document(&Value::Null, &mut diagnostics)?, Document::default());
        match document(&Value::from("text"), &mut diagnostics) {
            Err(err) => assert_eq!(
                err.kind(),
                &ErrorKind::UnexpectedRoot {
                    found: "a string".to_string()
                }
            ),
            Ok(document) => panic!("expected error, got {document:?}"),
        }
        Ok(())
    }
}
