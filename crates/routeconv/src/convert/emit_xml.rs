//! XML emitter: canonical document into a blueprint element tree
//!
//! Ordered lists are grouped under synthetic wrapper elements (`steps`,
//! `children`, `item`) that [`wrappers`](super::wrappers) removes afterwards.

use crate::convert::wrappers::{CHILDREN, ITEM, STEPS};
use crate::convert::ConvertOptions;
use crate::model::{
    Attributes, Bean, Document, Expression, Node, PropertyValue, Reference, RestApi,
    RestConfiguration, Route, Slot, Step,
};
use crate::uri;
use crate::xml::{self, Element};

const BLUEPRINT_NAMESPACES: &[(&str, &str)] = &[
    ("xmlns", "http://www.osgi.org/xmlns/blueprint/v1.0.0"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    (
        "xmlns:cm",
        "http://aries.apache.org/blueprint/xmlns/blueprint-cm/v1.0.0",
    ),
    ("xmlns:camel", "http://camel.apache.org/schema/blueprint"),
    (
        "xsi:schemaLocation",
        concat!(
            "http://www.osgi.org/xmlns/blueprint/v1.0.0 ",
            "http://www.osgi.org/xmlns/blueprint/v1.0.0/blueprint.xsd ",
            "http://aries.apache.org/blueprint/xmlns/blueprint-cm/v1.0.0 ",
            "http://aries.apache.org/blueprint/xmlns/blueprint-cm/v1.0.0/blueprint-cm.xsd ",
            "http://camel.apache.org/schema/blueprint ",
            "http://camel.apache.org/schema/blueprint/camel-blueprint.xsd"
        ),
    ),
];

const CAMEL_NAMESPACE: &str = "http://camel.apache.org/schema/blueprint";

/// Blueprint document with every section container present
pub fn document(document: &Document, options: &ConvertOptions) -> xml::Document {
    let mut root = Element::new("blueprint");
    for (key, value) in BLUEPRINT_NAMESPACES {
        root.set_attribute(*key, *value);
    }

    let placeholder = &options.placeholder;
    root.push_element(
        Element::new("cm:property-placeholder")
            .with_attribute("id", placeholder.id.as_str())
            .with_attribute("persistent-id", placeholder.persistent_id.as_str())
            .with_attribute("update-strategy", placeholder.update_strategy.as_str()),
    );

    for item in &document.references {
        root.push_element(reference(item));
    }

    let mut context = Element::new("camelContext")
        .with_attribute("id", options.camel_context_id.as_str())
        .with_attribute("xmlns", CAMEL_NAMESPACE);
    if let Some(configuration) = &document.rest_configuration {
        context.push_element(rest_configuration(configuration));
    }
    for api in &document.rest_apis {
        context.push_element(rest(api));
    }
    for item in &document.routes {
        context.push_element(route(item));
    }
    root.push_element(context);

    for item in &document.beans {
        root.push_element(bean(item));
    }

    xml::Document { root }
}

fn with_attributes(mut element: Element, attributes: &Attributes) -> Element {
    for (key, value) in attributes {
        element.set_attribute(key.as_str(), value.as_str());
    }
    element
}

fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(name);
    element.push_text(text);
    element
}

/// `value="..."` or `ref="..."` on `element`
fn with_value(element: Element, value: &PropertyValue) -> Element {
    match value {
        PropertyValue::Value(value) => element.with_attribute("value", value.as_str()),
        PropertyValue::Ref(name) => element.with_attribute("ref", name.as_str()),
    }
}

fn bean(bean: &Bean) -> Element {
    let mut element = Element::new("bean").with_attribute("id", bean.name.as_str());
    element.set_optional("class", bean.bean_type.as_deref());
    element.set_optional("factory-ref", bean.factory_bean.as_deref());
    element.set_optional("factory-method", bean.factory_method.as_deref());
    let mut element = with_attributes(element, &bean.extra);

    for argument in &bean.arguments {
        element.push_element(with_value(
            Element::new("argument"),
            &PropertyValue::parse(argument),
        ));
    }
    for (name, value) in &bean.properties {
        element.push_element(with_value(
            Element::new("property").with_attribute("name", name.as_str()),
            value,
        ));
    }
    element
}

fn reference(reference: &Reference) -> Element {
    let mut element = Element::new("reference")
        .with_attribute("id", reference.id.as_str())
        .with_attribute("interface", reference.interface.as_str());
    element.set_optional("filter", reference.filter.as_deref());
    element
}

fn rest_configuration(configuration: &RestConfiguration) -> Element {
    let mut element = with_attributes(Element::new("restConfiguration"), &configuration.attributes);
    for (tag, list) in &configuration.property_lists {
        let mut item = Element::new(ITEM);
        for attributes in list {
            item.push_element(with_attributes(Element::new(tag.as_str()), attributes));
        }
        element.push_element(item);
    }
    element
}

fn rest(api: &RestApi) -> Element {
    let mut element = Element::new("rest");
    element.set_optional("id", api.id.as_deref());
    element.set_optional("path", api.path.as_deref());
    let mut element = with_attributes(element, &api.attributes);
    if let Some(description) = &api.description {
        element.push_element(text_element("description", description));
    }

    for (verb, operations) in &api.verbs {
        let mut item = Element::new(ITEM);
        for operation in operations {
            let mut child = with_attributes(Element::new(verb.tag()), &operation.attributes);
            if let Some(description) = &operation.description {
                child.push_element(text_element("description", description));
            }
            if let Some(to) = &operation.to {
                child.push_element(Element::new("to").with_attribute("uri", to.as_str()));
            }
            item.push_element(child);
        }
        element.push_element(item);
    }
    element
}

fn route(route: &Route) -> Element {
    let mut element = Element::new("route");
    element.set_optional("id", route.id.as_deref());
    element.set_optional("errorHandlerRef", route.error_handler_ref.as_deref());
    let mut element = with_attributes(element, &route.attributes);
    if let Some(description) = &route.description {
        element.push_element(text_element("description", description));
    }

    let from = Element::new("from").with_attribute(
        "uri",
        uri::pack(&route.from.uri, &route.from.parameters),
    );
    element.push_element(with_attributes(from, &route.from.attributes));

    let mut steps = Element::new(STEPS);
    for step in &route.steps {
        steps.push_element(self::step(step));
    }
    element.push_element(steps);
    element
}

/// Step element: text, then expression, then slots in order
pub fn step(step: &Step) -> Element {
    let mut element = with_attributes(Element::new(step.kind.as_str()), &step.attributes);
    if let Some(text) = &step.text {
        element.push_text(text.as_str());
    }
    if let Some(expression) = &step.expression {
        element.push_element(self::expression(expression));
    }
    push_slots(&mut element, &step.slots);
    element
}

fn expression(expression: &Expression) -> Element {
    let mut element = with_attributes(
        Element::new(expression.language.tag()),
        &expression.attributes,
    );
    if let Some(text) = &expression.text {
        element.push_text(text.as_str());
    }
    element
}

fn node(tag: &str, node: &Node) -> Element {
    match node {
        Node::Text(text) => text_element(tag, text),
        Node::Element(child) => step(child),
    }
}

/// Runs of nested steps go under `steps`, runs of a repeated tag under `children`
fn push_slots(element: &mut Element, slots: &[Slot]) {
    let mut index = 0;
    while let Some(slot) = slots.get(index) {
        let run = slots
            .get(index..)
            .unwrap_or_default()
            .iter()
            .take_while(|other| same_group(slot, other))
            .count()
            .max(1);

        let members = slots.get(index..index + run).unwrap_or_default();
        match slot {
            Slot::Step(_) => {
                let mut wrapper = Element::new(STEPS);
                for member in members {
                    if let Slot::Step(nested) = member {
                        wrapper.push_element(step(nested));
                    }
                }
                element.push_element(wrapper);
            }
            Slot::Child { tag, node: first } if run == 1 => {
                element.push_element(node(tag, first));
            }
            Slot::Child { tag, .. } => {
                let mut wrapper = Element::new(CHILDREN);
                for member in members {
                    if let Slot::Child { node: child, .. } = member {
                        wrapper.push_element(node(tag, child));
                    }
                }
                element.push_element(wrapper);
            }
        }
        index += run;
    }
}

fn same_group(first: &Slot, other: &Slot) -> bool {
    match (first, other) {
        (Slot::Step(_), Slot::Step(_)) => true,
        (Slot::Child { tag: a, .. }, Slot::Child { tag: b, .. }) => a == b,
        _ => false,
    }
}
