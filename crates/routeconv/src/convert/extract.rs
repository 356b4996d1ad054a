//! Entity extractors: XML sections into the canonical document
//!
//! Each entity is extracted on its own. A bean that cannot be read is
//! skipped with a diagnostic and never affects the routes next to it.

use crate::convert::normalize;
use crate::diagnostics::{child_path, Diagnostics};
use crate::model::{
    Bean, Document, Endpoint, HttpVerb, PropertyValue, Reference, RestApi, RestConfiguration,
    Route, Verb,
};
use crate::xml::Element;

/// Extract every section below `root`
pub fn document(root: &Element, diagnostics: &mut Diagnostics) -> Document {
    let mut document = Document::default();
    match root.local_name() {
        "route" => {
            if let Some(route) = route(root, &segment(root, "route", 0), diagnostics) {
                document.routes.push(route);
            }
        }
        _ => sections(root, &mut document, diagnostics),
    }
    document
}

fn sections(parent: &Element, document: &mut Document, diagnostics: &mut Diagnostics) {
    for element in parent.elements() {
        let tag = element.local_name();
        match tag {
            "bean" => {
                let path = segment(element, tag, document.beans.len());
                if let Some(bean) = bean(element, &path, diagnostics) {
                    document.beans.push(bean);
                }
            }
            "reference" => {
                let path = segment(element, tag, document.references.len());
                if let Some(reference) = reference(element, &path, diagnostics) {
                    document.references.push(reference);
                }
            }
            "restConfiguration" => {
                if document.rest_configuration.is_some() {
                    diagnostics.unknown_shape(tag, "only one restConfiguration is allowed, extra one dropped");
                } else {
                    document.rest_configuration = Some(rest_configuration(element, diagnostics));
                }
            }
            "rest" => {
                let path = segment(element, tag, document.rest_apis.len());
                document.rest_apis.push(rest(element, &path, diagnostics));
            }
            "route" => {
                let path = segment(element, tag, document.routes.len());
                if let Some(route) = route(element, &path, diagnostics) {
                    document.routes.push(route);
                }
            }
            "camelContext" | "routes" | "rests" => sections(element, document, diagnostics),
            "property-placeholder" => {}
            _ => diagnostics.unknown_shape(tag, format!("unsupported section `{tag}` skipped")),
        }
    }
}

/// Path segment `tag[id]`, or `tag[index]` without an id
fn segment(element: &Element, tag: &str, index: usize) -> String {
    match element.attribute("id") {
        Some(id) => format!("{tag}[{id}]"),
        None => format!("{tag}[{index}]"),
    }
}

fn bean(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> Option<Bean> {
    let Some(name) = element.attribute("id") else {
        diagnostics.missing_field(path, "id");
        return None;
    };

    let mut bean = Bean {
        name: name.to_string(),
        ..Bean::default()
    };
    for (key, value) in &element.attributes {
        match key.as_str() {
            "id" => {}
            "class" => bean.bean_type = Some(value.clone()),
            "factory-ref" | "factory-bean" => bean.factory_bean = Some(value.clone()),
            "factory-method" => bean.factory_method = Some(value.clone()),
            _ => {
                bean.extra.insert(key.as_str(), value.as_str());
            }
        }
    }

    for child in element.elements() {
        let tag = child.local_name();
        let child_path = child_path(path, tag);
        match tag {
            "argument" => match property_value(child) {
                Some(value) => bean.arguments.push(value.to_string()),
                None => diagnostics.unknown_shape(&child_path, "argument without a value skipped"),
            },
            "property" => {
                let Some(name) = child.attribute("name") else {
                    diagnostics.missing_field(&child_path, "name");
                    continue;
                };
                match property_value(child) {
                    Some(value) => {
                        bean.properties.insert(name.to_string(), value);
                    }
                    None => diagnostics.unknown_shape(
                        &child_path,
                        format!("property `{name}` without a value skipped"),
                    ),
                }
            }
            _ => diagnostics.unknown_shape(&child_path, format!("unsupported bean child `{tag}`")),
        }
    }

    Some(bean)
}

/// `value=`, `ref=`, text content or a nested `<value>` element
fn property_value(element: &Element) -> Option<PropertyValue> {
    if let Some(value) = element.attribute("value") {
        return Some(PropertyValue::Value(value.to_string()));
    }
    if let Some(name) = element.attribute("ref") {
        return Some(PropertyValue::Ref(name.to_string()));
    }
    element
        .text()
        .or_else(|| element.elements_named("value").find_map(Element::text))
        .map(PropertyValue::Value)
}

fn reference(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> Option<Reference> {
    let Some(id) = element.attribute("id") else {
        diagnostics.missing_field(path, "id");
        return None;
    };
    let Some(interface) = element.attribute("interface") else {
        diagnostics.missing_field(path, "interface");
        return None;
    };
    for key in element.attributes.keys() {
        if !matches!(key.as_str(), "id" | "interface" | "filter") {
            diagnostics.unknown_shape(path, format!("reference attribute `{key}` ignored"));
        }
    }
    Some(Reference {
        id: id.to_string(),
        interface: interface.to_string(),
        filter: element.attribute("filter").map(str::to_string),
    })
}

fn rest_configuration(element: &Element, diagnostics: &mut Diagnostics) -> RestConfiguration {
    let path = "restConfiguration";
    let mut configuration = RestConfiguration {
        attributes: normalize::attributes(element, path, diagnostics),
        ..RestConfiguration::default()
    };
    for child in element.elements() {
        let tag = child.local_name();
        if child.has_elements() {
            diagnostics.unknown_shape(
                &child_path(path, tag),
                "nested elements inside a property are ignored",
            );
        }
        configuration
            .property_lists
            .entry(tag.to_string())
            .or_default()
            .push(normalize::attributes(child, path, diagnostics));
    }
    configuration
}

fn rest(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> RestApi {
    let mut api = RestApi::default();
    for (key, value) in &element.attributes {
        match key.as_str() {
            "id" => api.id = Some(value.clone()),
            "path" => api.path = Some(value.clone()),
            _ => {
                api.attributes.insert(key.as_str(), value.as_str());
            }
        }
    }

    for child in element.elements() {
        let tag = child.local_name();
        let child_path = child_path(path, tag);
        if tag == "description" {
            api.description = child.text();
        } else if let Some(verb) = HttpVerb::from_tag(tag) {
            api.verbs
                .entry(verb)
                .or_default()
                .push(self::verb(child, &child_path, diagnostics));
        } else {
            diagnostics.unknown_shape(&child_path, format!("unsupported rest child `{tag}`"));
        }
    }
    api
}

fn verb(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> Verb {
    let mut verb = Verb {
        attributes: normalize::attributes(element, path, diagnostics),
        ..Verb::default()
    };
    for child in element.elements() {
        match child.local_name() {
            "description" => verb.description = child.text(),
            "to" => verb.to = child.attribute("uri").map(str::to_string),
            tag => diagnostics.unknown_shape(
                &child_path(path, tag),
                format!("unsupported verb child `{tag}`"),
            ),
        }
    }
    verb
}

fn route(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> Option<Route> {
    let mut route = Route::default();
    for (key, value) in &element.attributes {
        match key.as_str() {
            "id" => route.id = Some(value.clone()),
            "errorHandlerRef" => route.error_handler_ref = Some(value.clone()),
            _ => {
                route.attributes.insert(key.as_str(), value.as_str());
            }
        }
    }

    let mut from = None;
    for child in element.elements() {
        let tag = child.local_name();
        let child_path = child_path(path, tag);
        match tag {
            "from" if from.is_none() => from = endpoint(child, &child_path, diagnostics),
            "from" => diagnostics.unknown_shape(&child_path, "second `from` ignored"),
            "description" if !child.has_elements() => route.description = child.text(),
            _ => {
                if let Some(step) = normalize::step(child, &child_path, diagnostics) {
                    route.steps.push(step);
                }
            }
        }
    }

    match from {
        Some(from) => {
            route.from = from;
            Some(route)
        }
        None => {
            diagnostics.missing_field(path, "from.uri");
            None
        }
    }
}

fn endpoint(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> Option<Endpoint> {
    let uri = element.attribute("uri")?;
    let mut endpoint = Endpoint {
        uri: uri.to_string(),
        ..Endpoint::default()
    };
    for (key, value) in &element.attributes {
        if key != "uri" {
            endpoint.attributes.insert(key.as_str(), value.as_str());
        }
    }
    for child in element.elements() {
        let tag = child.local_name();
        let name = child.attribute("name");
        let value = child.attribute("value").map(str::to_string).or_else(|| child.text());
        match (tag, name, value) {
            ("parameter", Some(name), Some(value)) => {
                endpoint.parameters.insert(name, value);
            }
            _ => diagnostics.unknown_shape(
                &child_path(path, tag),
                format!("unsupported endpoint child `{tag}`"),
            ),
        }
    }
    Some(endpoint)
}
