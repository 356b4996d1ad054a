//! Step-tree normalizer: XML elements into canonical steps

use crate::diagnostics::{child_path, Diagnostics};
use crate::kind::{self, ExpressionLanguage, StepKind};
use crate::model::{Attributes, Expression, Node, Slot, Step};
use crate::xml::Element;

/// Normalize one step element and everything below it
///
/// Returns `None` when the element's tag cannot be represented.
pub fn step(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> Option<Step> {
    let kind = element.local_name();
    if kind::is_reserved(kind) {
        diagnostics.unknown_shape(path, format!("reserved tag `{kind}` dropped"));
        return None;
    }

    let mut step = Step::new(kind);
    step.attributes = attributes(element, path, diagnostics);
    if !element.has_elements() {
        step.text = element.text();
    }

    let container = StepKind::classify(kind).is_container();
    for child in element.elements() {
        let tag = child.local_name();
        let path = child_path(path, tag);

        if kind::is_reserved(tag) {
            diagnostics.unknown_shape(&path, format!("reserved tag `{tag}` dropped"));
            continue;
        }

        match StepKind::classify(tag) {
            StepKind::Expression(language) if step.expression.is_none() => {
                step.expression = Some(expression(language, child, &path, diagnostics));
                continue;
            }
            StepKind::Expression(_) => {
                diagnostics.unknown_shape(
                    &path,
                    format!("`{kind}` already has an expression, `{tag}` kept as a child"),
                );
                push_child(&mut step, child, &path, diagnostics);
                continue;
            }
            StepKind::Clause => {
                push_child(&mut step, child, &path, diagnostics);
                continue;
            }
            StepKind::Container(_) | StepKind::Plain => {}
        }

        if kind::branch(kind, tag).is_some() {
            push_child(&mut step, child, &path, diagnostics);
            continue;
        }

        if child.is_text_only() {
            if let Some(text) = child.text() {
                step.slots.push(Slot::Child {
                    tag: tag.to_string(),
                    node: Node::Text(text),
                });
            }
            continue;
        }

        if container {
            if let Some(nested) = self::step(child, &path, diagnostics) {
                step.slots.push(Slot::Step(nested));
            }
        } else {
            push_child(&mut step, child, &path, diagnostics);
        }
    }

    Some(step)
}

fn push_child(step: &mut Step, child: &Element, path: &str, diagnostics: &mut Diagnostics) {
    if let Some(node) = self::step(child, path, diagnostics) {
        step.slots.push(Slot::Child {
            tag: node.kind.clone(),
            node: Node::Element(node),
        });
    }
}

fn expression(
    language: ExpressionLanguage,
    element: &Element,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Expression {
    if element.has_elements() {
        diagnostics.unknown_shape(path, "nested elements inside an expression are ignored");
    }
    Expression {
        language,
        text: element.text(),
        attributes: attributes(element, path, diagnostics),
    }
}

/// Copy attributes in order, dropping names reserved for YAML structure
pub(crate) fn attributes(element: &Element, path: &str, diagnostics: &mut Diagnostics) -> Attributes {
    let mut attributes = Attributes::new();
    for (key, value) in &element.attributes {
        if kind::is_reserved(key) {
            diagnostics.unknown_shape(path, format!("reserved attribute `{key}` dropped"));
            continue;
        }
        attributes.insert(key.as_str(), value.as_str());
    }
    attributes
}
