//! Synthetic-wrapper elimination
//!
//! Removes attribute-less `steps`, `children` and `item` elements and splices
//! their content into the parent at the same position. Only names and
//! attribute presence are inspected, so running the pass twice changes nothing.

use crate::xml::{Content, Document, Element};

pub const STEPS: &str = "steps";
pub const CHILDREN: &str = "children";
pub const ITEM: &str = "item";

const WRAPPERS: [&str; 3] = [STEPS, CHILDREN, ITEM];

pub fn is_wrapper(element: &Element) -> bool {
    element.attributes.is_empty() && WRAPPERS.contains(&element.name.as_str())
}

/// Eliminate wrappers below the root; the root itself is kept
pub fn eliminate_document(document: Document) -> Document {
    Document {
        root: eliminate(document.root),
    }
}

/// Eliminate wrappers among the descendants of `element`
pub fn eliminate(mut element: Element) -> Element {
    let children = std::mem::take(&mut element.children);
    element.children = Vec::with_capacity(children.len());
    splice(children, &mut element.children);
    element
}

fn splice(children: Vec<Content>, output: &mut Vec<Content>) {
    for child in children {
        match child {
            Content::Element(wrapper) if is_wrapper(&wrapper) => splice(wrapper.children, output),
            Content::Element(element) => output.push(Content::Element(eliminate(element))),
            text @ Content::Text(_) => output.push(text),
        }
    }
}
