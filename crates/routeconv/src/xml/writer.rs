//! Pretty XML serializer

use crate::xml::model::{Content, Document, Element};
use crate::xml::Config;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Writes an element tree as indented XML text
#[derive(Clone, Copy, Debug)]
pub struct Writer {
    config: Config,
}

impl Writer {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn write(&self, document: &Document) -> String {
        let mut output = String::new();
        if self.config.declaration {
            output.push_str(DECLARATION);
            output.push('\n');
        }
        self.write_element(&document.root, 0, &mut output);
        output
    }

    fn write_element(&self, element: &Element, depth: usize, output: &mut String) {
        self.pad(depth, output);
        output.push('<');
        output.push_str(&element.name);

        for (key, value) in &element.attributes {
            output.push(' ');
            output.push_str(key);
            output.push_str("=\"");
            output.push_str(&escape_attribute(value));
            output.push('"');
        }

        if element.children.is_empty() {
            output.push_str("/>\n");
            return;
        }

        output.push('>');

        // text-only content stays on the tag's line
        if !element.has_elements() {
            for child in &element.children {
                if let Content::Text(text) = child {
                    output.push_str(&escape_text(text));
                }
            }
            close_tag(&element.name, output);
            return;
        }

        output.push('\n');
        for child in &element.children {
            match child {
                Content::Element(child) => self.write_element(child, depth + 1, output),
                Content::Text(text) => {
                    self.pad(depth + 1, output);
                    output.push_str(&escape_text(text.trim()));
                    output.push('\n');
                }
            }
        }
        self.pad(depth, output);
        close_tag(&element.name, output);
    }

    fn pad(&self, depth: usize, output: &mut String) {
        for _ in 0..depth.saturating_mul(self.config.indent) {
            output.push(' ');
        }
    }
}

fn close_tag(name: &str, output: &mut String) {
    output.push_str("</");
    output.push_str(name);
    output.push_str(">\n");
}

/// Escape text for a double-quoted attribute value
pub fn escape_attribute(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape character data
pub fn escape_text(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
