//! Document conversion between the XML blueprint dialect and the YAML DSL

pub mod build;
pub mod emit_xml;
pub mod emit_yaml;
pub mod extract;
pub mod normalize;
pub mod wrappers;

use std::path::Path;

use tracing::{debug, instrument};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::model::Document;
use crate::xml::{Config as XmlConfig, Parser as XmlParser, Writer as XmlWriter};
use crate::{ids, uri, yaml};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Xml,
    Yaml,
}

impl Format {
    /// Format for a file extension (`xml`, `yaml`, `yml`)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xml" => Some(Self::Xml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Settings of the `cm:property-placeholder` written into XML output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyPlaceholder {
    pub id: String,
    pub persistent_id: String,
    pub update_strategy: String,
}

impl Default for PropertyPlaceholder {
    fn default() -> Self {
        Self {
            id: "settings.props".to_string(),
            persistent_id: "settings".to_string(),
            update_strategy: "reload".to_string(),
        }
    }
}

/// Conversion options
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    pub xml: XmlConfig,
    pub placeholder: PropertyPlaceholder,
    pub camel_context_id: String,
    /// Drop editor-generated `id` values before building XML
    pub strip_generated_ids: bool,
    /// Split endpoint URIs into `uri` + `parameters` in YAML output
    pub unpack_uris: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            xml: XmlConfig::default(),
            placeholder: PropertyPlaceholder::default(),
            camel_context_id: "camelContext".to_string(),
            strip_generated_ids: true,
            unpack_uris: true,
        }
    }
}

/// Converted text plus the recoverable problems met on the way
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert between the two formats
pub fn convert(input: &str, from: Format, to: Format) -> Result<Conversion> {
    convert_with_options(input, from, to, &ConvertOptions::default())
}

/// Convert between the two formats with options
pub fn convert_with_options(
    input: &str,
    from: Format,
    to: Format,
    options: &ConvertOptions,
) -> Result<Conversion> {
    match (from, to) {
        (Format::Xml, Format::Yaml) => xml_to_yaml_with_options(input, options),
        (Format::Yaml, Format::Xml) => yaml_to_xml_with_options(input, options),
        (Format::Xml, Format::Xml) | (Format::Yaml, Format::Yaml) => Ok(Conversion {
            output: input.to_string(),
            diagnostics: Vec::new(),
        }),
    }
}

pub fn xml_to_yaml(input: &str) -> Result<Conversion> {
    xml_to_yaml_with_options(input, &ConvertOptions::default())
}

#[instrument(skip_all)]
pub fn xml_to_yaml_with_options(input: &str, options: &ConvertOptions) -> Result<Conversion> {
    let mut diagnostics = Diagnostics::new();
    let document = read_xml(input, options, &mut diagnostics)?;
    log_counts("xml", &document);
    let output = write_yaml(&document, options, &mut diagnostics)?;
    debug!(diagnostics = diagnostics.len(), "yaml written");
    Ok(Conversion {
        output,
        diagnostics: diagnostics.into_vec(),
    })
}

pub fn yaml_to_xml(input: &str) -> Result<Conversion> {
    yaml_to_xml_with_options(input, &ConvertOptions::default())
}

#[instrument(skip_all)]
pub fn yaml_to_xml_with_options(input: &str, options: &ConvertOptions) -> Result<Conversion> {
    let mut diagnostics = Diagnostics::new();
    let document = read_yaml(input, options, &mut diagnostics)?;
    log_counts("yaml", &document);
    let output = write_xml(&document, options);
    debug!(diagnostics = diagnostics.len(), "xml written");
    Ok(Conversion {
        output,
        diagnostics: diagnostics.into_vec(),
    })
}

/// Parse XML text into the canonical model
pub fn read_xml(
    input: &str,
    options: &ConvertOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Document> {
    let mut parser = XmlParser::with_config(input.as_bytes(), options.xml);
    let xml = parser.parse()?;
    Ok(extract::document(&xml.root, diagnostics))
}

/// Parse YAML text into the canonical model
pub fn read_yaml(
    input: &str,
    options: &ConvertOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Document> {
    let mut tree = uri::pack_tree(&yaml::parse(input)?);
    if options.strip_generated_ids {
        tree = ids::strip_generated_ids(&tree);
    }
    build::document(&tree, diagnostics)
}

/// Render the canonical model as YAML text
pub fn write_yaml(
    document: &Document,
    options: &ConvertOptions,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let mut tree = emit_yaml::document(document, diagnostics);
    if options.unpack_uris {
        tree = uri::unpack_tree(&tree);
    }
    yaml::to_string(&tree)
}

/// Render the canonical model as XML text
pub fn write_xml(document: &Document, options: &ConvertOptions) -> String {
    let xml = wrappers::eliminate_document(emit_xml::document(document, options));
    XmlWriter::new(options.xml).write(&xml)
}

fn log_counts(source: &str, document: &Document) {
    debug!(
        source,
        beans = document.beans.len(),
        references = document.references.len(),
        rest_configuration = document.rest_configuration.is_some(),
        rest_apis = document.rest_apis.len(),
        routes = document.routes.len(),
        "document read"
    );
}
