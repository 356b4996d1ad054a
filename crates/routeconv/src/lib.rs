//! routeconv - convert integration routes between XML blueprints and the YAML DSL
//!
//! Both directions go through one canonical [`model::Document`]. Problems
//! that do not prevent a conversion come back as [`Diagnostic`]s next to the
//! output; only unreadable input is an [`Error`].
//!
//! # Quick Start
//!
//! ```
//! use routeconv::{xml_to_yaml, yaml_to_xml};
//! # fn main() -> Result<(), routeconv::Error> {
//! let yaml = r#"
//! - route:
//!     id: r1
//!     from:
//!       uri: "timer:foo?period=1000"
//!     steps:
//!       - to:
//!           uri: "log:out"
//! "#;
//! let xml = yaml_to_xml(yaml)?;
//! assert!(xml.output.contains(r#"<from uri="timer:foo?period=1000"/>"#));
//! assert!(!xml.output.contains("<steps>"));
//!
//! let back = xml_to_yaml(&xml.output)?;
//! assert!(back.output.contains("timerName: foo"));
//! assert!(back.output.contains("period: '1000'"));
//! assert!(back.diagnostics.is_empty());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

pub mod kind;
pub use kind::{ContainerKind, ExpressionLanguage, StepKind};

pub mod model;
pub use model::{Attributes, Document, Node, Slot, Step};

pub mod ids;
pub mod uri;
pub mod xml;
pub mod yaml;

pub mod convert;
pub use convert::{
    convert, convert_with_options, xml_to_yaml, xml_to_yaml_with_options, yaml_to_xml,
    yaml_to_xml_with_options, Conversion, ConvertOptions, Format, PropertyPlaceholder,
};

pub use xml::{
    Config as XmlConfig, Content as XmlContent, Document as XmlDocument, Element as XmlElement,
    Parser as XmlParser,
};
