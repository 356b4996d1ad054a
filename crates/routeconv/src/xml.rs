//! XML tree adapter: ordered element tree, parser and pretty writer

pub mod cursor;
pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Content, Document, Element};
pub use parser::Parser;
pub use writer::Writer;

/// Configuration for reading and writing XML
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Spaces per indentation level in written output
    pub indent: usize,
    /// Write an `<?xml ...?>` declaration before the root
    pub declaration: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            indent: 2,
            declaration: true,
        }
    }
}

/// Parse an XML document with default configuration
pub fn from_str(input: &str) -> crate::Result<Document> {
    Parser::new(input.as_bytes()).parse()
}

/// Write an XML document with default configuration
pub fn to_string(document: &Document) -> String {
    Writer::new(Config::default()).write(document)
}
