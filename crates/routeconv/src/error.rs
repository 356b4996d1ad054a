//! Error types for routeconv
//!
//! Only input that cannot be parsed at all is an [`Error`]. Shape problems
//! inside a well-formed document are reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// XML markup that does not fit the grammar at this point
    UnexpectedToken,
    /// Closing tag does not match the open element
    MismatchedTag { expected: String, found: String },
    /// Comment, CDATA, processing instruction or element never closed
    UnterminatedMarkup,
    /// Unknown or malformed `&...;` reference
    InvalidEntity { entity: String },
    DuplicateAttribute { name: String },
    InvalidUtf8,
    MaxDepthExceeded { max: u16 },
    /// Malformed YAML reported by the YAML reader
    Yaml,
    /// Well-formed YAML whose root is not a sequence of sections
    UnexpectedRoot { found: String },
    /// Output tree could not be rendered
    Serialize,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "expected closing tag </{expected}>, found </{found}>")
            }
            Self::UnterminatedMarkup => write!(f, "unterminated markup"),
            Self::InvalidEntity { entity } => write!(f, "invalid entity: &{entity};"),
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::Yaml => write!(f, "invalid yaml"),
            Self::UnexpectedRoot { found } => {
                write!(f, "expected a sequence of sections at the root, found {found}")
            }
            Self::Serialize => write!(f, "failed to serialize output"),
        }
    }
}

/// Main error type for routeconv
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::at(pos))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == Span::empty() {
            write!(f, "error: {}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        let span = err.location().map_or_else(Span::empty, |loc| {
            let line = u32::try_from(loc.line()).unwrap_or(u32::MAX);
            let col = u32::try_from(loc.column()).unwrap_or(u32::MAX);
            Span::at(Pos::new(loc.index(), line, col))
        });
        Self::with_message(ErrorKind::Yaml, span, err.to_string())
    }
}

/// Result type alias for routeconv
pub type Result<T> = std::result::Result<T, Error>;
