//! Recoverable conversion problems
//!
//! A conversion never stops for a shape it does not understand. The offending
//! element or key is skipped (or copied through generically) and a
//! [`Diagnostic`] is recorded so the caller can show what was lost.

use std::fmt;

/// Category of a recoverable problem
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiagnosticKind {
    /// Element or key matched no classification rule
    UnknownShape,
    /// Entity skipped because a required field is absent
    MissingRequiredField,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownShape => write!(f, "unknown shape"),
            Self::MissingRequiredField => write!(f, "missing required field"),
        }
    }
}

/// One recorded problem, located by a slash-separated path into the input
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.path, self.message)
    }
}

/// Collector threaded through one conversion run
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = %diagnostic.kind,
            path = %diagnostic.path,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    pub fn unknown_shape(&mut self, path: &str, message: impl Into<String>) {
        self.push(Diagnostic {
            kind: DiagnosticKind::UnknownShape,
            path: path.to_string(),
            message: message.into(),
        });
    }

    pub fn missing_field(&mut self, path: &str, field: &str) {
        self.push(Diagnostic {
            kind: DiagnosticKind::MissingRequiredField,
            path: path.to_string(),
            message: format!("`{field}` is required, entity skipped"),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Join a parent path and a segment
pub(crate) fn child_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.unknown_shape("route[r1]/foo", "no rule for `foo`");
        diagnostics.missing_field("bean[0]", "name");

        let entries = diagnostics.into_vec();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries.first().map(|d| d.kind),
            Some(DiagnosticKind::UnknownShape)
        );
        assert_eq!(
            entries.get(1).map(|d| d.message.as_str()),
            Some("`name` is required, entity skipped")
        );
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::MissingRequiredField,
            path: "route[0]".to_string(),
            message: "`from.uri` is required, entity skipped".to_string(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "missing required field at route[0]: `from.uri` is required, entity skipped"
        );
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "route[0]"), "route[0]");
        assert_eq!(child_path("route[0]", "choice"), "route[0]/choice");
    }
}
