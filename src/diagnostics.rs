//! Diagnostic collection and aggregation
//!
//! Structural diagnostics (shape, pointers, validator rejections) and
//! resolution diagnostics (references, cycles, type mismatches) are produced
//! by separate phases and merged append-only into one ordered stream.

use crate::error::{ErrorCategory, SourceLocation, TokenError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Stable codes for warnings; errors take their code from [`TokenError::code`]
pub mod codes {
    pub const TYPE_MISMATCH: &str = "type-mismatch";
    pub const EMPTY_FALLBACK: &str = "empty-fallback";
    pub const UNRESOLVED_FALLBACK: &str = "unresolved-fallback";
    pub const UNRESOLVED_CANDIDATE: &str = "unresolved-candidate";
    pub const CLAMPED_GRADIENT_STOP: &str = "clamped-gradient-stop";
    pub const UNKNOWN_REPLACEMENT: &str = "unknown-replacement";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: Severity::Error,
            pointer: None,
            location: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn from_error(error: &TokenError) -> Self {
        Self::error(error.code(), error.to_string())
    }

    pub fn at(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    pub fn located(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " ({})", pointer)?;
        }
        Ok(())
    }
}

/// Collects diagnostics for one resolution run, split by phase
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    structural: Vec<Diagnostic>,
    resolution: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error in the stream its category belongs to
    pub fn error(&mut self, error: &TokenError, pointer: Option<&str>, location: Option<SourceLocation>) {
        let mut diagnostic = Diagnostic::from_error(error).located(location);
        if let Some(pointer) = pointer {
            diagnostic = diagnostic.at(pointer);
        }
        match error.category() {
            ErrorCategory::Structural => self.structural.push(diagnostic),
            ErrorCategory::Resolution => self.resolution.push(diagnostic),
        }
    }

    pub fn structural(&mut self, diagnostic: Diagnostic) {
        self.structural.push(diagnostic);
    }

    pub fn resolution(&mut self, diagnostic: Diagnostic) {
        self.resolution.push(diagnostic);
    }

    pub fn finish(self) -> Diagnostics {
        Diagnostics::aggregate(self.structural, self.resolution)
    }
}

/// The aggregated, ordered diagnostics stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Structural entries first, then resolution entries, each in production order
    pub fn aggregate(structural: Vec<Diagnostic>, resolution: Vec<Diagnostic>) -> Self {
        let mut entries = structural;
        entries.extend(resolution);
        Self { entries }
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.len() - self.error_count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn for_pointer<'a>(&'a self, pointer: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries
            .iter()
            .filter(move |d| d.pointer.as_deref() == Some(pointer))
    }

    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| d.code == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_preserves_order_and_duplicates() {
        let mut sink = DiagnosticSink::new();
        sink.resolution(Diagnostic::warning(codes::TYPE_MISMATCH, "first resolution"));
        sink.structural(Diagnostic::error("invalid-value", "first structural"));
        sink.resolution(Diagnostic::warning(codes::TYPE_MISMATCH, "first resolution"));

        let diagnostics = sink.finish();
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first structural", "first resolution", "first resolution"]);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 2);
    }

    #[test]
    fn test_errors_are_routed_by_category() {
        let mut sink = DiagnosticSink::new();
        sink.error(&TokenError::unknown_reference("#/a", "#/b"), Some("#/a"), None);
        sink.error(&TokenError::invalid_value("a", "bad"), Some("#/a"), None);

        let diagnostics = sink.finish();
        assert_eq!(diagnostics.as_slice()[0].code, "invalid-value");
        assert_eq!(diagnostics.as_slice()[1].code, "unknown-reference");
        assert_eq!(diagnostics.for_pointer("#/a").count(), 2);
    }

    #[test]
    fn test_display_includes_location() {
        let diagnostic = Diagnostic::error("missing-type", "no type")
            .at("#/a")
            .located(Some(SourceLocation {
                document: "tokens.json".to_string(),
                line: 3,
                column: 5,
            }));
        assert_eq!(diagnostic.to_string(), "tokens.json:3:5: error [missing-type] no type (#/a)");
    }
}
