//! Error types for the token resolver

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A position inside a source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub document: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.document, self.line, self.column)
    }
}

/// Maps canonical pointers to their position in the source document.
///
/// Supplied by the parsing collaborator alongside a document. Every resolution
/// run reads its own index; nothing is cached between runs.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    /// Map of canonical pointer -> (line, column)
    positions: HashMap<String, (usize, usize)>,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the position of the node addressed by `pointer`
    pub fn insert(&mut self, pointer: impl Into<String>, line: usize, column: usize) {
        self.positions.insert(pointer.into(), (line, column));
    }

    /// Resolve a pointer to a full source location in `document`
    pub fn locate(&self, document: &str, pointer: &str) -> Option<SourceLocation> {
        self.positions.get(pointer).map(|&(line, column)| SourceLocation {
            document: document.to_string(),
            line,
            column,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Whether an error concerns the shape of a token or the graph around it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Structural,
    Resolution,
}

#[derive(Error, Debug, Clone)]
pub enum TokenError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid pointer '{reference}' in {context}: {reason}")]
    InvalidPointer {
        reference: String,
        context: String,
        reason: String,
    },

    #[error("Invalid value at {path}: {message}")]
    InvalidValue { path: String, message: String },

    #[error("Token {path} does not declare a $type")]
    MissingType { path: String },

    #[error("Token {path} has no $value")]
    MissingValue { path: String },

    #[error("No validator registered for type '{type_name}' (token {path})")]
    UnknownType { path: String, type_name: String },

    #[error("Extension key '{key}' on {path} must be namespaced with a '.'")]
    InvalidExtensionKey { path: String, key: String },

    #[error("Invalid node at {pointer}: {message}")]
    InvalidNode { pointer: String, message: String },

    #[error("Token path '{path}' is already defined by {existing}")]
    DuplicatePath { path: String, existing: String },

    #[error("Invalid override #{index}: {message}")]
    InvalidOverride { index: usize, message: String },

    #[error("Token {origin} references unknown token {target}")]
    UnknownReference { origin: String, target: String },

    #[error("Circular reference: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("Token {origin} references {target}, which failed to resolve")]
    UnresolvedTarget { origin: String, target: String },

    #[error("Override #{index} targets unknown token {target}")]
    UnknownOverrideTarget { index: usize, target: String },

    #[error("Type mismatch at {pointer}: expected '{expected}', found '{found}' via {via}")]
    TypeMismatch {
        pointer: String,
        expected: String,
        found: String,
        via: String,
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, TokenError>;

impl From<std::io::Error> for TokenError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl TokenError {
    pub fn invalid_pointer(
        reference: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPointer {
            reference: reference.into(),
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_node(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            pointer: pointer.into(),
            message: message.into(),
        }
    }

    pub fn invalid_override(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            index,
            message: message.into(),
        }
    }

    pub fn unknown_reference(origin: impl Into<String>, target: impl Into<String>) -> Self {
        Self::UnknownReference {
            origin: origin.into(),
            target: target.into(),
        }
    }

    /// Re-attach a pointer error to the token or override that carried it
    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            Self::InvalidPointer {
                reference, reason, ..
            } => Self::InvalidPointer {
                reference,
                context: context.into(),
                reason,
            },
            other => other,
        }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidPointer { .. } => "invalid-pointer",
            Self::InvalidValue { .. } => "invalid-value",
            Self::MissingType { .. } => "missing-type",
            Self::MissingValue { .. } => "missing-value",
            Self::UnknownType { .. } => "unknown-type",
            Self::InvalidExtensionKey { .. } => "invalid-extension-key",
            Self::InvalidNode { .. } => "invalid-node",
            Self::DuplicatePath { .. } => "duplicate-path",
            Self::InvalidOverride { .. } => "invalid-override",
            Self::UnknownReference { .. } => "unknown-reference",
            Self::CircularReference { .. } => "circular-reference",
            Self::UnresolvedTarget { .. } => "unresolved-target",
            Self::UnknownOverrideTarget { .. } => "unknown-override-target",
            Self::TypeMismatch { .. } => "type-mismatch",
            Self::InvalidFormat { .. } => "invalid-format",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownReference { .. }
            | Self::CircularReference { .. }
            | Self::UnresolvedTarget { .. }
            | Self::UnknownOverrideTarget { .. }
            | Self::TypeMismatch { .. } => ErrorCategory::Resolution,
            _ => ErrorCategory::Structural,
        }
    }
}
