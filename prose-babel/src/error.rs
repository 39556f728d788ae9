//! Error types for schema construction, tree validation and format operations

use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// The document does not satisfy the schema
    #[error(transparent)]
    InvalidTree(#[from] TreeError),
}

/// A schema violation found while validating a document tree.
///
/// `path` locates the offending node as `type[index]` segments from the root,
/// e.g. `doc/bulletList[2]/listItem[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid tree at {path}: {reason}")]
pub struct TreeError {
    pub path: String,
    pub reason: String,
}

impl TreeError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("node type '{0}' is declared twice")]
    DuplicateNode(String),
    #[error("mark type '{0}' is declared twice")]
    DuplicateMark(String),
    #[error("schema has no '{0}' node type")]
    MissingNode(String),
    #[error("node type '{node}' references unknown type '{referenced}' in its content rule")]
    UnknownContentType { node: String, referenced: String },
    #[error("schema has no block node accepting inline content")]
    NoTextblock,
}
