//! ProseMirror JSON format
//!
//! The tree's serde shape is the editor's own document JSON, so this format
//! is a thin wrapper around `serde_json`. Documents read from JSON are checked
//! against the schema: unlike Markdown and HTML, JSON input is not repaired.

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Node;
use crate::schema::Schema;
use std::sync::Arc;

/// Format implementation for ProseMirror JSON
pub struct JsonFormat {
    schema: Arc<Schema>,
}

impl JsonFormat {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "ProseMirror document JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        let doc: Node = serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("Invalid document JSON: {e}")))?;
        self.schema.check(&doc)?;
        Ok(doc)
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        self.schema.check(doc)?;
        serde_json::to_string_pretty(doc)
            .map_err(|e| FormatError::SerializationError(format!("JSON serialization failed: {e}")))
    }
}
