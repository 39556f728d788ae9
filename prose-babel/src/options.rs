use serde::{Deserialize, Serialize};

/// Options for parsing Markdown and HTML into a document tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Whether raw HTML inside Markdown is interpreted (otherwise kept as literal text)
    pub allow_html: bool,

    /// Whether bare URLs in Markdown become links
    pub linkify: bool,

    /// Whether single newlines inside Markdown paragraphs become hard breaks
    pub breaks: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_html: true,
            linkify: false,
            breaks: false,
        }
    }
}

/// Options for serializing a document tree to Markdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Whether list items are written without blank lines between them
    pub tight_lists: bool,

    /// The character used for bullet list markers
    pub bullet_list_marker: char,

    /// Whether nodes without Markdown syntax are written as HTML (otherwise `[type-name]`)
    pub html_fallback: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            tight_lists: false,
            bullet_list_marker: '*',
            html_fallback: true,
        }
    }
}

/// Parse and serialize options together, as loaded from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub parse: ParseOptions,
    pub serialize: SerializeOptions,
}
