//! Markdown format implementation
//!
//! Bidirectional conversion between document trees and CommonMark Markdown
//! (plus GFM tables and strikethrough).
//!
//! # Library Choice
//!
//! Parsing uses `comrak`: it renders Markdown to HTML, which then goes through
//! the same DOM walk as HTML input. Serialization is done here, by a port of
//! the prosemirror-markdown serializer state, because the output has to match
//! what editors built on that serializer produce.
//!
//! # Element Mapping Table
//!
//! | Node / mark      | Markdown                 | Export Notes                           | Import Notes                      |
//! |------------------|--------------------------|----------------------------------------|-----------------------------------|
//! | paragraph        | Paragraph                | Blank line between blocks              | Direct                            |
//! | heading          | `#` … `######`           | Level clamped to 1–6                   | Level from h1–h6                  |
//! | bulletList       | `*` (configurable)       | Loose unless `tight_lists`             | `-`, `*`, `+` all accepted        |
//! | orderedList      | `1.`                     | Numbers from `start`, right-aligned    | `start` kept                      |
//! | blockquote       | `> `                     | Prefix on every line                   | Direct                            |
//! | codeBlock        | Fenced code              | Fence outgrows backtick runs           | Info string → `language`          |
//! | horizontalRule   | `---`                    | Direct                                 | Any thematic break                |
//! | image            | `![alt](src "title")`    | Block or inline per schema             | Block mode splits the paragraph   |
//! | hardBreak        | `\` + newline            | Dropped at the end of a block          | Backslash or two spaces           |
//! | table            | Pipe table               | Blank cells → `&nbsp;`                 | Rows normalized to header width   |
//! | bold / italic    | `**x**` / `*x*`          | Whitespace moved outside delimiters    | Direct                            |
//! | strike           | `~~x~~`                  | Direct                                 | Direct                            |
//! | underline        | `<u>x</u>`               | Raw HTML                               | Needs `allow_html`                |
//! | code             | `` `x` ``                | Backticks sized to the content         | Direct                            |
//! | link             | `[x](href "title")`      | `<url>` when the text is the URL       | Autolinks with `linkify`          |
//! | anything else    | HTML, or `[type-name]`   | HTML fallback if `html_fallback`       | Parsed only via HTML parse rules  |
//!
//! # Lossy Conversions
//!
//! - Table cells keep only the inline content of their first block
//! - Underline needs raw HTML to survive a round trip
//! - Node types without Markdown syntax come back only if their HTML does
//! - Literal `<` and `&` are escaped only where they would start a tag or an entity

pub mod parser;
pub mod serializer;
mod state;

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Node;
use crate::options::ConversionOptions;
use crate::schema::Schema;
use std::sync::Arc;

/// Format implementation for Markdown
pub struct MarkdownFormat {
    schema: Arc<Schema>,
    options: ConversionOptions,
}

impl MarkdownFormat {
    pub fn new(schema: Arc<Schema>, options: ConversionOptions) -> Self {
        Self { schema, options }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with GFM tables and strikethrough"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        Ok(parser::parse_markdown(
            &self.schema,
            source,
            &self.options.parse,
        ))
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        serializer::serialize_markdown(&self.schema, doc, &self.options.serialize)
    }
}
