//! Schema-driven conversion between rich-text documents, Markdown and HTML
//!
//!     This crate converts the document trees of a ProseMirror-style editor to and from Markdown
//!     and HTML. What a document may contain is described by a [`Schema`]: the node and mark
//!     types, what each may hold, how each parses from HTML and renders back. The conversions are
//!     driven entirely by that description, so adding a node type to the schema is enough for it
//!     to round-trip through HTML (and through Markdown, via the HTML fallback).
//!
//!     This is a pure lib: it powers the prose cli but is shell agnostic, that is no code should
//!     be written that supposes a shell environment, be it to std print, env vars etc.
//!
//! Architecture
//!
//!     Every parser ends in the same place. Markdown is rendered to HTML by comrak, HTML is parsed
//!     into a DOM by html5ever, and the DOM walk translates elements into a flat stream of parse
//!     events (./ir/events.rs). The tree builder (./common/flat_to_nested.rs) consumes that stream
//!     and is the only code that decides where content may live: it wraps stray inline content,
//!     inserts missing list wrappers, splits paragraphs around block images and normalizes tables.
//!     Parsing never fails; what could not be placed is counted in a `ParseReport`.
//!
//!     Serializers go the other way and do fail, but only for one reason: the tree does not
//!     satisfy the schema (./schema/check.rs). The Markdown serializer is a port of the
//!     prosemirror-markdown state machine, with an HTML fallback and a `[type-name]` placeholder
//!     for node types Markdown has no syntax for.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── dom.rs                  # html5ever/rcdom helpers
//!     ├── options.rs              # Parse and serialize options
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── schema                  # Vocabulary, rule tables, tree validation
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Parser implementation
//!     │   │   ├── serializer.rs   # Serializer implementation
//!     │   │   └── mod.rs
//!     ├── lib.rs
//!     ├── ir                      # Document tree and parse events
//!     ├── common                  # Tree building shared by every parser
//!
//! Testing
//!     tests
//!     └── <format>
//!         ├── <testname>.rs
//!         └── mod.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Library Choices
//!
//!     We offload as much as possible to specialized crates: comrak tokenizes Markdown, html5ever
//!     parses and serializes HTML. The code here adapts their output to the schema and back.

pub mod common;
pub mod dom;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod options;
pub mod registry;
pub mod schema;

pub use common::ParseReport;
pub use error::{FormatError, SchemaError, TreeError};
pub use format::Format;
pub use ir::nodes::{AttrValue, Attrs, Mark, Node};
pub use options::{ConversionOptions, ParseOptions, SerializeOptions};
pub use registry::FormatRegistry;
pub use schema::{Schema, SchemaBuilder};

/// Parses Markdown into a document fitted to `schema`. Never fails.
pub fn parse_markdown(schema: &Schema, source: &str, options: &ParseOptions) -> Node {
    formats::markdown::parser::parse_markdown(schema, source, options)
}

/// Parses HTML into a document fitted to `schema`. Never fails.
pub fn parse_html(schema: &Schema, html: &str) -> Node {
    formats::html::parser::parse_html(schema, html).0
}

/// Serializes a document to Markdown.
///
/// Fails with [`FormatError::InvalidTree`] when `doc` does not satisfy `schema`.
pub fn serialize_markdown(
    schema: &Schema,
    doc: &Node,
    options: &SerializeOptions,
) -> Result<String, FormatError> {
    formats::markdown::serializer::serialize_markdown(schema, doc, options)
}

/// Serializes a document to an HTML fragment.
pub fn serialize_html(schema: &Schema, doc: &Node) -> Result<String, FormatError> {
    formats::html::serializer::serialize_to_html(schema, doc)
}
