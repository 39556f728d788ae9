//! HTML format implementation
//!
//! Bidirectional conversion between document trees and HTML fragments.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` ecosystem for HTML parsing and serialization:
//! - `html5ever`: Browser-grade HTML5 parser from the Servo project
//! - `markup5ever_rcdom`: Reference-counted DOM tree implementation
//!
//! Malformed input is never an error: html5ever repairs it the way a browser
//! would, and whatever the schema has no rule for is dropped (and reported).
//!
//! # Mapping
//!
//! Both directions are driven by the schema. Each node and mark type declares
//! its parse rules (which tags it comes from, where its attributes live) and
//! its DOM spec (which element it renders to). The core vocabulary maps to:
//!
//! | Node / mark      | HTML                                   |
//! |------------------|----------------------------------------|
//! | paragraph        | `<p>`                                  |
//! | heading          | `<h1>` … `<h6>`                        |
//! | bulletList       | `<ul>`                                 |
//! | orderedList      | `<ol start>`                           |
//! | listItem         | `<li>`                                 |
//! | blockquote       | `<blockquote>`                         |
//! | codeBlock        | `<pre><code class="language-*">`       |
//! | horizontalRule   | `<hr>`                                 |
//! | hardBreak        | `<br>`                                 |
//! | image            | `<img src alt title>`                  |
//! | table            | `<table>`, `<tr>`, `<th>`, `<td>`      |
//! | bold / italic    | `<strong>`/`<b>`, `<em>`/`<i>`         |
//! | strike           | `<s>`/`<del>`/`<strike>`               |
//! | underline        | `<u>`                                  |
//! | code             | `<code>`                               |
//! | link             | `<a href title>`                       |
//!
//! # Output Format
//!
//! Export produces a fragment, one top-level block per line, without a
//! surrounding document or stylesheet.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Node;
use crate::schema::Schema;
use std::sync::Arc;

/// Format implementation for HTML
pub struct HtmlFormat {
    schema: Arc<Schema>,
}

impl HtmlFormat {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML fragment"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        Ok(parser::parse_html(&self.schema, source).0)
    }

    fn serialize(&self, doc: &Node) -> Result<String, FormatError> {
        serializer::serialize_to_html(&self.schema, doc)
    }
}
