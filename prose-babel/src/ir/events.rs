//! Defines the flat event stream produced by the markup parsers.
//!
//! Parsers walk their source (the DOM, for both HTML and Markdown input) and
//! emit events naming schema types. They do not decide where a node may go:
//! [`events_to_tree`](crate::common::flat_to_nested::events_to_tree) fits the
//! stream into the schema's content rules.

use crate::ir::nodes::{Attrs, Mark};

/// Represents a single event in the parse stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Opens a container node. Always paired with [`Event::EndNode`].
    StartNode { node_type: String, attrs: Attrs },
    EndNode { node_type: String },
    /// A node without children (image, hard break, rule).
    Leaf { node_type: String, attrs: Attrs },
    /// Raw text as found in the source; whitespace is normalized by the builder.
    Text(String),
    /// Applies a mark to everything until the matching [`Event::EndMark`].
    StartMark(Mark),
    EndMark { mark_type: String },
    /// Source construct without a counterpart in the schema.
    Dropped { name: String },
}
