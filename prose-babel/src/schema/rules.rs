//! Rule tables resolved from a schema.
//!
//! Parsers ask "which node or mark does this tag become?", the Markdown
//! serializer asks "how do I write this node type?" and "what are this mark's
//! delimiters?". The answers are computed once when the schema is built:
//!
//! - tag → ordered [`ParseTarget`]s (first match wins)
//! - node type → ordered [`Strategy`] chain, ending in the placeholder
//! - mark type → [`MarkSyntax`]
//!
//! Node types without a native Markdown rule get the chain `[Html, Placeholder]`;
//! whether the HTML step applies is decided per call by the serializer options.

use super::{AttrSource, MarkSpec, NodeSpec, Schema};
use std::collections::HashMap;

/// Native Markdown writers. A closed set: new node types reach Markdown
/// through the HTML or placeholder fallback instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownRule {
    Paragraph,
    Heading,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    BulletList,
    OrderedList,
    ListItem,
    Image,
    HardBreak,
    Text,
    Table,
}

/// Markdown spelling of a mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkSyntax {
    /// Fixed open/close strings (`**`, `~~`, `<u>`).
    Delimited {
        open: String,
        close: String,
        /// May be reordered with other mixable marks to keep spans open.
        mixable: bool,
        /// Leading/trailing whitespace is moved outside the delimiters.
        expel_whitespace: bool,
    },
    /// Backtick code span, sized to the content; disables escaping.
    Code,
    /// `[text](href "title")`, or `<href>` for plain URLs.
    Link,
}

impl MarkSyntax {
    pub fn delimited(open: impl Into<String>, close: impl Into<String>) -> Self {
        MarkSyntax::Delimited {
            open: open.into(),
            close: close.into(),
            mixable: false,
            expel_whitespace: false,
        }
    }

    pub fn mixable(self) -> Self {
        match self {
            MarkSyntax::Delimited {
                open,
                close,
                expel_whitespace,
                ..
            } => MarkSyntax::Delimited {
                open,
                close,
                mixable: true,
                expel_whitespace,
            },
            other => other,
        }
    }

    pub fn expel_whitespace(self) -> Self {
        match self {
            MarkSyntax::Delimited {
                open,
                close,
                mixable,
                ..
            } => MarkSyntax::Delimited {
                open,
                close,
                mixable,
                expel_whitespace: true,
            },
            other => other,
        }
    }

    pub fn is_mixable(&self) -> bool {
        match self {
            MarkSyntax::Delimited { mixable, .. } => *mixable,
            MarkSyntax::Link => true,
            MarkSyntax::Code => false,
        }
    }

    pub fn expels_whitespace(&self) -> bool {
        matches!(
            self,
            MarkSyntax::Delimited {
                expel_whitespace: true,
                ..
            }
        )
    }

    /// Whether text under this mark is written verbatim.
    pub fn escapes(&self) -> bool {
        !matches!(self, MarkSyntax::Code)
    }
}

/// One way of writing a node as Markdown, tried in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Markdown(MarkdownRule),
    /// Embed the node's HTML rendering.
    Html,
    /// Emit `[type-name]`.
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Node,
    Mark,
}

/// What an HTML tag parses into.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTarget {
    pub kind: TargetKind,
    pub name: String,
    pub attrs: Vec<(String, AttrSource)>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    tags: HashMap<String, Vec<ParseTarget>>,
    strategies: HashMap<String, Vec<Strategy>>,
    marks: HashMap<String, MarkSyntax>,
    fallback: Vec<Strategy>,
}

impl RuleTable {
    /// Resolves the tables for a schema. [`Schema`] already caches one; this
    /// is for callers that want a standalone copy.
    pub fn new(schema: &Schema) -> Self {
        Self::build(schema.nodes(), schema.marks())
    }

    pub(crate) fn build(nodes: &[NodeSpec], marks: &[MarkSpec]) -> Self {
        let mut tags: HashMap<String, Vec<ParseTarget>> = HashMap::new();
        let mut strategies = HashMap::new();
        let mut mark_syntax = HashMap::new();

        for spec in nodes {
            for rule in &spec.parse {
                tags.entry(rule.tag.to_ascii_lowercase())
                    .or_default()
                    .push(ParseTarget {
                        kind: TargetKind::Node,
                        name: spec.name.clone(),
                        attrs: rule.attrs.clone(),
                        required: rule.required.clone(),
                    });
            }
            let mut chain = Vec::new();
            if let Some(rule) = spec.markdown {
                chain.push(Strategy::Markdown(rule));
            }
            chain.push(Strategy::Html);
            chain.push(Strategy::Placeholder);
            strategies.insert(spec.name.clone(), chain);
        }

        for spec in marks {
            for rule in &spec.parse {
                tags.entry(rule.tag.to_ascii_lowercase())
                    .or_default()
                    .push(ParseTarget {
                        kind: TargetKind::Mark,
                        name: spec.name.clone(),
                        attrs: rule.attrs.clone(),
                        required: rule.required.clone(),
                    });
            }
            if let Some(syntax) = &spec.markdown {
                mark_syntax.insert(spec.name.clone(), syntax.clone());
            }
        }

        Self {
            tags,
            strategies,
            marks: mark_syntax,
            fallback: vec![Strategy::Html, Strategy::Placeholder],
        }
    }

    /// Parse targets for a lowercase tag name, in declaration order.
    pub fn targets(&self, tag: &str) -> &[ParseTarget] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Serialize strategies for a node type. Unknown types get the fallback chain.
    pub fn strategies(&self, node_type: &str) -> &[Strategy] {
        self.strategies
            .get(node_type)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback)
    }

    pub fn mark_syntax(&self, mark_type: &str) -> Option<&MarkSyntax> {
        self.marks.get(mark_type)
    }
}
