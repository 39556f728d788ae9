//! Markdown serialization (document tree → Markdown)
//!
//! Each node type is written by the first strategy in its chain that can
//! handle it:
//!
//! 1. a native Markdown rule ([`MarkdownRule`]), for the core vocabulary
//! 2. the node's HTML rendering, when `html_fallback` is on and the renderer
//!    knows the type
//! 3. a `[type-name]` placeholder
//!
//! Block separation, line prefixes and mark delimiters are handled by
//! [`SerializerState`]. The tree is checked against the schema before anything
//! is written, so invalid input fails instead of producing broken Markdown.
//!
//! Output follows prosemirror-markdown: blocks are separated by a blank line,
//! lists are loose unless `tight_lists` is set, and the result carries no
//! trailing newline after the last block.

use super::state::SerializerState;
use crate::error::FormatError;
use crate::formats::html::serializer::{DomRenderer, HtmlRenderer};
use crate::ir::nodes::Node;
use crate::options::SerializeOptions;
use crate::schema::rules::{MarkdownRule, Strategy};
use crate::schema::Schema;
use tracing::{debug, trace};

/// Serializes a document to Markdown, rendering fallback HTML from the schema's DOM specs.
pub fn serialize_markdown(
    schema: &Schema,
    doc: &Node,
    options: &SerializeOptions,
) -> Result<String, FormatError> {
    serialize_markdown_with(schema, doc, options, &DomRenderer)
}

/// Serializes a document to Markdown with a custom HTML renderer for the fallback step.
pub fn serialize_markdown_with(
    schema: &Schema,
    doc: &Node,
    options: &SerializeOptions,
    renderer: &dyn HtmlRenderer,
) -> Result<String, FormatError> {
    schema.check(doc)?;
    let mut state = SerializerState::new(schema, options, renderer);
    state.render_content(doc);
    Ok(state.into_output())
}

impl SerializerState<'_> {
    pub(super) fn render(&mut self, node: &Node, parent: &Node, index: usize) {
        let schema = self.schema;
        for strategy in schema.rules().strategies(&node.node_type) {
            if self.apply(*strategy, node, parent, index) {
                return;
            }
        }
    }

    /// Runs one strategy; false means it did not apply and the next one is tried.
    fn apply(&mut self, strategy: Strategy, node: &Node, parent: &Node, index: usize) -> bool {
        match strategy {
            Strategy::Markdown(rule) => {
                trace!(node = %node.node_type, ?rule, "native markdown rule");
                self.render_native(rule, node, parent, index);
                true
            }
            Strategy::Html => {
                if !self.options.html_fallback {
                    return false;
                }
                let Some(html) = self.renderer.render(self.schema, node) else {
                    trace!(node = %node.node_type, "no html rendering");
                    return false;
                };
                debug!(node = %node.node_type, "no markdown syntax, writing html");
                self.write(&html);
                self.close_if_block(node);
                true
            }
            Strategy::Placeholder => {
                debug!(node = %node.node_type, "no markdown syntax, writing placeholder");
                self.write(&format!("[{}]", node.node_type));
                self.close_if_block(node);
                true
            }
        }
    }

    fn close_if_block(&mut self, node: &Node) {
        if self.schema.is_block(&node.node_type) {
            self.close_block(node);
        }
    }

    fn render_native(&mut self, rule: MarkdownRule, node: &Node, parent: &Node, index: usize) {
        match rule {
            MarkdownRule::Paragraph => {
                self.render_inline(node, true);
                self.close_block(node);
            }
            MarkdownRule::Heading => {
                let level = node.attr_int("level").unwrap_or(1).clamp(1, 6) as usize;
                self.write(&format!("{} ", "#".repeat(level)));
                self.render_inline(node, false);
                self.close_block(node);
            }
            MarkdownRule::Blockquote => {
                self.wrap_block("> ", None, node, |state| state.render_content(node));
            }
            MarkdownRule::CodeBlock => self.render_code_block(node),
            MarkdownRule::HorizontalRule => {
                self.write("---");
                self.close_block(node);
            }
            MarkdownRule::BulletList => {
                let marker = format!("{} ", self.options.bullet_list_marker);
                self.render_list(node, "  ", |_| marker.clone());
            }
            MarkdownRule::OrderedList => {
                let start = node.attr_int("start").unwrap_or(1);
                let number = |i: usize| start.saturating_add(i64::try_from(i).unwrap_or(i64::MAX));
                let width = (0..node.child_count())
                    .map(|i| number(i).to_string().len())
                    .max()
                    .unwrap_or(1);
                let space = " ".repeat(width + 2);
                self.render_list(node, &space, |i| format!("{:>width$}. ", number(i)));
            }
            MarkdownRule::ListItem => self.render_content(node),
            MarkdownRule::Image => {
                let image = image_markdown(self, node);
                self.write(&image);
                self.close_if_block(node);
            }
            MarkdownRule::HardBreak => {
                let has_following_content = parent.content[index + 1..]
                    .iter()
                    .any(|sibling| sibling.node_type != node.node_type);
                if has_following_content && self.in_table_cell {
                    self.write("<br>");
                } else if has_following_content {
                    self.write("\\\n");
                }
            }
            MarkdownRule::Text => {
                let escape = !self.in_autolink;
                self.text(node.text_str(), escape);
            }
            MarkdownRule::Table => self.render_table(node),
        }
    }

    fn render_code_block(&mut self, node: &Node) {
        let code = node.text_content();
        let fence = code_fence(&code);
        let language = node.attr_str("language").unwrap_or("");
        self.write(&format!("{fence}{language}\n"));
        self.text(&code, false);
        self.ensure_new_line();
        self.write(&fence);
        self.close_block(node);
    }

    /// Pipe table: cells separated by ` | `, a `---` delimiter row after the
    /// first row. Cells keep only the inline content of their first block;
    /// pipes in it are escaped and hard breaks become `<br>`.
    fn render_table(&mut self, node: &Node) {
        for (i, row) in node.content.iter().enumerate() {
            for (j, cell) in row.content.iter().enumerate() {
                if j > 0 {
                    self.write(" | ");
                }
                self.in_table_cell = true;
                match cell.content.first() {
                    Some(first) if !first.text_content().trim().is_empty() => {
                        if self.is_textblock(first) {
                            self.render_inline(first, true);
                        } else {
                            self.text(&first.text_content(), true);
                        }
                    }
                    _ => self.write("&nbsp;"),
                }
                self.in_table_cell = false;
            }
            self.ensure_new_line();
            if i == 0 {
                let delimiter = vec!["---"; row.child_count()].join(" | ");
                self.write(&delimiter);
                self.ensure_new_line();
            }
        }
        self.close_block(node);
    }

    fn is_textblock(&self, node: &Node) -> bool {
        self.schema
            .node(&node.node_type)
            .is_some_and(|spec| spec.content.is_textblock())
    }
}

/// Three backticks, or one more than the longest run of three or more in the code.
fn code_fence(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let len = if longest >= 3 { longest + 1 } else { 3 };
    "`".repeat(len)
}

fn image_markdown(state: &SerializerState, node: &Node) -> String {
    let alt = state.esc(node.attr_str("alt").unwrap_or(""), false);
    let mut src = String::new();
    for c in node.attr_str("src").unwrap_or("").chars() {
        if matches!(c, '(' | ')') {
            src.push('\\');
        }
        src.push(c);
    }
    let title = node
        .attr_str("title")
        .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
        .unwrap_or_default();
    format!("![{alt}]({src}{title})")
}
