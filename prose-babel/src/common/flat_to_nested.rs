//! Converts a flat event stream into a schema-valid document tree.
//!
//! # The High-Level Concept
//!
//! Parsers emit what they find in the source, in source order, without
//! deciding whether it may go there. This module owns that decision: it keeps
//! a stack of open containers and fits every incoming node into the schema's
//! content rules, so the tree it returns always validates, whatever the input.
//!
//! Anything that had to be dropped or repaired on the way is counted in a
//! [`ParseReport`] and logged at `debug` level. Building never fails.
//!
//! # Fitting
//!
//! When a node arrives and the top container does not accept it, the builder
//! looks for the deepest open container that does, either directly or through
//! a chain of wrappers from [`Schema::find_wrapping`]:
//!
//! ```text
//! <li>loose text</li>        listItem > paragraph(implicit) > text
//! <li>stray item</li>        doc > bulletList(implicit) > listItem
//! <p>a <img> b</p>           paragraph(a), image, paragraph(b)   (block images)
//! ```
//!
//! Containers above it are closed early; wrappers opened on the way are marked
//! implicit. An explicit `EndNode` only closes its own container if it is still
//! open. If no open container can take a node, it is dropped.
//!
//! # The Algorithm
//!
//! 1. **Initialization:** push the root (`doc`) frame.
//! 2. **`StartNode`:** fit the type, push a frame, remember its id.
//! 3. **`Text` / `Leaf`:** fit, then append to the top frame with the active marks.
//! 4. **`StartMark` / `EndMark`:** push/pop the mark stack; the active set is
//!    the stack folded through [`Schema::add_mark`].
//! 5. **`EndNode`:** close frames down to the remembered id.
//! 6. **Completion:** close everything; the root becomes the document.
//!
//! Closing a frame fills in what the content rule requires (an empty paragraph
//! in an empty block container, a leading paragraph in a list item), drops
//! empty wrappers and empty split fragments, normalizes table rows and
//! completes attributes with their defaults.
//!
//! # Whitespace
//!
//! Outside code blocks, runs of HTML whitespace collapse to one space.
//! Leading whitespace is dropped at the start of a textblock, after text that
//! already ends in a space and after a line-breaking node. Trailing whitespace
//! is trimmed when the textblock closes. Whitespace-only text between blocks
//! is ignored.

use super::tables::normalize_rows;
use crate::ir::events::Event;
use crate::ir::nodes::{Attrs, Mark, Node, TEXT_TYPE};
use crate::schema::{ContentRule, Schema, TableRole};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Diagnostics collected while building a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Source elements (or empty containers) left out of the tree, by name.
    pub dropped: BTreeMap<String, usize>,
    /// Empty cells added to short table rows.
    pub padded_cells: usize,
    /// Cells removed from rows longer than the first row.
    pub truncated_cells: usize,
    /// Times missing wrapper nodes were inserted.
    pub wrapped: usize,
}

impl ParseReport {
    /// True when nothing was dropped and no table needed normalizing.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.padded_cells == 0 && self.truncated_cells == 0
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.values().sum()
    }

    pub(crate) fn record_drop(&mut self, name: &str) {
        debug!(element = name, "dropped element without a place in the schema");
        *self.dropped.entry(name.to_string()).or_default() += 1;
    }
}

/// Builds a document from parse events, fitting it to `schema`.
pub fn events_to_tree(schema: &Schema, events: &[Event]) -> (Node, ParseReport) {
    let mut builder = TreeBuilder::new(schema);
    for event in events {
        builder.handle(event);
    }
    builder.finish()
}

/// A container being built on the stack
#[derive(Debug)]
struct Frame {
    node_type: String,
    attrs: Attrs,
    content: Vec<Node>,
    /// Opened by the builder as a wrapper, not by a `StartNode` event.
    implicit: bool,
    id: usize,
}

struct TreeBuilder<'a> {
    schema: &'a Schema,
    stack: Vec<Frame>,
    /// Frame id per open `StartNode`, `None` when the node could not be placed.
    open_ids: Vec<Option<usize>>,
    marks: Vec<Mark>,
    next_id: usize,
    report: ParseReport,
}

impl<'a> TreeBuilder<'a> {
    fn new(schema: &'a Schema) -> Self {
        let mut builder = Self {
            schema,
            stack: Vec::new(),
            open_ids: Vec::new(),
            marks: Vec::new(),
            next_id: 0,
            report: ParseReport::default(),
        };
        builder.open(schema.top_node(), Attrs::new(), false);
        builder
    }

    fn handle(&mut self, event: &Event) {
        match event {
            Event::StartNode { node_type, attrs } => {
                let id = if self.fit(node_type) {
                    Some(self.open(node_type, attrs.clone(), false))
                } else {
                    self.report.record_drop(node_type);
                    None
                };
                self.open_ids.push(id);
            }
            Event::EndNode { .. } => {
                if let Some(Some(id)) = self.open_ids.pop() {
                    self.close_until(id);
                }
            }
            Event::Leaf { node_type, attrs } => self.leaf(node_type, attrs),
            Event::Text(text) => self.text(text),
            Event::StartMark(mark) => self.marks.push(mark.clone()),
            Event::EndMark { mark_type } => {
                if let Some(pos) = self.marks.iter().rposition(|m| &m.mark_type == mark_type) {
                    self.marks.remove(pos);
                }
            }
            Event::Dropped { name } => self.report.record_drop(name),
        }
    }

    fn finish(mut self) -> (Node, ParseReport) {
        while self.stack.len() > 1 {
            self.close_top(false);
        }
        let doc = match self.stack.pop() {
            Some(root) => self.complete(root, false),
            None => None,
        };
        let doc = doc.unwrap_or_else(|| {
            Node::new(self.schema.top_node())
                .with_content(vec![Node::new(self.schema.default_textblock())])
        });
        (doc, self.report)
    }

    fn top(&self) -> &Frame {
        // The root frame is only popped in `finish`.
        &self.stack[self.stack.len() - 1]
    }

    fn top_content(&self) -> Option<&ContentRule> {
        self.schema.node(&self.top().node_type).map(|spec| &spec.content)
    }

    fn open(&mut self, node_type: &str, attrs: Attrs, implicit: bool) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.stack.push(Frame {
            node_type: node_type.to_string(),
            attrs,
            content: Vec::new(),
            implicit,
            id,
        });
        id
    }

    /// Makes the top frame accept `child`, closing frames and opening
    /// wrappers as needed. Returns false (and changes nothing) if no open
    /// container can hold it.
    fn fit(&mut self, child: &str) -> bool {
        if self.schema.node(child).is_none() {
            return false;
        }
        for depth in (0..self.stack.len()).rev() {
            let parent = &self.stack[depth].node_type;
            let wrappers = if self.schema.allows(parent, child) {
                Some(Vec::new())
            } else {
                self.schema.find_wrapping(parent, child)
            };
            let Some(wrappers) = wrappers else {
                continue;
            };
            while self.stack.len() > depth + 1 {
                self.close_top(true);
            }
            if !wrappers.is_empty() {
                trace!(child, wrappers = ?wrappers, "inserting wrappers");
                self.report.wrapped += 1;
            }
            for wrapper in wrappers {
                self.open(&wrapper, Attrs::new(), true);
            }
            return true;
        }
        false
    }

    fn close_until(&mut self, id: usize) {
        let Some(pos) = self.stack.iter().position(|f| f.id == id) else {
            // Split earlier: close the continuation wrappers opened in its place.
            while self.stack.len() > 1 && self.top().implicit && self.top().id > id {
                self.close_top(false);
            }
            return;
        };
        if pos == 0 {
            return;
        }
        while self.stack.len() > pos {
            self.close_top(false);
        }
    }

    fn close_top(&mut self, forced: bool) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            if let Some(node) = self.complete(frame, forced) {
                self.append(node);
            }
        }
    }

    /// Turns a closed frame into a node that satisfies its content rule.
    fn complete(&mut self, frame: Frame, forced: bool) -> Option<Node> {
        let Frame {
            node_type,
            attrs,
            mut content,
            implicit,
            ..
        } = frame;
        let spec = self.schema.node(&node_type)?;

        match &spec.content {
            ContentRule::Inline => {
                trim_trailing_whitespace(&mut content);
                if content.is_empty() && (implicit || forced) {
                    return None;
                }
            }
            ContentRule::Text => {
                if content.is_empty() && implicit {
                    return None;
                }
            }
            ContentRule::Blocks => {
                if content.is_empty() {
                    content.push(self.empty_node(self.schema.default_textblock()));
                }
            }
            ContentRule::BlocksStartingWith(first) => {
                if content.first().map(|n| &n.node_type) != Some(first) {
                    content.insert(0, self.empty_node(first));
                }
            }
            ContentRule::Only(_) => {
                if content.is_empty() {
                    if !implicit {
                        self.report.record_drop(&node_type);
                    }
                    return None;
                }
            }
            ContentRule::Empty => {}
        }

        if spec.table_role == Some(TableRole::Table) {
            normalize_rows(self.schema, &mut content, &mut self.report);
        }

        Some(Node {
            attrs: self.schema.node_attrs(&node_type, attrs),
            node_type,
            content,
            text: None,
            marks: Vec::new(),
        })
    }

    fn empty_node(&self, node_type: &str) -> Node {
        let mut node = Node::new(node_type);
        node.attrs = self.schema.node_attrs(node_type, Attrs::new());
        node
    }

    fn active_marks(&self) -> Vec<Mark> {
        self.marks.iter().fold(Vec::new(), |set, mark| {
            let mut mark = mark.clone();
            mark.attrs = self.schema.mark_attrs(&mark.mark_type, mark.attrs);
            self.schema.add_mark(&set, &mark)
        })
    }

    fn leaf(&mut self, node_type: &str, attrs: &Attrs) {
        if !self.fit(node_type) {
            self.report.record_drop(node_type);
            return;
        }
        let mut node = self.empty_node(node_type);
        node.attrs = self.schema.node_attrs(node_type, attrs.clone());
        if self.schema.is_inline(node_type) && self.top_content() != Some(&ContentRule::Text) {
            node.marks = self.active_marks();
        }
        self.append(node);
    }

    fn text(&mut self, raw: &str) {
        if self.top_content() == Some(&ContentRule::Text) {
            if !raw.is_empty() {
                self.append(Node::text(raw));
            }
            return;
        }

        let collapsed = collapse_whitespace(raw);
        if collapsed.is_empty() {
            return;
        }
        if collapsed == " " && !self.schema.allows(&self.top().node_type, TEXT_TYPE) {
            return;
        }
        if !self.fit(TEXT_TYPE) {
            self.report.record_drop(TEXT_TYPE);
            return;
        }

        let value = if self.at_line_start() {
            collapsed.trim_start_matches(' ')
        } else {
            collapsed.as_str()
        };
        if value.is_empty() {
            return;
        }
        let marks = if self.top_content() == Some(&ContentRule::Text) {
            Vec::new()
        } else {
            self.active_marks()
        };
        self.append(Node::text(value).with_marks(marks));
    }

    fn at_line_start(&self) -> bool {
        match self.top().content.last() {
            None => true,
            Some(last) if last.is_text() => last.text_str().ends_with(' '),
            Some(last) => self
                .schema
                .node(&last.node_type)
                .is_some_and(|spec| spec.breaks_line),
        }
    }

    /// Appends to the top frame, merging text with the previous sibling when marks match.
    fn append(&mut self, node: Node) {
        let last_index = self.stack.len() - 1;
        let content = &mut self.stack[last_index].content;
        if node.is_text() {
            if let Some(last) = content.last_mut() {
                if last.is_text() && last.marks == node.marks {
                    let merged = format!("{}{}", last.text_str(), node.text_str());
                    last.text = Some(merged);
                    return;
                }
            }
        }
        content.push(node);
    }
}

/// Collapses runs of HTML whitespace (space, tab, newlines, form feed) to one space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn trim_trailing_whitespace(content: &mut Vec<Node>) {
    let Some(last) = content.last_mut() else {
        return;
    };
    if !last.is_text() {
        return;
    }
    let trimmed = last.text_str().trim_end_matches(' ').to_string();
    if trimmed.is_empty() {
        content.pop();
    } else {
        last.text = Some(trimmed);
    }
}
