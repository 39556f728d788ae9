//! Output state for Markdown serialization.
//!
//! Block structure in Markdown lives in two things: the line prefix every
//! line of a nested block carries (`> `, list continuation indent) and the
//! blank lines between blocks. The state tracks both:
//!
//! - `delim` is the prefix written at the start of every line
//! - `closed` remembers the block that just ended; the separator it needs is
//!   only written once the next content arrives, so the document never ends
//!   in stray blank lines and tight lists can shrink it to a single newline
//!
//! Inline content is written by [`SerializerState::render_inline`], which
//! opens and closes mark delimiters as the mark set changes between siblings.

use crate::formats::html::serializer::HtmlRenderer;
use crate::ir::nodes::{Mark, Node};
use crate::options::SerializeOptions;
use crate::schema::rules::MarkSyntax;
use crate::schema::Schema;

pub struct SerializerState<'a> {
    pub(super) schema: &'a Schema,
    pub(super) options: &'a SerializeOptions,
    pub(super) renderer: &'a dyn HtmlRenderer,
    pub(super) out: String,
    pub(super) delim: String,
    /// Type of the block closed last, separator still pending.
    pub(super) closed: Option<String>,
    pub(super) in_tight_list: bool,
    pub(super) in_autolink: bool,
    pub(super) in_table_cell: bool,
    pub(super) at_block_start: bool,
}

impl<'a> SerializerState<'a> {
    pub fn new(
        schema: &'a Schema,
        options: &'a SerializeOptions,
        renderer: &'a dyn HtmlRenderer,
    ) -> Self {
        Self {
            schema,
            options,
            renderer,
            out: String::new(),
            delim: String::new(),
            closed: None,
            in_tight_list: false,
            in_autolink: false,
            in_table_cell: false,
            at_block_start: false,
        }
    }

    pub fn into_output(self) -> String {
        self.out
    }

    /// Writes the separator owed to the last closed block: a newline, then
    /// `size - 1` prefixed blank lines.
    pub fn flush_close(&mut self, size: usize) {
        if self.closed.is_none() {
            return;
        }
        if !self.at_blank() {
            self.out.push('\n');
        }
        if size > 1 {
            let delim_min = self.delim.trim_end().to_string();
            for _ in 1..size {
                self.out.push_str(&delim_min);
                self.out.push('\n');
            }
        }
        self.closed = None;
    }

    /// Renders a block whose lines carry `delim`; the first line gets
    /// `first_delim` instead when given.
    pub fn wrap_block(
        &mut self,
        delim: &str,
        first_delim: Option<&str>,
        node: &Node,
        render: impl FnOnce(&mut Self),
    ) {
        let old = self.delim.clone();
        self.write(first_delim.unwrap_or(delim));
        self.delim.push_str(delim);
        render(self);
        self.delim = old;
        self.close_block(node);
    }

    pub fn at_blank(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    pub fn ensure_new_line(&mut self) {
        if !self.at_blank() {
            self.out.push('\n');
        }
    }

    /// Writes raw content, flushing any pending separator and the line prefix first.
    pub fn write(&mut self, content: &str) {
        self.flush_close(2);
        if !self.delim.is_empty() && self.at_blank() {
            self.out.push_str(&self.delim);
        }
        self.out.push_str(content);
    }

    pub fn close_block(&mut self, node: &Node) {
        self.closed = Some(node.node_type.clone());
    }

    /// Writes text line by line, escaping Markdown syntax when `escape` is set.
    pub fn text(&mut self, text: &str, escape: bool) {
        let lines: Vec<&str> = text.split('\n').collect();
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            self.write("");
            // `![` would turn a following link into an image
            if !escape && line.starts_with('[') && ends_with_unescaped_bang(&self.out) {
                self.out.pop();
                self.out.push_str("\\!");
            }
            let mut chunk = if escape {
                self.esc(line, self.at_block_start)
            } else {
                line.to_string()
            };
            // a bare pipe would end the cell, even inside a code span
            if self.in_table_cell {
                chunk = chunk.replace('|', "\\|");
            }
            self.out.push_str(&chunk);
            if i != last {
                self.out.push('\n');
            }
        }
    }

    pub fn render_content(&mut self, parent: &Node) {
        for (index, child) in parent.content.iter().enumerate() {
            self.render(child, parent, index);
        }
    }

    /// Renders the inline children of `parent`, opening and closing marks as
    /// the mark set changes from one child to the next.
    pub fn render_inline(&mut self, parent: &Node, from_block_start: bool) {
        self.at_block_start = from_block_start;
        let mut active: Vec<Mark> = Vec::new();
        let mut trailing = String::new();

        for index in 0..=parent.content.len() {
            let mut node = parent.content.get(index).cloned();
            let mut marks: Vec<Mark> = node
                .as_ref()
                .map(|n| {
                    n.marks
                        .iter()
                        .filter(|m| self.syntax(m).is_some())
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            // Marks on a hard break are kept only if they continue past it.
            if node.as_ref().is_some_and(|n| self.breaks_line(n)) {
                let next = parent.content.get(index + 1);
                marks.retain(|mark| {
                    next.is_some_and(|next| {
                        next.marks.contains(mark)
                            && (!next.is_text() || next.text_str().chars().any(|c| !c.is_whitespace()))
                    })
                });
            }

            let mut leading = std::mem::take(&mut trailing);

            let expels_leading = node.as_ref().is_some_and(Node::is_text)
                && marks.iter().any(|mark| {
                    self.syntax(mark).is_some_and(MarkSyntax::expels_whitespace)
                        && !active.contains(mark)
                });
            if expels_leading {
                if let Some(text_node) = node.as_mut() {
                    let text = text_node.text_str().to_string();
                    let rest = text.trim_start();
                    let lead = &text[..text.len() - rest.len()];
                    if !lead.is_empty() {
                        leading.push_str(lead);
                        if rest.is_empty() {
                            node = None;
                            marks = active.clone();
                        } else {
                            text_node.text = Some(rest.to_string());
                        }
                    }
                }
            }

            let expels_trailing = node.as_ref().is_some_and(Node::is_text)
                && marks.iter().any(|mark| {
                    self.syntax(mark).is_some_and(MarkSyntax::expels_whitespace)
                        && parent
                            .content
                            .get(index + 1)
                            .map_or(true, |next| !next.marks.contains(mark))
                });
            if expels_trailing {
                if let Some(text_node) = node.as_mut() {
                    let text = text_node.text_str().to_string();
                    let rest = text.trim_end();
                    let trail = &text[rest.len()..];
                    if !trail.is_empty() {
                        trailing = trail.to_string();
                        if rest.is_empty() {
                            node = None;
                            marks = active.clone();
                        } else {
                            text_node.text = Some(rest.to_string());
                        }
                    }
                }
            }

            let inner = marks.last().cloned();
            let no_escape = inner
                .as_ref()
                .and_then(|mark| self.syntax(mark))
                .is_some_and(|syntax| !syntax.escapes());
            let len = marks.len() - usize::from(no_escape);

            marks = self.reorder_mixable(marks, &active, len);

            let mut keep = 0;
            while keep < active.len().min(len) && marks.get(keep) == active.get(keep) {
                keep += 1;
            }

            while keep < active.len() {
                if let Some(mark) = active.pop() {
                    let close = self.mark_string(&mark, false, parent, index);
                    self.text(&close, false);
                }
            }

            if !leading.is_empty() {
                self.text(&leading, true);
            }

            if let Some(node) = &node {
                while active.len() < len {
                    let Some(add) = marks.get(active.len()).cloned() else {
                        break;
                    };
                    let open = self.mark_string(&add, true, parent, index);
                    active.push(add);
                    self.text(&open, false);
                    self.at_block_start = false;
                }

                match inner.as_ref().filter(|_| no_escape && node.is_text()) {
                    Some(code) => {
                        let open = self.mark_string(code, true, parent, index);
                        let close = self.mark_string(code, false, parent, index + 1);
                        self.text(&format!("{open}{}{close}", node.text_str()), false);
                    }
                    None => self.render(node, parent, index),
                }
                self.at_block_start = false;
            }
        }
        self.at_block_start = false;
    }

    /// Moves mixable marks so that marks already open stay in the same
    /// position, avoiding a close/reopen (`*a **b***` instead of `*a* ***b***`).
    fn reorder_mixable(&self, mut marks: Vec<Mark>, active: &[Mark], len: usize) -> Vec<Mark> {
        let mut i = 0;
        'outer: while i < len {
            let Some(mark) = marks.get(i).cloned() else {
                break;
            };
            if !self.syntax(&mark).is_some_and(MarkSyntax::is_mixable) {
                break;
            }
            for (j, other) in active.iter().enumerate() {
                if !self.syntax(other).is_some_and(MarkSyntax::is_mixable) {
                    break;
                }
                if mark == *other {
                    if i > j {
                        let mut next = slice(&marks, 0, j).to_vec();
                        next.push(mark.clone());
                        next.extend_from_slice(slice(&marks, j, i));
                        next.extend_from_slice(slice(&marks, i + 1, len));
                        marks = next;
                    } else if j > i {
                        let mut next = slice(&marks, 0, i).to_vec();
                        next.extend_from_slice(slice(&marks, i + 1, j));
                        next.push(mark.clone());
                        next.extend_from_slice(slice(&marks, j, len));
                        marks = next;
                    }
                    i += 1;
                    continue 'outer;
                }
            }
            i += 1;
        }
        marks
    }

    /// Renders a list; each item's first line gets `first_delim(i)`, the rest `delim`.
    pub fn render_list(&mut self, node: &Node, delim: &str, first_delim: impl Fn(usize) -> String) {
        if self.closed.as_deref() == Some(node.node_type.as_str()) {
            self.flush_close(3);
        } else if self.in_tight_list {
            self.flush_close(1);
        }

        let is_tight = self.options.tight_lists;
        let prev_tight = self.in_tight_list;
        self.in_tight_list = is_tight;
        for (index, child) in node.content.iter().enumerate() {
            if index > 0 && is_tight {
                self.flush_close(1);
            }
            let first = first_delim(index);
            self.wrap_block(delim, Some(&first), node, |state| {
                state.render(child, node, index)
            });
        }
        self.in_tight_list = prev_tight;
    }

    /// Escapes Markdown syntax characters, and `<`/`&` where they would open a
    /// tag or an entity. At the start of a line, also escapes what would read
    /// as a list marker, quote or heading.
    pub fn esc(&self, text: &str, start_of_line: bool) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        for (i, &c) in chars.iter().enumerate() {
            let escape = match c {
                '`' | '*' | '\\' | '~' | '[' | ']' => true,
                '_' => {
                    !(i > 0
                        && i + 1 < chars.len()
                        && is_word_char(chars[i - 1])
                        && is_word_char(chars[i + 1]))
                }
                '<' => chars
                    .get(i + 1)
                    .is_some_and(|&n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')),
                '&' => opens_entity(&chars[i + 1..]),
                _ => false,
            };
            if escape {
                out.push('\\');
            }
            out.push(c);
        }
        if start_of_line {
            out = escape_line_start(&out);
        }
        out
    }

    /// The opening or closing delimiter of `mark` for the node at `index`.
    pub fn mark_string(&mut self, mark: &Mark, open: bool, parent: &Node, index: usize) -> String {
        match self.syntax(mark).cloned() {
            Some(MarkSyntax::Delimited {
                open: open_str,
                close,
                ..
            }) => {
                if open {
                    open_str
                } else {
                    close
                }
            }
            Some(MarkSyntax::Code) => {
                if open {
                    parent
                        .content
                        .get(index)
                        .map(|n| backticks_for(n, false))
                        .unwrap_or_else(|| "`".to_string())
                } else {
                    index
                        .checked_sub(1)
                        .and_then(|i| parent.content.get(i))
                        .map(|n| backticks_for(n, true))
                        .unwrap_or_else(|| "`".to_string())
                }
            }
            Some(MarkSyntax::Link) => {
                if open {
                    self.in_autolink = is_plain_url(mark, parent, index);
                    let open = if self.in_autolink { "<" } else { "[" };
                    open.to_string()
                } else {
                    let autolink = std::mem::take(&mut self.in_autolink);
                    if autolink {
                        ">".to_string()
                    } else {
                        link_target(mark)
                    }
                }
            }
            None => String::new(),
        }
    }

    pub(super) fn syntax(&self, mark: &Mark) -> Option<&'a MarkSyntax> {
        self.schema.rules().mark_syntax(&mark.mark_type)
    }

    fn breaks_line(&self, node: &Node) -> bool {
        self.schema
            .node(&node.node_type)
            .is_some_and(|spec| spec.breaks_line)
    }
}

/// `slice` with JavaScript semantics: out-of-range bounds are clamped.
fn slice(marks: &[Mark], from: usize, to: usize) -> &[Mark] {
    let to = to.min(marks.len());
    let from = from.min(to);
    &marks[from..to]
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ends_with_unescaped_bang(out: &str) -> bool {
    let mut chars = out.chars().rev();
    chars.next() == Some('!') && chars.next() != Some('\\')
}

/// Escapes a leading `+ `, `-`, `*` or `>`, an ATX heading marker, and an
/// ordered list number.
/// `name;`, `#123;` or `#x1F;` following an `&`.
fn opens_entity(rest: &[char]) -> bool {
    let name = rest
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric() || **c == '#')
        .count();
    name > 0 && rest.get(name) == Some(&';')
}

fn escape_line_start(line: &str) -> String {
    let mut line = if line.starts_with("+ ") || line.starts_with(['-', '*', '>']) {
        format!("\\{line}")
    } else {
        line.to_string()
    };

    let indent_len = line.len() - line.trim_start().len();
    let rest = &line[indent_len..];
    let hashes = rest.len() - rest.trim_start_matches('#').len();
    if (1..=6).contains(&hashes) {
        let after = &rest[hashes..];
        if after.is_empty() || after.starts_with(char::is_whitespace) {
            line = format!("{}\\{rest}", &line[..indent_len]);
        }
    }

    let indent_len = line.len() - line.trim_start().len();
    let rest = &line[indent_len..];
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let after = &rest[digits..];
        if let Some(tail) = after.strip_prefix('.') {
            if let Some(ws) = tail.chars().next().filter(|c| c.is_whitespace()) {
                let remainder = &tail[ws.len_utf8()..];
                line = format!("{}{}\\. {remainder}", &line[..indent_len], &rest[..digits]);
            }
        }
    }
    line
}

/// Backticks for a code span around `node`'s text: one more than its longest
/// backtick run, padded with a space when the text contains backticks.
fn backticks_for(node: &Node, closing: bool) -> String {
    let mut longest = 0;
    let mut run = 0;
    if node.is_text() {
        for c in node.text_str().chars() {
            if c == '`' {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
    }
    let ticks = "`".repeat(longest + 1);
    match (longest > 0, closing) {
        (true, true) => format!(" {ticks}"),
        (true, false) => format!("{ticks} "),
        (false, _) => ticks,
    }
}

/// A link is written as `<url>` when its text is exactly its absolute URL.
fn is_plain_url(link: &Mark, parent: &Node, index: usize) -> bool {
    if link.attr_str("title").is_some() {
        return false;
    }
    let Some(href) = link.attr_str("href") else {
        return false;
    };
    if !has_scheme(href) {
        return false;
    }
    let Some(content) = parent.content.get(index) else {
        return false;
    };
    if !content.is_text() || content.text_str() != href || content.marks.last() != Some(link) {
        return false;
    }
    parent
        .content
        .get(index + 1)
        .map_or(true, |next| !next.marks.contains(link))
}

fn has_scheme(href: &str) -> bool {
    match href.split_once(':') {
        Some((scheme, _)) => !scheme.is_empty() && scheme.chars().all(is_word_char),
        None => false,
    }
}

fn link_target(mark: &Mark) -> String {
    let href = mark.attr_str("href").unwrap_or("");
    let mut target = String::from("](");
    for c in href.chars() {
        if matches!(c, '(' | ')' | '"') {
            target.push('\\');
        }
        target.push(c);
    }
    if let Some(title) = mark.attr_str("title") {
        target.push_str(&format!(" \"{}\"", title.replace('"', "\\\"")));
    }
    target.push(')');
    target
}
