//! Schema: the vocabulary of node and mark types a document may use.
//!
//! A [`Schema`] is assembled once with [`SchemaBuilder`] and never mutated
//! afterwards, so it can be shared freely (wrap it in an `Arc`) between
//! parse and serialize calls. Building a schema also resolves the rule tables
//! (see [`rules`]) consumed by the parsers and the Markdown serializer.
//!
//! # Node specs
//!
//! Every node type declares:
//! - its [`NodeGroup`] (block, inline or text)
//! - a [`ContentRule`] describing which children it accepts
//! - declared attributes with defaults
//! - HTML parse rules (tag → this type) and a DOM output spec (this type → tag)
//! - optionally a native Markdown rule
//!
//! Types beyond the core vocabulary (see [`vocabulary`]) can be registered on the
//! builder. They take part in parsing only if they declare parse rules, and
//! serialize through the HTML or placeholder fallback unless they name a
//! Markdown rule.

pub mod check;
pub mod vocabulary;
pub mod rules;

use crate::error::SchemaError;
use crate::ir::nodes::{AttrValue, Attrs, Mark, TEXT_TYPE};
use rules::{MarkSyntax, MarkdownRule, RuleTable};
use std::collections::{HashMap, HashSet, VecDeque};

/// Wrappers deeper than this are never inserted while fitting content.
const MAX_WRAPPING_DEPTH: usize = 3;

/// Whether a node type is laid out as a block, flows inline, or is text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGroup {
    /// Flow block accepted by any block container.
    Block,
    /// Block-level part of a specific parent (list items, table rows, cells).
    /// Only accepted where a parent names it in [`ContentRule::Only`].
    Structural,
    Inline,
    Text,
}

/// Which children a node type accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRule {
    /// Leaf node.
    Empty,
    /// Unmarked text only, whitespace preserved (code blocks).
    Text,
    /// Text and inline nodes.
    Inline,
    /// One or more block nodes.
    Blocks,
    /// One or more block nodes, the first of the given type.
    BlocksStartingWith(String),
    /// One or more nodes of the listed types.
    Only(Vec<String>),
}

impl ContentRule {
    /// True when an empty node of this rule is invalid.
    pub fn requires_content(&self) -> bool {
        matches!(
            self,
            ContentRule::Blocks | ContentRule::BlocksStartingWith(_) | ContentRule::Only(_)
        )
    }

    pub fn is_textblock(&self) -> bool {
        matches!(self, ContentRule::Inline | ContentRule::Text)
    }
}

/// Structural role of a node inside a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    Table,
    Row,
    Cell,
}

/// A declared attribute and its default.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrSpec {
    pub name: String,
    pub default: AttrValue,
}

impl AttrSpec {
    /// Coerces raw markup text into this attribute's value kind.
    pub fn coerce(&self, raw: &str) -> AttrValue {
        match &self.default {
            AttrValue::Int(fallback) => AttrValue::Int(raw.trim().parse().unwrap_or(*fallback)),
            AttrValue::Bool(_) => AttrValue::Bool(!matches!(raw, "false" | "0")),
            _ => AttrValue::String(raw.to_string()),
        }
    }

    /// Whether `value` has this attribute's kind. Attributes without a
    /// typed default hold strings or null.
    pub fn accepts(&self, value: &AttrValue) -> bool {
        match (&self.default, value) {
            (AttrValue::Int(_), AttrValue::Int(_)) => true,
            (AttrValue::Bool(_), AttrValue::Bool(_)) => true,
            (AttrValue::Int(_) | AttrValue::Bool(_), _) => false,
            (_, value) => matches!(value, AttrValue::String(_) | AttrValue::Null),
        }
    }
}

/// Where a parse rule reads an attribute value from.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrSource {
    /// An HTML attribute of the matched element.
    Attribute(String),
    /// A class token with the given prefix, on the element or its first child element.
    ClassPrefix(String),
    Constant(AttrValue),
}

/// Maps an HTML tag to the owning node or mark type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseRule {
    pub tag: String,
    pub attrs: Vec<(String, AttrSource)>,
    /// HTML attributes the element must carry for the rule to match (`a[href]`).
    pub required: Vec<String>,
}

impl ParseRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn requires(mut self, html_attr: impl Into<String>) -> Self {
        self.required.push(html_attr.into());
        self
    }

    /// Adds an attribute source. Several sources for one attribute are tried in order.
    pub fn attr(mut self, name: impl Into<String>, source: AttrSource) -> Self {
        self.attrs.push((name.into(), source));
        self
    }
}

/// Copies a node/mark attribute onto an HTML attribute when rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DomAttr {
    pub attr: String,
    pub html: String,
    pub prefix: String,
}

/// How a node or mark renders to HTML.
///
/// `tag` may reference attributes as `{name}` (`h{level}`). Content goes into
/// the innermost element when `inner` is set (`pre > code`).
#[derive(Debug, Clone, PartialEq)]
pub struct DomSpec {
    pub tag: String,
    pub static_attrs: Vec<(String, String)>,
    pub attrs: Vec<DomAttr>,
    pub inner: Option<Box<DomSpec>>,
}

impl DomSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            static_attrs: Vec::new(),
            attrs: Vec::new(),
            inner: None,
        }
    }

    pub fn with_static(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_attrs.push((name.into(), value.into()));
        self
    }

    pub fn map_attr(self, attr: impl Into<String>, html: impl Into<String>) -> Self {
        self.map_attr_prefixed(attr, html, "")
    }

    pub fn map_attr_prefixed(
        mut self,
        attr: impl Into<String>,
        html: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        self.attrs.push(DomAttr {
            attr: attr.into(),
            html: html.into(),
            prefix: prefix.into(),
        });
        self
    }

    pub fn wrapping(mut self, inner: DomSpec) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Substitutes `{attr}` placeholders in the tag name.
    ///
    /// Only alphanumeric values are substituted; `None` when a placeholder is
    /// left unresolved.
    pub fn resolve_tag(&self, attrs: &Attrs) -> Option<String> {
        let mut tag = self.tag.clone();
        for (name, value) in attrs {
            let placeholder = format!("{{{name}}}");
            if !tag.contains(&placeholder) {
                continue;
            }
            let value = value.to_string();
            if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
            tag = tag.replace(&placeholder, &value);
        }
        (!tag.contains('{')).then_some(tag)
    }
}

/// Declaration of a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub name: String,
    pub group: NodeGroup,
    pub content: ContentRule,
    pub attrs: Vec<AttrSpec>,
    pub parse: Vec<ParseRule>,
    pub dom: Option<DomSpec>,
    pub markdown: Option<MarkdownRule>,
    pub table_role: Option<TableRole>,
    /// Text following this node starts a fresh line (hard breaks).
    pub breaks_line: bool,
}

impl NodeSpec {
    fn new(name: impl Into<String>, group: NodeGroup, content: ContentRule) -> Self {
        Self {
            name: name.into(),
            group,
            content,
            attrs: Vec::new(),
            parse: Vec::new(),
            dom: None,
            markdown: None,
            table_role: None,
            breaks_line: false,
        }
    }

    pub fn block(name: impl Into<String>, content: ContentRule) -> Self {
        Self::new(name, NodeGroup::Block, content)
    }

    pub fn structural(name: impl Into<String>, content: ContentRule) -> Self {
        Self::new(name, NodeGroup::Structural, content)
    }

    pub fn inline(name: impl Into<String>, content: ContentRule) -> Self {
        Self::new(name, NodeGroup::Inline, content)
    }

    pub(crate) fn text_node() -> Self {
        Self::new(TEXT_TYPE, NodeGroup::Text, ContentRule::Empty)
    }

    pub fn attr(mut self, name: impl Into<String>, default: impl Into<AttrValue>) -> Self {
        self.attrs.push(AttrSpec {
            name: name.into(),
            default: default.into(),
        });
        self
    }

    pub fn parse_rule(mut self, rule: ParseRule) -> Self {
        self.parse.push(rule);
        self
    }

    pub fn parse_tags(mut self, tags: &[&str]) -> Self {
        self.parse.extend(tags.iter().map(|tag| ParseRule::tag(*tag)));
        self
    }

    pub fn dom(mut self, dom: DomSpec) -> Self {
        self.dom = Some(dom);
        self
    }

    pub fn markdown(mut self, rule: MarkdownRule) -> Self {
        self.markdown = Some(rule);
        self
    }

    pub fn table_role(mut self, role: TableRole) -> Self {
        self.table_role = Some(role);
        self
    }

    pub fn breaks_line(mut self) -> Self {
        self.breaks_line = true;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.content == ContentRule::Empty
    }
}

/// Declaration of a mark type.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkSpec {
    pub name: String,
    pub attrs: Vec<AttrSpec>,
    pub parse: Vec<ParseRule>,
    pub dom: Option<DomSpec>,
    /// Applying this mark removes all others, and no other mark can join it.
    pub excludes_all: bool,
    pub markdown: Option<MarkSyntax>,
}

impl MarkSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            parse: Vec::new(),
            dom: None,
            excludes_all: false,
            markdown: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, default: impl Into<AttrValue>) -> Self {
        self.attrs.push(AttrSpec {
            name: name.into(),
            default: default.into(),
        });
        self
    }

    pub fn parse_rule(mut self, rule: ParseRule) -> Self {
        self.parse.push(rule);
        self
    }

    pub fn parse_tags(mut self, tags: &[&str]) -> Self {
        self.parse.extend(tags.iter().map(|tag| ParseRule::tag(*tag)));
        self
    }

    pub fn dom(mut self, dom: DomSpec) -> Self {
        self.dom = Some(dom);
        self
    }

    pub fn excludes_all(mut self) -> Self {
        self.excludes_all = true;
        self
    }

    pub fn markdown(mut self, syntax: MarkSyntax) -> Self {
        self.markdown = Some(syntax);
        self
    }
}

/// Assembles a [`Schema`].
///
/// ```ignore
/// let schema = SchemaBuilder::core()
///     .image_inline(true)
///     .node(NodeSpec::block("callout", ContentRule::Blocks).parse_tags(&["aside"]))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
    image_inline: bool,
}

impl SchemaBuilder {
    /// An empty builder. `doc`, `text` and a textblock must be added before building.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder seeded with the core vocabulary.
    pub fn core() -> Self {
        Self {
            nodes: vocabulary::core_nodes(),
            marks: vocabulary::core_marks(),
            image_inline: false,
        }
    }

    /// Selects whether images flow inline or stand alone as blocks.
    pub fn image_inline(mut self, inline: bool) -> Self {
        self.image_inline = inline;
        self
    }

    pub fn node(mut self, spec: NodeSpec) -> Self {
        self.nodes.push(spec);
        self
    }

    pub fn mark(mut self, spec: MarkSpec) -> Self {
        self.marks.push(spec);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut nodes = self.nodes;
        let marks = self.marks;

        if let Some(image) = nodes.iter_mut().find(|n| n.name == vocabulary::IMAGE) {
            image.group = if self.image_inline {
                NodeGroup::Inline
            } else {
                NodeGroup::Block
            };
        }

        let mut node_index = HashMap::new();
        for (i, spec) in nodes.iter().enumerate() {
            if node_index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateNode(spec.name.clone()));
            }
        }
        let mut mark_index = HashMap::new();
        for (i, spec) in marks.iter().enumerate() {
            if mark_index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateMark(spec.name.clone()));
            }
        }

        for required in [vocabulary::DOC, TEXT_TYPE] {
            if !node_index.contains_key(required) {
                return Err(SchemaError::MissingNode(required.to_string()));
            }
        }

        for spec in &nodes {
            let referenced: Vec<&String> = match &spec.content {
                ContentRule::BlocksStartingWith(first) => vec![first],
                ContentRule::Only(types) => types.iter().collect(),
                _ => Vec::new(),
            };
            for name in referenced {
                if !node_index.contains_key(name) {
                    return Err(SchemaError::UnknownContentType {
                        node: spec.name.clone(),
                        referenced: name.clone(),
                    });
                }
            }
        }

        let default_textblock = nodes
            .iter()
            .find(|n| n.group == NodeGroup::Block && n.content == ContentRule::Inline)
            .map(|n| n.name.clone())
            .ok_or(SchemaError::NoTextblock)?;

        let rules = RuleTable::build(&nodes, &marks);

        Ok(Schema {
            nodes,
            marks,
            node_index,
            mark_index,
            default_textblock,
            rules,
        })
    }
}

/// An immutable node/mark vocabulary plus its resolved rule tables.
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
    node_index: HashMap<String, usize>,
    mark_index: HashMap<String, usize>,
    default_textblock: String,
    rules: RuleTable,
}

impl Schema {
    /// The core vocabulary with block images.
    pub fn core() -> Result<Schema, SchemaError> {
        SchemaBuilder::core().build()
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn marks(&self) -> &[MarkSpec] {
        &self.marks
    }

    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn mark(&self, name: &str) -> Option<&MarkSpec> {
        self.mark_index.get(name).map(|&i| &self.marks[i])
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Name of the root node type.
    pub fn top_node(&self) -> &str {
        vocabulary::DOC
    }

    /// The textblock used to wrap stray inline content (normally `paragraph`).
    pub fn default_textblock(&self) -> &str {
        &self.default_textblock
    }

    pub fn is_block(&self, name: &str) -> bool {
        self.node(name)
            .is_some_and(|n| matches!(n.group, NodeGroup::Block | NodeGroup::Structural))
    }

    pub fn is_inline(&self, name: &str) -> bool {
        self.node(name)
            .is_some_and(|n| matches!(n.group, NodeGroup::Inline | NodeGroup::Text))
    }

    /// Whether `parent` may directly contain a `child` node.
    pub fn allows(&self, parent: &str, child: &str) -> bool {
        let (Some(parent), Some(child)) = (self.node(parent), self.node(child)) else {
            return false;
        };
        match &parent.content {
            ContentRule::Empty => false,
            ContentRule::Text => child.group == NodeGroup::Text,
            ContentRule::Inline => matches!(child.group, NodeGroup::Inline | NodeGroup::Text),
            ContentRule::Blocks | ContentRule::BlocksStartingWith(_) => {
                child.group == NodeGroup::Block
            }
            ContentRule::Only(types) => types.contains(&child.name),
        }
    }

    /// Shortest chain of wrapper types that lets `child` live inside `parent`.
    ///
    /// Candidates are tried in declaration order, so `paragraph` wins for
    /// inline content and `bulletList` for a stray list item.
    pub fn find_wrapping(&self, parent: &str, child: &str) -> Option<Vec<String>> {
        let mut queue: VecDeque<(String, Vec<String>)> = VecDeque::new();
        let mut seen: HashSet<&str> = HashSet::new();
        queue.push_back((parent.to_string(), Vec::new()));

        while let Some((current, path)) = queue.pop_front() {
            for spec in &self.nodes {
                if spec.is_leaf()
                    || spec.group == NodeGroup::Text
                    || spec.name == self.top_node()
                    || !self.allows(&current, &spec.name)
                    || !seen.insert(spec.name.as_str())
                {
                    continue;
                }
                let mut next = path.clone();
                next.push(spec.name.clone());
                if self.allows(&spec.name, child) {
                    return Some(next);
                }
                if next.len() < MAX_WRAPPING_DEPTH {
                    queue.push_back((spec.name.clone(), next));
                }
            }
        }
        None
    }

    /// Position of a mark type in the schema; mark sets are sorted by it.
    pub fn mark_rank(&self, name: &str) -> usize {
        self.mark_index.get(name).copied().unwrap_or(usize::MAX)
    }

    /// Adds `mark` to `set`, keeping rank order and honoring exclusion.
    ///
    /// A mark of a type already present replaces it, so a type never nests
    /// within itself. Unknown mark types leave the set unchanged.
    pub fn add_mark(&self, set: &[Mark], mark: &Mark) -> Vec<Mark> {
        let Some(spec) = self.mark(&mark.mark_type) else {
            return set.to_vec();
        };
        let blocked = set.iter().any(|m| {
            m.mark_type != mark.mark_type && self.mark(&m.mark_type).is_some_and(|s| s.excludes_all)
        });
        if blocked {
            return set.to_vec();
        }

        let mut out: Vec<Mark> = if spec.excludes_all {
            Vec::new()
        } else {
            set.iter()
                .filter(|m| m.mark_type != mark.mark_type)
                .cloned()
                .collect()
        };
        let rank = self.mark_rank(&mark.mark_type);
        let pos = out
            .iter()
            .position(|m| self.mark_rank(&m.mark_type) > rank)
            .unwrap_or(out.len());
        out.insert(pos, mark.clone());
        out
    }

    /// Completes `given` with declared defaults and drops undeclared keys.
    pub fn node_attrs(&self, node_type: &str, given: Attrs) -> Attrs {
        match self.node(node_type) {
            Some(spec) => fill_attrs(&spec.attrs, given),
            None => Attrs::new(),
        }
    }

    pub fn mark_attrs(&self, mark_type: &str, given: Attrs) -> Attrs {
        match self.mark(mark_type) {
            Some(spec) => fill_attrs(&spec.attrs, given),
            None => Attrs::new(),
        }
    }
}

fn fill_attrs(specs: &[AttrSpec], mut given: Attrs) -> Attrs {
    specs
        .iter()
        .map(|spec| {
            let value = given
                .remove(&spec.name)
                .unwrap_or_else(|| spec.default.clone());
            (spec.name.clone(), value)
        })
        .collect()
}
