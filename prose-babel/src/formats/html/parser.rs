//! HTML parsing (HTML → document tree)
//!
//! Pipeline: HTML string → rcdom (via [`crate::dom`]) → events → tree.
//!
//! The DOM walk only translates: each element is looked up in the schema's
//! rule table and becomes a node, a mark, or nothing. Where the result may
//! live is decided by [`events_to_tree`]. The Markdown parser ends up here too,
//! after comrak has rendered Markdown to HTML.

use crate::common::flat_to_nested::{events_to_tree, ParseReport};
use crate::dom;
use crate::ir::events::Event;
use crate::ir::nodes::{AttrValue, Attrs, Mark, Node};
use crate::schema::rules::{ParseTarget, TargetKind};
use crate::schema::{AttrSource, AttrSpec, ContentRule, Schema};
use markup5ever_rcdom::{Handle, NodeData};

/// Wrapper elements that carry no meaning of their own; walked silently.
const TRANSPARENT_ELEMENTS: &[&str] = &["html", "body", "thead", "tbody", "tfoot"];

/// Parses HTML into a document fitted to `schema`.
pub fn parse_html(schema: &Schema, html: &str) -> (Node, ParseReport) {
    let body = dom::parse_markup(html);
    let events = dom_to_events(schema, &body);
    events_to_tree(schema, &events)
}

/// Translates the children of `root` into parse events.
pub fn dom_to_events(schema: &Schema, root: &Handle) -> Vec<Event> {
    let mut walker = DomWalker {
        schema,
        events: Vec::new(),
    };
    walker.walk_children(root);
    walker.events
}

struct DomWalker<'a> {
    schema: &'a Schema,
    events: Vec<Event>,
}

impl DomWalker<'_> {
    fn walk_children(&mut self, handle: &Handle) {
        for child in dom::children(handle) {
            match &child.data {
                NodeData::Text { contents } => {
                    self.events.push(Event::Text(contents.borrow().to_string()));
                }
                NodeData::Element { .. } => self.element(&child),
                _ => {}
            }
        }
    }

    fn element(&mut self, element: &Handle) {
        let Some(tag) = dom::tag_name(element) else {
            return;
        };
        if dom::is_ignorable(&tag) {
            self.events.push(Event::Dropped { name: tag });
            return;
        }

        let target = self
            .schema
            .rules()
            .targets(&tag)
            .iter()
            .find(|target| {
                target
                    .required
                    .iter()
                    .all(|attr| dom::attr(element, attr).is_some())
            });

        match target {
            None => {
                if !TRANSPARENT_ELEMENTS.contains(&tag.as_str()) {
                    self.events.push(Event::Dropped { name: tag });
                }
                self.walk_children(element);
            }
            Some(target) if target.kind == TargetKind::Mark => self.mark(element, target),
            Some(target) => self.node(element, target),
        }
    }

    fn mark(&mut self, element: &Handle, target: &ParseTarget) {
        let specs = self
            .schema
            .mark(&target.name)
            .map(|spec| spec.attrs.as_slice())
            .unwrap_or(&[]);
        let mark = Mark {
            mark_type: target.name.clone(),
            attrs: extract_attrs(element, &target.attrs, specs),
        };
        self.events.push(Event::StartMark(mark));
        self.walk_children(element);
        self.events.push(Event::EndMark {
            mark_type: target.name.clone(),
        });
    }

    fn node(&mut self, element: &Handle, target: &ParseTarget) {
        let Some(spec) = self.schema.node(&target.name) else {
            return;
        };
        let node_type = target.name.clone();
        let attrs = extract_attrs(element, &target.attrs, &spec.attrs);

        match spec.content {
            ContentRule::Empty => self.events.push(Event::Leaf { node_type, attrs }),
            ContentRule::Text => {
                let mut code = dom::text_content(element);
                if code.ends_with('\n') {
                    code.pop();
                }
                self.events.push(Event::StartNode {
                    node_type: node_type.clone(),
                    attrs,
                });
                self.events.push(Event::Text(code));
                self.events.push(Event::EndNode { node_type });
            }
            _ => {
                self.events.push(Event::StartNode {
                    node_type: node_type.clone(),
                    attrs,
                });
                self.walk_children(element);
                self.events.push(Event::EndNode { node_type });
            }
        }
    }
}

/// Reads attribute values according to a parse rule. For each attribute the
/// first source that yields a value wins; raw strings are coerced to the kind
/// of the declared default.
fn extract_attrs(element: &Handle, sources: &[(String, AttrSource)], specs: &[AttrSpec]) -> Attrs {
    let mut attrs = Attrs::new();
    for (name, source) in sources {
        if attrs.contains_key(name) {
            continue;
        }
        let raw = match source {
            AttrSource::Constant(value) => {
                attrs.insert(name.clone(), value.clone());
                continue;
            }
            AttrSource::Attribute(html) => dom::attr(element, html),
            AttrSource::ClassPrefix(prefix) => dom::class_with_prefix(element, prefix).or_else(|| {
                dom::first_element_child(element)
                    .and_then(|child| dom::class_with_prefix(&child, prefix))
            }),
        };
        if let Some(raw) = raw {
            let value = specs
                .iter()
                .find(|spec| &spec.name == name)
                .map(|spec| spec.coerce(&raw))
                .unwrap_or(AttrValue::String(raw));
            attrs.insert(name.clone(), value);
        }
    }
    attrs
}
