//! HTML serialization (document tree → HTML)
//!
//! Pipeline: tree → RcDom elements (from each type's [`DomSpec`]) → HTML string.
//!
//! Marks are rendered the way an editor would: consecutive inline nodes that
//! share a leading run of marks share the elements for those marks, so
//! `[link, bold]` followed by `[link]` gives `<a><strong>x</strong> y</a>`.

use crate::error::FormatError;
use crate::ir::nodes::{Attrs, Mark, Node};
use crate::schema::{DomSpec, Schema};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node as DomNode, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// Renders a single node as HTML; used by the Markdown serializer for node
/// types without Markdown syntax.
///
/// Returning `None` means the renderer cannot express the node, and the
/// serializer moves on to its next fallback.
pub trait HtmlRenderer {
    fn render(&self, schema: &Schema, node: &Node) -> Option<String>;
}

/// Renders from the DOM specs declared in the schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomRenderer;

impl HtmlRenderer for DomRenderer {
    fn render(&self, schema: &Schema, node: &Node) -> Option<String> {
        schema.node(&node.node_type)?.dom.as_ref()?;
        // Marks are the caller's business; only the node itself is rendered.
        let container = create_element("div", &[]);
        append_node(schema, &container, node);
        let handles = container.children.borrow().clone();
        serialize_handles(&handles).ok().map(|parts| parts.concat())
    }
}

/// Serializes a whole document as an HTML fragment, one top-level block per line.
pub fn serialize_to_html(schema: &Schema, doc: &Node) -> Result<String, FormatError> {
    schema.check(doc)?;
    let container = create_element("div", &[]);
    append_children(schema, &container, &doc.content);
    let handles = container.children.borrow().clone();
    let mut html = serialize_handles(&handles)?.join("\n");
    html.push('\n');
    Ok(html)
}

/// Appends rendered `content` to `parent`, sharing mark elements between siblings.
fn append_children(schema: &Schema, parent: &Handle, content: &[Node]) {
    let mut active: Vec<(Mark, Handle)> = Vec::new();

    for child in content {
        let keep = active
            .iter()
            .zip(&child.marks)
            .take_while(|((open, _), mark)| open == *mark)
            .count();
        active.truncate(keep);

        for mark in &child.marks[keep..] {
            let container = active.last().map_or(parent, |(_, handle)| handle).clone();
            let dom = schema.mark(&mark.mark_type).and_then(|spec| spec.dom.as_ref());
            let tag_attrs = schema.mark_attrs(&mark.mark_type, mark.attrs.clone());
            let handle = match dom.and_then(|dom| build_element(dom, &mark.attrs, &tag_attrs)) {
                Some((outer, inner)) => {
                    container.children.borrow_mut().push(outer);
                    inner
                }
                None => container,
            };
            active.push((mark.clone(), handle));
        }

        let container = active.last().map_or(parent, |(_, handle)| handle).clone();
        append_node(schema, &container, child);
    }
}

fn append_node(schema: &Schema, parent: &Handle, node: &Node) {
    if node.is_text() {
        parent
            .children
            .borrow_mut()
            .push(create_text(node.text_str()));
        return;
    }

    let tag_attrs = schema.node_attrs(&node.node_type, node.attrs.clone());
    let element = schema
        .node(&node.node_type)
        .and_then(|spec| spec.dom.as_ref())
        .and_then(|dom| build_element(dom, &node.attrs, &tag_attrs));
    match element {
        Some((outer, inner)) => {
            append_children(schema, &inner, &node.content);
            parent.children.borrow_mut().push(outer);
        }
        // Types without a usable DOM spec contribute only their content.
        None => append_children(schema, parent, &node.content),
    }
}

/// Builds the element chain for a spec; returns (outermost, content holder).
///
/// The tag name is resolved from `tag_attrs` (the attributes completed with
/// their defaults); `None` when it cannot be.
fn build_element(dom: &DomSpec, attrs: &Attrs, tag_attrs: &Attrs) -> Option<(Handle, Handle)> {
    let mut html_attrs = dom.static_attrs.clone();
    for mapping in &dom.attrs {
        let Some(value) = attrs.get(&mapping.attr).filter(|v| !v.is_null()) else {
            continue;
        };
        let value = value.to_string();
        if !value.is_empty() {
            html_attrs.push((mapping.html.clone(), format!("{}{value}", mapping.prefix)));
        }
    }

    let outer = create_element(&dom.resolve_tag(tag_attrs)?, &html_attrs);
    match &dom.inner {
        Some(inner_spec) => {
            let (inner_outer, inner) = build_element(inner_spec, attrs, tag_attrs)?;
            outer.children.borrow_mut().push(inner_outer);
            Some((outer, inner))
        }
        None => Some((outer.clone(), outer)),
    }
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: &[(String, String)]) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name.as_str())),
            value: value.clone().into(),
        })
        .collect();

    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(DomNode {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize each handle (element AND its children) to its own string
fn serialize_handles(handles: &[Handle]) -> Result<Vec<String>, FormatError> {
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    handles
        .iter()
        .map(|handle| {
            let mut output = Vec::new();
            let serializable = SerializableHandle::from(handle.clone());
            serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
                FormatError::SerializationError(format!("HTML serialization failed: {e}"))
            })?;
            String::from_utf8(output)
                .map_err(|e| FormatError::SerializationError(format!("Invalid UTF-8: {e}")))
        })
        .collect()
}
