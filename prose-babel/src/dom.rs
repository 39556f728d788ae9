//! Markup parsing and element inspection over an rcdom tree.
//!
//! This layer knows nothing about schemas. It turns a markup string into a
//! traversable tree (html5ever, best-effort like a browser) and answers small
//! questions about elements: tag name, attributes, text, void-ness.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "command", "embed", "frame", "hr",
    "image", "img", "input", "isindex", "keygen", "link", "menuitem", "meta", "nextid", "param",
    "source", "track", "wbr",
];

/// Elements whose whole subtree is skipped by the parsers.
const IGNORABLE_ELEMENTS: &[&str] = &["script", "style", "head", "title", "template", "noscript"];

/// Parses markup and returns the `<body>` element holding it.
///
/// The input is wrapped in `<body>…</body>` first, so leading and trailing
/// whitespace survive and a fragment never ends up in `<head>`. Malformed
/// markup yields html5ever's recovered tree; this never fails.
///
/// The body is detached from its document: dropping an rcdom node empties
/// every descendant, so it must not stay reachable from the dropped root.
pub fn parse_markup(markup: &str) -> Handle {
    let wrapped = format!("<body>{markup}</body>");
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(wrapped);
    let document = dom.document.clone();
    match find_element(&document, "body") {
        Some(body) => {
            detach(&body);
            body
        }
        None => document,
    }
}

fn detach(handle: &Handle) {
    if let Some(parent) = handle.parent.take().and_then(|weak| weak.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, handle));
    }
}

/// True for HTML void elements. Case-insensitive.
pub fn is_void_element(tag: &str) -> bool {
    !tag.is_empty() && VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// True for elements whose content is never document text (`script`, `style`…).
pub fn is_ignorable(tag: &str) -> bool {
    IGNORABLE_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Lowercase local name of an element, `None` for text and other node kinds.
pub fn tag_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

/// Value of an attribute on an element.
pub fn attr(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| (&*a.name.local).eq_ignore_ascii_case(name))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Concatenated text of every descendant text node.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Snapshot of a node's children.
pub fn children(handle: &Handle) -> Vec<Handle> {
    handle.children.borrow().iter().cloned().collect()
}

pub fn first_element_child(handle: &Handle) -> Option<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .find(|c| matches!(c.data, NodeData::Element { .. }))
        .cloned()
}

/// Remainder of the first `class` token starting with `prefix`.
pub fn class_with_prefix(handle: &Handle, prefix: &str) -> Option<String> {
    attr(handle, "class")?
        .split_ascii_whitespace()
        .find_map(|token| token.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}

/// Depth-first search for the first element with the given tag.
fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if tag_name(handle).as_deref() == Some(tag) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}
