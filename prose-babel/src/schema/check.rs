//! Validation of a document tree against the schema.
//!
//! Serializers call [`Schema::check`] before writing anything, so a malformed
//! tree fails with a [`TreeError`] instead of producing corrupted output.

use super::{ContentRule, NodeGroup, NodeSpec, Schema};
use crate::error::TreeError;
use crate::ir::nodes::Node;
use std::collections::HashSet;

impl Schema {
    /// Validates `doc` as a complete document: the root must be the top node.
    pub fn check(&self, doc: &Node) -> Result<(), TreeError> {
        if doc.node_type != self.top_node() {
            return Err(TreeError::new(
                doc.node_type.clone(),
                format!("root must be '{}'", self.top_node()),
            ));
        }
        self.check_node(doc, None, &doc.node_type)
    }

    fn check_node(
        &self,
        node: &Node,
        parent: Option<&NodeSpec>,
        path: &str,
    ) -> Result<(), TreeError> {
        let fail = |reason: String| Err(TreeError::new(path, reason));

        let Some(spec) = self.node(&node.node_type) else {
            return fail(format!("unknown node type '{}'", node.node_type));
        };

        if spec.group == NodeGroup::Text {
            match node.text.as_deref() {
                None | Some("") => return fail("text node without text".to_string()),
                Some(_) if !node.content.is_empty() => {
                    return fail("text node with children".to_string())
                }
                _ => {}
            }
        } else if node.text.is_some() {
            return fail(format!("'{}' carries a text payload", node.node_type));
        }

        for (name, value) in &node.attrs {
            match spec.attrs.iter().find(|a| &a.name == name) {
                None => return fail(format!("undeclared attribute '{name}'")),
                Some(attr) if !attr.accepts(value) => {
                    return fail(format!("attribute '{name}' has the wrong kind of value"))
                }
                Some(_) => {}
            }
        }
        if let Some(dom) = &spec.dom {
            let attrs = self.node_attrs(&node.node_type, node.attrs.clone());
            if dom.resolve_tag(&attrs).is_none() {
                return fail(format!("attributes of '{}' do not form a tag name", node.node_type));
            }
        }

        self.check_marks(node, spec, parent, path)?;

        if node.content.is_empty() && spec.content.requires_content() {
            return fail(format!("'{}' requires content", node.node_type));
        }
        if let ContentRule::BlocksStartingWith(first) = &spec.content {
            if let Some(child) = node.content.first() {
                if &child.node_type != first {
                    return fail(format!(
                        "'{}' must start with '{first}', found '{}'",
                        node.node_type, child.node_type
                    ));
                }
            }
        }

        for (index, child) in node.content.iter().enumerate() {
            let child_path = format!("{path}/{}[{index}]", child.node_type);
            if self.node(&child.node_type).is_some() && !self.allows(&spec.name, &child.node_type)
            {
                return Err(TreeError::new(
                    child_path,
                    format!(
                        "'{}' is not allowed inside '{}'",
                        child.node_type, node.node_type
                    ),
                ));
            }
            self.check_node(child, Some(spec), &child_path)?;
        }
        Ok(())
    }

    fn check_marks(
        &self,
        node: &Node,
        spec: &NodeSpec,
        parent: Option<&NodeSpec>,
        path: &str,
    ) -> Result<(), TreeError> {
        if node.marks.is_empty() {
            return Ok(());
        }
        let fail = |reason: String| Err(TreeError::new(path, reason));

        if !matches!(spec.group, NodeGroup::Inline | NodeGroup::Text) {
            return fail(format!("block node '{}' carries marks", node.node_type));
        }
        if parent.is_some_and(|p| p.content == ContentRule::Text) {
            return fail(format!("marks are not allowed inside '{}'", parent_name(parent)));
        }

        let mut seen = HashSet::new();
        for mark in &node.marks {
            let Some(mark_spec) = self.mark(&mark.mark_type) else {
                return fail(format!("unknown mark '{}'", mark.mark_type));
            };
            if !seen.insert(mark.mark_type.as_str()) {
                return fail(format!("mark '{}' applied twice", mark.mark_type));
            }
            if mark_spec.excludes_all && node.marks.len() > 1 {
                return fail(format!(
                    "mark '{}' cannot be combined with other marks",
                    mark.mark_type
                ));
            }
            for (name, value) in &mark.attrs {
                match mark_spec.attrs.iter().find(|a| &a.name == name) {
                    None => {
                        return fail(format!(
                            "undeclared attribute '{name}' on mark '{}'",
                            mark.mark_type
                        ))
                    }
                    Some(attr) if !attr.accepts(value) => {
                        return fail(format!(
                            "attribute '{name}' on mark '{}' has the wrong kind of value",
                            mark.mark_type
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

fn parent_name(parent: Option<&NodeSpec>) -> &str {
    parent.map(|p| p.name.as_str()).unwrap_or("")
}
