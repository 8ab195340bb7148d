//! Collaborator interfaces
//!
//! The computation never touches a tree directly. It asks three oracles:
//! - `TreeAccessor`: navigation, node kind, attributes, id lookup
//! - `StyleOracle`: computed properties of an element or its pseudo boxes
//! - `FocusOracle`: keyboard focusability
//!
//! `DomArena` implements all three, which makes it the default source.
//! Test doubles and foreign tree sources implement them instead.

use crate::error::{AccNameError, Result};
use dom::{DomArena, DomNode, NodeId, NodeType, PseudoElement};
use smallvec::SmallVec;

/// Node classification seen by the computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Documents, comments, fragments: traversed, never named
    Other,
}

/// Tree navigation and attribute access
pub trait TreeAccessor {
    fn kind(&self, node: NodeId) -> Result<NodeKind>;

    /// Lowercase tag name, empty for non-elements
    fn tag_name(&self, node: NodeId) -> Result<&str>;

    fn attr(&self, node: NodeId, name: &str) -> Result<Option<&str>>;

    /// Text payload, empty for non-text nodes
    fn text(&self, node: NodeId) -> Result<&str>;

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>>;

    fn children(&self, node: NodeId) -> Result<SmallVec<[NodeId; 4]>>;

    /// Id lookup within the document-like scope of the tree
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
}

/// Computed style resolution
pub trait StyleOracle {
    /// Computed value of `property` on the element, or on its `::before` /
    /// `::after` box when `pseudo` is set. `None` when unknown.
    fn computed(
        &self,
        node: NodeId,
        pseudo: Option<PseudoElement>,
        property: &str,
    ) -> Result<Option<&str>>;
}

/// Keyboard focusability
pub trait FocusOracle {
    fn is_focusable(&self, node: NodeId) -> Result<bool>;
}

/// Bundle of the three collaborators for one computation
#[derive(Clone, Copy)]
pub struct Oracles<'a> {
    pub tree: &'a dyn TreeAccessor,
    pub style: &'a dyn StyleOracle,
    pub focus: &'a dyn FocusOracle,
}

impl<'a> Oracles<'a> {
    pub fn new(
        tree: &'a dyn TreeAccessor,
        style: &'a dyn StyleOracle,
        focus: &'a dyn FocusOracle,
    ) -> Self {
        Self { tree, style, focus }
    }

    /// Use an arena for tree, style and focus queries
    pub fn from_arena(arena: &'a DomArena) -> Self {
        Self::new(arena, arena, arena)
    }
}

impl TreeAccessor for DomArena {
    fn kind(&self, node: NodeId) -> Result<NodeKind> {
        Ok(match self.get(node)?.node_type {
            NodeType::Element => NodeKind::Element,
            NodeType::Text => NodeKind::Text,
            _ => NodeKind::Other,
        })
    }

    fn tag_name(&self, node: NodeId) -> Result<&str> {
        Ok(self.get(node)?.tag_name().unwrap_or(""))
    }

    fn attr(&self, node: NodeId, name: &str) -> Result<Option<&str>> {
        let node = self.get(node)?;
        if !node.is_element() {
            return Ok(None);
        }
        Ok(node.attr(name))
    }

    fn text(&self, node: NodeId) -> Result<&str> {
        let node = self.get(node)?;
        Ok(if node.is_text() { &node.node_value } else { "" })
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node)?.parent_id)
    }

    fn children(&self, node: NodeId) -> Result<SmallVec<[NodeId; 4]>> {
        Ok(self.get(node)?.children_ids.clone())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_id(id)
    }
}

impl StyleOracle for DomArena {
    fn computed(
        &self,
        node: NodeId,
        pseudo: Option<PseudoElement>,
        property: &str,
    ) -> Result<Option<&str>> {
        Ok(self.get(node)?.style_property(pseudo, property))
    }
}

impl FocusOracle for DomArena {
    fn is_focusable(&self, node: NodeId) -> Result<bool> {
        Ok(native_focusable(self.get(node)?))
    }
}

/// Focusability from markup alone
fn native_focusable(node: &DomNode) -> bool {
    let Some(tag) = node.tag_name() else {
        return false;
    };

    if node.has_attr("hidden") || node.attr("aria-hidden") == Some("true") {
        return false;
    }

    if let Some(index) = node.attr("tabindex") {
        if let Ok(index) = index.trim().parse::<i32>() {
            return index >= 0;
        }
    }

    if node
        .attr("contenteditable")
        .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
    {
        return true;
    }

    match tag {
        "a" | "area" => node.has_attr("href"),
        "input" => {
            !node.has_attr("disabled")
                && !node
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        }
        "select" | "textarea" | "button" => !node.has_attr("disabled"),
        "summary" => true,
        _ => false,
    }
}

/// Map an arbitrary oracle failure into the computation fault type
pub fn oracle_fault(message: impl Into<String>) -> AccNameError {
    AccNameError::Oracle(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_tree_access() {
        let mut arena = DomArena::new();
        let root = arena.append_element(None, "div", &[("id", "r")]).unwrap();
        let text = arena.append_text(root, "Hello").unwrap();
        let tree: &dyn TreeAccessor = &arena;

        assert_eq!(tree.kind(root).unwrap(), NodeKind::Element);
        assert_eq!(tree.kind(text).unwrap(), NodeKind::Text);
        assert_eq!(tree.tag_name(text).unwrap(), "");
        assert_eq!(tree.text(text).unwrap(), "Hello");
        assert_eq!(tree.text(root).unwrap(), "");
        assert_eq!(tree.attr(root, "id").unwrap(), Some("r"));
        assert_eq!(tree.parent(text).unwrap(), Some(root));
        assert_eq!(tree.children(root).unwrap().as_slice(), &[text]);
        assert_eq!(tree.element_by_id("r"), Some(root));
        assert!(matches!(tree.kind(99), Err(AccNameError::Tree(_))));
    }

    #[test]
    fn test_native_focusability() {
        let mut arena = DomArena::new();
        let body = arena.append_element(None, "body", &[]).unwrap();
        let cases: &[(&str, &[(&str, &str)], bool)] = &[
            ("div", &[], false),
            ("div", &[("tabindex", "0")], true),
            ("div", &[("tabindex", "-1")], false),
            ("a", &[], false),
            ("a", &[("href", "#")], true),
            ("input", &[], true),
            ("input", &[("type", "hidden")], false),
            ("button", &[("disabled", "")], false),
            ("select", &[], true),
            ("span", &[("contenteditable", "true")], true),
            ("button", &[("hidden", "")], false),
        ];

        for (tag, attrs, expected) in cases {
            let node = arena.append_element(Some(body), tag, attrs).unwrap();
            assert_eq!(
                arena.is_focusable(node).unwrap(),
                *expected,
                "<{}> {:?}",
                tag,
                attrs
            );
        }
    }
}
