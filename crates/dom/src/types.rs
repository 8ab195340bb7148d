//! Core type definitions for the labelled tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Use Option<Box<T>> for large optional fields (reduce struct size)

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// DOM node type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentFragment = 11,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            3 => Some(NodeType::Text),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            11 => Some(NodeType::DocumentFragment),
            _ => None,
        }
    }
}

/// Generated-content box attached to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudoElement {
    Before,
    After,
}

/// Computed style data for an element and its generated boxes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    /// Computed CSS properties of the element itself
    pub computed_styles: HashMap<String, String>,
    /// Computed CSS properties of the `::before` box (including `content`)
    pub before: Option<HashMap<String, String>>,
    /// Computed CSS properties of the `::after` box (including `content`)
    pub after: Option<HashMap<String, String>>,
}

impl StyleSnapshot {
    /// Property lookup on the element or one of its pseudo boxes
    pub fn property(&self, pseudo: Option<PseudoElement>, name: &str) -> Option<&str> {
        let map = match pseudo {
            None => Some(&self.computed_styles),
            Some(PseudoElement::Before) => self.before.as_ref(),
            Some(PseudoElement::After) => self.after.as_ref(),
        };
        map.and_then(|m| m.get(name)).map(|s| s.as_str())
    }
}

/// The main tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - Use Option<Box<T>> for large optional data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Lowercase tag name for elements, `#text` / `#document` otherwise
    pub node_name: String,
    /// Text payload for text and comment nodes
    pub node_value: String,
    pub attributes: HashMap<String, String>,

    // Computed style (boxed to reduce struct size)
    pub style: Option<Box<StyleSnapshot>>,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        let node_name = if node_type == NodeType::Element {
            node_name.to_ascii_lowercase()
        } else {
            node_name
        };
        Self {
            node_id,
            node_type,
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            parent_id: None,
            children_ids: SmallVec::new(),
            style: None,
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Boolean attribute presence (`hidden`, `disabled`, `selected`, ...)
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Computed style property, `None` when no snapshot was captured
    pub fn style_property(&self, pseudo: Option<PseudoElement>, name: &str) -> Option<&str> {
        self.style.as_ref().and_then(|s| s.property(pseudo, name))
    }
}
