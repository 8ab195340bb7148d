//! Arena-based tree storage
//!
//! This arena eliminates:
//! - Rc/Arc overhead (16 bytes per pointer)
//! - Parent/child reference cycles
//! - Cache misses (nodes stored sequentially)
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType, PseudoElement, StyleSnapshot};
use ahash::AHashMap;

/// Arena allocator for tree nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for `id` attribute → NodeId lookup (getElementById)
/// - No Rc/Arc: use indices everywhere
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// `id` attribute → NodeId lookup, first registration wins
    id_map: AHashMap<String, NodeId>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            id_map: AHashMap::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's `node_id` is overwritten with its arena index.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        if node.is_element() {
            if let Some(id) = node.attr("id") {
                self.id_map.entry(id.to_string()).or_insert(node_id);
            }
        }
        self.nodes.push(node);
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    ///
    /// Changing the `id` attribute through this handle bypasses the id index;
    /// use [`DomArena::set_attr`] for that.
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&DomNode> {
        let root_id = self
            .root_id
            .ok_or_else(|| DomError::MalformedTree("No root node set".to_string()))?;
        self.get(root_id)
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child to `parent` (or create a detached node when `None`)
    pub fn append(&mut self, parent: Option<NodeId>, mut node: DomNode) -> Result<NodeId> {
        if let Some(parent_id) = parent {
            self.get(parent_id)?;
        }
        node.parent_id = parent;
        let node_id = self.add_node(node);
        if let Some(parent_id) = parent {
            self.get_mut(parent_id)?.children_ids.push(node_id);
        }
        Ok(node_id)
    }

    /// Append an element with attributes
    pub fn append_element(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId> {
        let mut node = DomNode::new(0, NodeType::Element, tag.to_string());
        for (name, value) in attributes {
            node.attributes.insert(name.to_string(), value.to_string());
        }
        self.append(parent, node)
    }

    /// Append a text node
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let mut node = DomNode::new(0, NodeType::Text, "#text".to_string());
        node.node_value = text.to_string();
        self.append(Some(parent), node)
    }

    /// Set an attribute, keeping the id index current
    pub fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.get_mut(node_id)?;
        let previous = node.attributes.insert(name.to_string(), value.to_string());
        if name == "id" {
            if let Some(old) = previous {
                if self.id_map.get(&old) == Some(&node_id) {
                    self.id_map.remove(&old);
                }
            }
            self.id_map.entry(value.to_string()).or_insert(node_id);
        }
        Ok(())
    }

    /// Set a computed style property on an element
    pub fn set_style(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let node = self.get_mut(node_id)?;
        node.style
            .get_or_insert_with(Default::default)
            .computed_styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    /// Set a computed style property on a generated-content box
    pub fn set_pseudo_style(
        &mut self,
        node_id: NodeId,
        pseudo: PseudoElement,
        property: &str,
        value: &str,
    ) -> Result<()> {
        let node = self.get_mut(node_id)?;
        let snapshot: &mut StyleSnapshot = node.style.get_or_insert_with(Default::default);
        let map = match pseudo {
            PseudoElement::Before => &mut snapshot.before,
            PseudoElement::After => &mut snapshot.after,
        };
        map.get_or_insert_with(Default::default)
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.id_map.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
