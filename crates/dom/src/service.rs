//! DOM Service - builds arenas from serialized trees
//!
//! This handles:
//! - Parsing CDP-shaped JSON documents (`DOM.getDocument` layout)
//! - Attaching computed styles and `::before`/`::after` styles
//! - Root bookkeeping for the built arena

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::*;
use serde_json::Value;
use std::collections::HashMap;

/// Configuration for DOM service
#[derive(Debug, Clone)]
pub struct DomServiceConfig {
    /// Drop comment nodes while parsing
    pub skip_comments: bool,
    /// Maximum nesting depth accepted from a document
    pub max_depth: usize,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            skip_comments: true,
            max_depth: 512,
        }
    }
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Take ownership of the built arena
    pub fn into_arena(self) -> DomArena {
        self.arena
    }

    /// Parse a JSON string and build the arena
    pub fn parse_str(&mut self, json: &str) -> Result<NodeId> {
        let value: Value = serde_json::from_str(json)?;
        self.parse_dom_tree(&value)
    }

    /// Parse a tree document and build arena
    ///
    /// Input format follows CDP's DOM.getDocument response, extended with
    /// style data:
    /// ```json
    /// {
    ///   "root": {
    ///     "nodeType": 1,
    ///     "nodeName": "BUTTON",
    ///     "attributes": ["id", "ok", "aria-label", "Close"],
    ///     "computedStyles": { "display": "inline-block" },
    ///     "pseudoElements": { "before": { "content": "\"x\"" } },
    ///     "children": [{ "nodeType": 3, "nodeValue": "X" }]
    ///   }
    /// }
    /// ```
    pub fn parse_dom_tree(&mut self, document: &Value) -> Result<NodeId> {
        let root = document
            .get("root")
            .ok_or_else(|| DomError::MalformedTree("Missing 'root' in document".to_string()))?;

        self.arena.clear();
        let root_id = self
            .parse_node(root, None, 0)?
            .ok_or_else(|| DomError::MalformedTree("Root node was skipped".to_string()))?;
        self.arena.set_root(root_id)?;

        Ok(root_id)
    }

    /// Recursively parse a node; `None` when the node is dropped by config
    fn parse_node(
        &mut self,
        raw: &Value,
        parent_id: Option<NodeId>,
        depth: usize,
    ) -> Result<Option<NodeId>> {
        if depth > self.config.max_depth {
            return Err(DomError::MalformedTree(format!(
                "Maximum depth exceeded: {} > {}",
                depth, self.config.max_depth
            )));
        }

        let raw_type = raw["nodeType"]
            .as_u64()
            .ok_or_else(|| DomError::MalformedTree("Missing nodeType".to_string()))?;

        let node_type = u8::try_from(raw_type)
            .ok()
            .and_then(NodeType::from_u8)
            .ok_or_else(|| DomError::InvalidNodeType {
                expected: "valid NodeType".to_string(),
                actual: format!("{}", raw_type),
            })?;

        if node_type == NodeType::Comment && self.config.skip_comments {
            return Ok(None);
        }

        let node_name = match raw["nodeName"].as_str() {
            Some(name) => name.to_string(),
            None if node_type == NodeType::Element => {
                return Err(DomError::MalformedTree(
                    "Element without nodeName".to_string(),
                ))
            }
            None if node_type == NodeType::Text => "#text".to_string(),
            None => "#document".to_string(),
        };

        let mut node = DomNode::new(0, node_type, node_name);
        node.node_value = raw["nodeValue"].as_str().unwrap_or("").to_string();

        // Attributes arrive as a flat [name, value, name, value, ...] array
        if let Some(attrs) = raw["attributes"].as_array() {
            for pair in attrs.chunks(2) {
                if let [key, value] = pair {
                    if let (Some(key), Some(value)) = (key.as_str(), value.as_str()) {
                        node.attributes
                            .insert(key.to_ascii_lowercase(), value.to_string());
                    }
                }
            }
        }

        node.style = parse_style(raw)?.map(Box::new);

        let current_node_id = self.arena.append(parent_id, node)?;

        if let Some(children) = raw["children"].as_array() {
            for child in children {
                self.parse_node(child, Some(current_node_id), depth + 1)?;
            }
        }

        Ok(Some(current_node_id))
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_style(raw: &Value) -> Result<Option<StyleSnapshot>> {
    let computed = raw.get("computedStyles");
    let pseudo = raw.get("pseudoElements");
    if computed.is_none() && pseudo.is_none() {
        return Ok(None);
    }

    let mut snapshot = StyleSnapshot::default();
    if let Some(computed) = computed {
        snapshot.computed_styles = string_map(computed, "computedStyles")?;
    }
    if let Some(pseudo) = pseudo {
        if let Some(before) = pseudo.get("before") {
            snapshot.before = Some(string_map(before, "pseudoElements.before")?);
        }
        if let Some(after) = pseudo.get("after") {
            snapshot.after = Some(string_map(after, "pseudoElements.after")?);
        }
    }
    Ok(Some(snapshot))
}

fn string_map(value: &Value, field: &str) -> Result<HashMap<String, String>> {
    let object = value
        .as_object()
        .ok_or_else(|| DomError::MalformedTree(format!("'{}' must be an object", field)))?;
    Ok(object
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|v| (k.to_string(), v.to_string())))
        .collect())
}
