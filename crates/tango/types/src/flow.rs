//! Flow documents: node/edge graphs authored in the logic editor
//!
//! The engine does not run flows itself. It validates their shape and
//! resolves the hyper values stored in node data.

use crate::{FlowError, HyperValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Canvas position of a flow node
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Editor metadata of a flow node
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeMeta {
    #[serde(default)]
    pub position: Position,
}

/// One node of a flow graph
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub meta: FlowNodeMeta,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            meta: FlowNodeMeta::default(),
            data: serde_json::Map::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.meta.position = Position { x, y };
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Decode `data[key]` as a hyper value
    ///
    /// Returns `None` when the key is absent.
    pub fn hyper_value(&self, key: &str) -> Option<Result<HyperValue, serde_json::Error>> {
        self.data
            .get(key)
            .map(|v| serde_json::from_value(v.clone()))
    }
}

/// A directed connection between two flow nodes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    #[serde(rename = "sourceNodeID")]
    pub source_node_id: String,
    #[serde(rename = "targetNodeID")]
    pub target_node_id: String,
}

impl FlowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_node_id: source.into(),
            target_node_id: target.into(),
        }
    }
}

/// A flow graph
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
}

impl FlowDocument {
    /// Check node ids are unique and every edge connects known nodes
    pub fn validate(&self) -> Result<(), FlowError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(FlowError::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &self.edges {
            for end in [&edge.source_node_id, &edge.target_node_id] {
                if !seen.contains(end.as_str()) {
                    return Err(FlowError::DanglingEdge {
                        source_node: edge.source_node_id.clone(),
                        target_node: edge.target_node_id.clone(),
                        missing: end.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes reached by an edge leaving `id`, in edge order
    pub fn successors(&self, id: &str) -> Vec<&FlowNode> {
        self.edges
            .iter()
            .filter(|e| e.source_node_id == id)
            .filter_map(|e| self.node(&e.target_node_id))
            .collect()
    }

    /// Nodes without incoming edges
    pub fn entry_nodes(&self) -> Vec<&FlowNode> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.target_node_id == n.id))
            .collect()
    }
}

/// Registration record of a flow node kind
///
/// Rendering callbacks live in the editor; the engine keeps only the
/// serializable part.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeKind {
    #[serde(rename = "type")]
    pub node_type: String,
    pub title: String,
    #[serde(default, rename = "nodeMeta")]
    pub node_meta: serde_json::Map<String, serde_json::Value>,
}
