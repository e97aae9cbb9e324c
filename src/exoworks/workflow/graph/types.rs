//! Graph element types
//!
//! This module defines nodes, edges and the validation report of a workflow
//! graph, plus their document (wire) representation.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::exoworks::workflow::types::{NodeConfig, NodeType};
use crate::sdk::error::ExoError;

/// Canvas position; ignored by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A typed unit of work in a workflow graph
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "NodeDocument")]
pub struct Node {
    /// Unique identifier within the workflow
    pub id: String,
    /// Display label
    pub label: String,
    /// Typed configuration; its variant is the node type
    pub config: NodeConfig,
    pub position: Option<Position>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, config: NodeConfig) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            config,
            position: None,
        }
    }

    /// Build a node from its document form, checking the config shape
    pub fn from_document(
        id: impl Into<String>,
        node_type: NodeType,
        label: impl Into<String>,
        config: Value,
    ) -> Result<Self, ExoError> {
        let id = id.into();
        let config = NodeConfig::from_value(&node_type, config).map_err(|e| {
            ExoError::invalid_node(&id, format!("bad {} config: {}", node_type, e))
        })?;
        Ok(Self::new(id, label, config))
    }

    pub fn node_type(&self) -> NodeType {
        self.config.node_type()
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

/// Wire form of a node: `{id, type, label, config, position}`
#[derive(Debug, Clone, Deserialize)]
struct NodeDocument {
    id: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default)]
    label: String,
    #[serde(default)]
    config: Value,
    #[serde(default)]
    position: Option<Position>,
}

impl TryFrom<NodeDocument> for Node {
    type Error = ExoError;

    fn try_from(doc: NodeDocument) -> Result<Self, Self::Error> {
        let mut node = Node::from_document(doc.id, doc.node_type, doc.label, doc.config)?;
        node.position = doc.position;
        Ok(node)
    }
}

/// Borrowed wire form, written without cloning the config
#[derive(Serialize)]
struct NodeDocumentRef<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    node_type: NodeType,
    label: &'a str,
    config: &'a NodeConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeDocumentRef {
            id: &self.id,
            node_type: self.node_type(),
            label: &self.label,
            config: &self.config,
            position: self.position,
        }
        .serialize(serializer)
    }
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Partial update applied by `Workflow::update_node`.
///
/// Each present field replaces the node's field wholesale; replacing the
/// config also replaces the node type.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub label: Option<String>,
    pub config: Option<NodeConfig>,
    pub position: Option<Position>,
}

impl NodeUpdate {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn config(config: NodeConfig) -> Self {
        Self {
            config: Some(config),
            ..Default::default()
        }
    }
}

/// Result of `Workflow::validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// All defects on one line
    pub fn summary(&self) -> String {
        self.errors.join(", ")
    }
}
