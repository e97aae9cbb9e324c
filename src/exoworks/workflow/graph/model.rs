// SPDX-License-Identifier: MIT

//! Workflow graph: ordered nodes and edges with structural invariants
//!
//! Every mutator keeps three invariants: node ids are unique, edge ids are
//! unique, and every edge's endpoints are current nodes. A workflow assembled
//! from a document is taken as-is; `validate` reports what is wrong with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::{Edge, Node, NodeUpdate, ValidationReport};
use crate::sdk::error::GraphError;

/// A directed workflow graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create an empty workflow
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Assemble a workflow without checking invariants
    pub fn from_parts(
        id: impl Into<String>,
        name: impl Into<String>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        let mut workflow = Self::new(id, name);
        workflow.nodes = nodes;
        workflow.edges = edges;
        workflow
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Append a node
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.has_node(&node.id) {
            return Err(GraphError::DuplicateNodeId(node.id));
        }
        self.nodes.push(node);
        self.touch();
        Ok(())
    }

    /// Remove a node and every edge touching it. Absent ids are ignored.
    pub fn remove_node(&mut self, id: &str) {
        self.nodes.retain(|n| n.id != id);
        self.edges
            .retain(|e| e.source_id != id && e.target_id != id);
        self.touch();
    }

    /// Append an edge between two existing nodes
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if !self.has_node(&edge.source_id) || !self.has_node(&edge.target_id) {
            return Err(GraphError::DanglingReference {
                edge_id: edge.id,
                source_id: edge.source_id,
                target_id: edge.target_id,
            });
        }
        if self.edges.iter().any(|e| e.id == edge.id) {
            return Err(GraphError::DuplicateEdgeId(edge.id));
        }
        self.edges.push(edge);
        self.touch();
        Ok(())
    }

    /// Remove an edge. Absent ids are ignored.
    pub fn remove_edge(&mut self, id: &str) {
        self.edges.retain(|e| e.id != id);
        self.touch();
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Shallow-merge the present fields of `update` into a node
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        if let Some(label) = update.label {
            node.label = label;
        }
        if let Some(config) = update.config {
            node.config = config;
        }
        if let Some(position) = update.position {
            node.position = Some(position);
        }
        self.touch();
        Ok(())
    }

    /// Check every structural invariant and report all defects found
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                errors.push(format!("Duplicate node ID: {}", node.id));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                errors.push(format!("Duplicate edge ID: {}", edge.id));
            }
        }

        for edge in &self.edges {
            if !node_ids.contains(edge.source_id.as_str()) {
                errors.push(format!(
                    "Edge {} references non-existent source node: {}",
                    edge.id, edge.source_id
                ));
            }
            if !node_ids.contains(edge.target_id.as_str()) {
                errors.push(format!(
                    "Edge {} references non-existent target node: {}",
                    edge.id, edge.target_id
                ));
            }
        }

        ValidationReport::from_errors(errors)
    }

    /// Nodes with no incoming edge, in insertion order
    pub fn entry_nodes(&self) -> Vec<&Node> {
        let targets: HashSet<&str> = self.edges.iter().map(|e| e.target_id.as_str()).collect();
        self.nodes
            .iter()
            .filter(|n| !targets.contains(n.id.as_str()))
            .collect()
    }

    /// Nodes with no outgoing edge, in insertion order
    pub fn exit_nodes(&self) -> Vec<&Node> {
        let sources: HashSet<&str> = self.edges.iter().map(|e| e.source_id.as_str()).collect();
        self.nodes
            .iter()
            .filter(|n| !sources.contains(n.id.as_str()))
            .collect()
    }

    /// Edges whose target is `id`
    pub fn incoming_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target_id == id)
    }

    /// Edges whose source is `id`
    pub fn outgoing_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source_id == id)
    }
}
