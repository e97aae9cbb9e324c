// SPDX-License-Identifier: MIT

//! Typed error handling for exoworks-rs
//!
//! `ExoError` is the crate-wide error; `GraphError` covers the structural
//! invariants of a workflow graph and is what the graph mutators return.

use thiserror::Error;

/// Top-level error type for exoworks-rs
#[derive(Debug, Error)]
pub enum ExoError {
    /// Graph invariant violations
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// A node whose configuration does not match its declared type
    #[error("Invalid node '{id}': {message}")]
    InvalidNode { id: String, message: String },

    /// Failure reported by an effect simulator
    #[error("{action} failed: {message}")]
    Effect { action: String, message: String },

    /// Failure raised by a node handler
    #[error("{0}")]
    Handler(String),

    /// Bookkeeping failure inside the execution engine
    #[error("Engine error: {0}")]
    Engine(String),

    /// Configuration errors (invalid env vars, bad flags)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Structural errors raised by graph mutations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node with id {0} already exists")]
    DuplicateNodeId(String),

    #[error("Edge with id {0} already exists")]
    DuplicateEdgeId(String),

    #[error("Edge references non-existent nodes: {source_id} -> {target_id}")]
    DanglingReference {
        edge_id: String,
        source_id: String,
        target_id: String,
    },

    #[error("Node with id {0} not found")]
    NodeNotFound(String),
}

impl ExoError {
    /// Create an invalid node error
    pub fn invalid_node(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create an effect error
    pub fn effect(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Effect {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create a handler error
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Create an engine error
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
