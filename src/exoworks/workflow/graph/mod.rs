// SPDX-License-Identifier: MIT

//! Workflow graphs and their execution
//!
//! This module provides the graph model (nodes, edges, structural
//! validation) and the engine that runs nodes in dependency order.

pub mod executor;
pub mod model;
pub mod types;

pub use executor::ExecutionEngine;
pub use model::Workflow;
pub use types::{Edge, Node, NodeUpdate, Position, ValidationReport};
