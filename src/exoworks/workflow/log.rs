// SPDX-License-Identifier: MIT

//! Execution log entries and run results
//!
//! The ordered log sequence is the primary artifact of a run: presentation
//! layers render it and derive pending transactions from its payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::exoworks::workflow::context::ExecutionContext;
use crate::exoworks::workflow::types::NodeType;

/// Node id used for entries produced by validation
pub const VALIDATION_NODE_ID: &str = "validation";
/// Node id used for entries produced by the engine itself
pub const EXECUTION_NODE_ID: &str = "execution";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Success => "success",
        };
        f.write_str(s)
    }
}

/// One immutable, timestamped record of a run event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub node_id: String,
    pub node_type: NodeType,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl LogEntry {
    pub fn new(
        node_id: impl Into<String>,
        node_type: NodeType,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            node_id: node_id.into(),
            node_type,
            level,
            message: message.into(),
            data: None,
        }
    }

    /// Attach a structured payload
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<7} {} ({}): {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level.to_string().to_uppercase(),
            self.node_id,
            self.node_type,
            self.message
        )
    }
}

/// Outcome of one execution run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub logs: Vec<LogEntry>,
    pub final_context: ExecutionContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Entries attributed to one node, in order
    pub fn logs_for<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.logs.iter().filter(move |e| e.node_id == node_id)
    }

    /// Entries of a given level, in order
    pub fn logs_at(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> + '_ {
        self.logs.iter().filter(move |e| e.level == level)
    }
}
