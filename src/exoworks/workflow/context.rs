// SPDX-License-Identifier: MIT

//! Execution context: the variable scratch space of one run

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Variables and metadata owned by a single execution run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    pub workflow_id: String,
    #[serde(default)]
    pub variables: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

impl ExecutionContext {
    /// Create an empty context for a workflow
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            variables: HashMap::new(),
            metadata: None,
        }
    }

    /// Builder-style variable assignment
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Set a variable, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.variables.insert(name.into(), value)
    }

    /// Attach a metadata entry, creating the metadata map on first use
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
    }

    /// Parse a `key=value` assignment as given on the command line.
    ///
    /// The value is read as JSON when possible (`42`, `true`, `"x"`), and as a
    /// plain string otherwise.
    pub fn parse_assignment(input: &str) -> Option<(String, Value)> {
        let (key, raw) = input.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Some((key.to_string(), value))
    }
}
