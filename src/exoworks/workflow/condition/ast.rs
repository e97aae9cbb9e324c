// SPDX-License-Identifier: MIT

//! Condition node operators and thresholds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators supported by condition nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOperator {
    /// Strict equality, no coercion
    Eq,
    /// Strict inequality, no coercion
    Ne,
    /// Numeric >
    Gt,
    /// Numeric <
    Lt,
    /// Numeric >=
    Gte,
    /// Numeric <=
    Lte,
}

/// Right-hand side of a condition: a number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Number(f64),
    Text(String),
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Eq => "eq",
            ConditionOperator::Ne => "ne",
            ConditionOperator::Gt => "gt",
            ConditionOperator::Lt => "lt",
            ConditionOperator::Gte => "gte",
            ConditionOperator::Lte => "lte",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Number(n) => write!(f, "{}", n),
            Threshold::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Threshold {
    fn from(n: f64) -> Self {
        Threshold::Number(n)
    }
}

impl From<&str> for Threshold {
    fn from(s: &str) -> Self {
        Threshold::Text(s.to_string())
    }
}
