// SPDX-License-Identifier: MIT

//! Condition evaluation for condition nodes
//!
//! A condition node compares one context variable against a threshold:
//! - `price gt 100`
//! - `mood eq 'bullish'`
//!
//! The result is only logged; it does not prune the graph.

mod ast;
mod evaluator;

pub use ast::{ConditionOperator, Threshold};
pub use evaluator::{compare, evaluate, to_number};
