// SPDX-License-Identifier: MIT

pub mod condition;
pub mod context;
pub mod factory;
pub mod graph;
pub mod handlers;
pub mod loader;
pub mod log;
pub mod registry;
pub mod transactions;
pub mod types;
