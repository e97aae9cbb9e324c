// SPDX-License-Identifier: MIT

pub mod config;
pub mod mock;
pub mod server;
pub mod workflow;
