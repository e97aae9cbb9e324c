// SPDX-License-Identifier: MIT

//! Low-level kit shared by every workflow component
//!
//! - `error` - crate-wide error types
//! - `effect` - the effect simulator capability and its action types

pub mod effect;
pub mod error;
