// SPDX-License-Identifier: MIT

pub mod exoworks;
pub mod sdk;
