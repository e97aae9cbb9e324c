// SPDX-License-Identifier: MIT

//! Mock chain backend used in place of real Solana integrations

mod solana;

pub use solana::{generate_fake_address, random_base36, MockSolana, SimulatorConfig};
