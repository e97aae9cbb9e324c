// SPDX-License-Identifier: MIT

//! Effect simulator capability
//!
//! Node handlers never talk to a chain directly. Every external action goes
//! through an [`EffectSimulator`], so a real backend can replace the bundled
//! mock without touching the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::sdk::error::ExoError;

/// Token launch parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeployTokenConfig {
    pub coin_name: String,
    pub ticker: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
}

/// Snipe order parameters. Amount is in SOL, percentages are 0-100.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnipeTaskConfig {
    pub amount: f64,
    pub max_slippage: f64,
    pub dev_bonus_pct: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SwapConfig {
    pub from_token: String,
    pub to_token: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MintNftConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Result of a token deployment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutcome {
    pub program_id: String,
    pub transaction_id: String,
    pub logs: Vec<String>,
}

/// Result of a snipe order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnipeOutcome {
    pub order_id: String,
    pub transaction_id: String,
    pub logs: Vec<String>,
}

/// Result of a swap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapOutcome {
    pub transaction_id: String,
    pub logs: Vec<String>,
}

/// Result of an NFT mint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MintOutcome {
    pub mint_address: String,
    pub transaction_id: String,
    pub logs: Vec<String>,
}

/// One async method per domain action.
///
/// Implementations may take arbitrarily long; callers impose no timeout and
/// perform no retry.
#[async_trait]
pub trait EffectSimulator: Send + Sync {
    async fn deploy_token(&self, config: &DeployTokenConfig) -> Result<DeployOutcome, ExoError>;

    async fn place_snipe_order(&self, config: &SnipeTaskConfig)
        -> Result<SnipeOutcome, ExoError>;

    async fn swap(&self, config: &SwapConfig) -> Result<SwapOutcome, ExoError>;

    async fn mint_nft(&self, config: &MintNftConfig) -> Result<MintOutcome, ExoError>;
}
