// SPDX-License-Identifier: MIT

//! Node types and their typed configurations
//!
//! The set of node types is closed. A node's configuration is a single
//! `NodeConfig` value whose variant *is* the node type, so a wallet node can
//! never carry a swap configuration. Documents naming a type outside the set
//! are preserved as `NodeConfig::Unrecognized` so the engine can report them.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::exoworks::workflow::condition::{ConditionOperator, Threshold};
use crate::sdk::effect::{DeployTokenConfig, MintNftConfig, SnipeTaskConfig, SwapConfig};

/// Type tag of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Wallet,
    Condition,
    Swap,
    DeployToken,
    SnipeTask,
    MintNft,
    Alert,
    Custom,
    /// A tag outside the closed set, kept verbatim
    Other(String),
}

impl NodeType {
    /// All built-in node types
    pub const BUILTIN: [NodeType; 8] = [
        NodeType::Wallet,
        NodeType::Condition,
        NodeType::Swap,
        NodeType::DeployToken,
        NodeType::SnipeTask,
        NodeType::MintNft,
        NodeType::Alert,
        NodeType::Custom,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Wallet => "wallet",
            NodeType::Condition => "condition",
            NodeType::Swap => "swap",
            NodeType::DeployToken => "deployToken",
            NodeType::SnipeTask => "snipeTask",
            NodeType::MintNft => "mintNFT",
            NodeType::Alert => "alert",
            NodeType::Custom => "custom",
            NodeType::Other(name) => name,
        }
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "wallet" => NodeType::Wallet,
            "condition" => NodeType::Condition,
            "swap" => NodeType::Swap,
            "deployToken" => NodeType::DeployToken,
            "snipeTask" => NodeType::SnipeTask,
            "mintNFT" => NodeType::MintNft,
            "alert" => NodeType::Alert,
            "custom" => NodeType::Custom,
            _ => NodeType::Other(s),
        }
    }
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        NodeType::from(s.to_string())
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cluster a wallet lives on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Devnet,
    Testnet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WalletConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: String,
    #[serde(default)]
    pub network: Network,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConditionConfig {
    /// Name of the context variable to read
    pub variable: String,
    pub operator: ConditionOperator,
    pub threshold: Threshold,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AlertConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Typed configuration of a node; the variant determines the node type
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    Wallet(WalletConfig),
    Condition(ConditionConfig),
    Swap(SwapConfig),
    DeployToken(DeployTokenConfig),
    SnipeTask(SnipeTaskConfig),
    MintNft(MintNftConfig),
    Alert(AlertConfig),
    /// Free-form settings of a custom node
    Custom(Map<String, Value>),
    Unrecognized { type_name: String, config: Value },
}

impl NodeConfig {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeConfig::Wallet(_) => NodeType::Wallet,
            NodeConfig::Condition(_) => NodeType::Condition,
            NodeConfig::Swap(_) => NodeType::Swap,
            NodeConfig::DeployToken(_) => NodeType::DeployToken,
            NodeConfig::SnipeTask(_) => NodeType::SnipeTask,
            NodeConfig::MintNft(_) => NodeType::MintNft,
            NodeConfig::Alert(_) => NodeType::Alert,
            NodeConfig::Custom(_) => NodeType::Custom,
            NodeConfig::Unrecognized { type_name, .. } => NodeType::Other(type_name.clone()),
        }
    }

    /// Build a typed configuration from a type tag and a raw JSON object.
    ///
    /// Fails when the object does not have the shape the type requires.
    /// A missing (`null`) configuration is treated as an empty object.
    pub fn from_value(node_type: &NodeType, config: Value) -> Result<Self, serde_json::Error> {
        let config = match config {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        Ok(match node_type {
            NodeType::Wallet => NodeConfig::Wallet(serde_json::from_value(config)?),
            NodeType::Condition => NodeConfig::Condition(serde_json::from_value(config)?),
            NodeType::Swap => NodeConfig::Swap(serde_json::from_value(config)?),
            NodeType::DeployToken => NodeConfig::DeployToken(serde_json::from_value(config)?),
            NodeType::SnipeTask => NodeConfig::SnipeTask(serde_json::from_value(config)?),
            NodeType::MintNft => NodeConfig::MintNft(serde_json::from_value(config)?),
            NodeType::Alert => NodeConfig::Alert(serde_json::from_value(config)?),
            NodeType::Custom => NodeConfig::Custom(serde_json::from_value(config)?),
            NodeType::Other(name) => NodeConfig::Unrecognized {
                type_name: name.clone(),
                config,
            },
        })
    }

    /// Label a freshly created node gets when none is supplied
    pub fn default_label(&self) -> String {
        match self {
            NodeConfig::Wallet(c) => match c.name.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => {
                    let prefix: String = c.address.chars().take(8).collect();
                    format!("Wallet: {}...", prefix)
                }
            },
            NodeConfig::Condition(c) => {
                format!("If {} {} {}", c.variable, c.operator, c.threshold)
            }
            NodeConfig::Swap(c) => {
                format!("Swap {} {} → {}", c.amount, c.from_token, c.to_token)
            }
            NodeConfig::DeployToken(c) => format!("Deploy Token: {}", c.ticker),
            NodeConfig::SnipeTask(c) => {
                format!("Snipe: {} SOL ({}% dev bonus)", c.amount, c.dev_bonus_pct)
            }
            NodeConfig::MintNft(c) => format!("Mint NFT: {}", c.name),
            NodeConfig::Alert(c) => format!("Alert: {}", c.message.as_deref().unwrap_or("")),
            NodeConfig::Custom(_) => "Custom".to_string(),
            NodeConfig::Unrecognized { type_name, .. } => type_name.clone(),
        }
    }
}

/// Serializes as the bare configuration object, without the type tag
impl Serialize for NodeConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeConfig::Wallet(c) => c.serialize(serializer),
            NodeConfig::Condition(c) => c.serialize(serializer),
            NodeConfig::Swap(c) => c.serialize(serializer),
            NodeConfig::DeployToken(c) => c.serialize(serializer),
            NodeConfig::SnipeTask(c) => c.serialize(serializer),
            NodeConfig::MintNft(c) => c.serialize(serializer),
            NodeConfig::Alert(c) => c.serialize(serializer),
            NodeConfig::Custom(map) => map.serialize(serializer),
            NodeConfig::Unrecognized { config, .. } => config.serialize(serializer),
        }
    }
}
