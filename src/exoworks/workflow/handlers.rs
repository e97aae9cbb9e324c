// SPDX-License-Identifier: MIT

//! Built-in node handlers, one per node type

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::exoworks::workflow::condition;
use crate::exoworks::workflow::context::ExecutionContext;
use crate::exoworks::workflow::graph::Node;
use crate::exoworks::workflow::log::{LogEntry, LogLevel};
use crate::exoworks::workflow::registry::NodeHandler;
use crate::exoworks::workflow::types::NodeConfig;
use crate::sdk::effect::EffectSimulator;
use crate::sdk::error::ExoError;

fn entry(node: &Node, level: LogLevel, message: impl Into<String>) -> LogEntry {
    LogEntry::new(&node.id, node.node_type(), level, message)
}

fn config_mismatch(node: &Node, expected: &str) -> ExoError {
    ExoError::handler(format!(
        "{} handler cannot run a {} node",
        expected,
        node.node_type()
    ))
}

/// Relay simulator trace lines as info entries, then one success entry
/// carrying the serialized outcome as payload.
fn relay_outcome<T: Serialize>(
    node: &Node,
    trace: &[String],
    summary: String,
    outcome: &T,
) -> Result<Vec<LogEntry>, ExoError> {
    let mut logs: Vec<LogEntry> = trace
        .iter()
        .map(|line| entry(node, LogLevel::Info, line.as_str()))
        .collect();
    logs.push(entry(node, LogLevel::Success, summary).with_data(serde_json::to_value(outcome)?));
    Ok(logs)
}

pub struct WalletHandler;

#[async_trait]
impl NodeHandler for WalletHandler {
    async fn execute(
        &self,
        node: &Node,
        _context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        let NodeConfig::Wallet(config) = &node.config else {
            return Err(config_mismatch(node, "wallet"));
        };
        let name = match config.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Unnamed",
        };
        Ok(vec![entry(
            node,
            LogLevel::Info,
            format!("Wallet node configured: {}", name),
        )])
    }
}

pub struct ConditionHandler;

#[async_trait]
impl NodeHandler for ConditionHandler {
    async fn execute(
        &self,
        node: &Node,
        context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        let NodeConfig::Condition(config) = &node.config else {
            return Err(config_mismatch(node, "condition"));
        };
        let passed = condition::evaluate(config, context);
        let (level, verdict) = if passed {
            (LogLevel::Success, "PASS")
        } else {
            (LogLevel::Info, "FAIL")
        };
        Ok(vec![entry(
            node,
            level,
            format!("Condition evaluated: {}", verdict),
        )])
    }
}

pub struct DeployTokenHandler {
    simulator: Arc<dyn EffectSimulator>,
}

impl DeployTokenHandler {
    pub fn new(simulator: Arc<dyn EffectSimulator>) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl NodeHandler for DeployTokenHandler {
    async fn execute(
        &self,
        node: &Node,
        _context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        let NodeConfig::DeployToken(config) = &node.config else {
            return Err(config_mismatch(node, "deployToken"));
        };
        let outcome = self.simulator.deploy_token(config).await?;
        relay_outcome(
            node,
            &outcome.logs,
            format!("Token deployed: {}", outcome.program_id),
            &outcome,
        )
    }
}

pub struct SnipeTaskHandler {
    simulator: Arc<dyn EffectSimulator>,
}

impl SnipeTaskHandler {
    pub fn new(simulator: Arc<dyn EffectSimulator>) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl NodeHandler for SnipeTaskHandler {
    async fn execute(
        &self,
        node: &Node,
        _context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        let NodeConfig::SnipeTask(config) = &node.config else {
            return Err(config_mismatch(node, "snipeTask"));
        };
        let outcome = self.simulator.place_snipe_order(config).await?;
        relay_outcome(
            node,
            &outcome.logs,
            format!("Snipe order executed: {}", outcome.order_id),
            &outcome,
        )
    }
}

pub struct SwapHandler {
    simulator: Arc<dyn EffectSimulator>,
}

impl SwapHandler {
    pub fn new(simulator: Arc<dyn EffectSimulator>) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl NodeHandler for SwapHandler {
    async fn execute(
        &self,
        node: &Node,
        _context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        let NodeConfig::Swap(config) = &node.config else {
            return Err(config_mismatch(node, "swap"));
        };
        let outcome = self.simulator.swap(config).await?;
        relay_outcome(
            node,
            &outcome.logs,
            format!("Swap completed: {}", outcome.transaction_id),
            &outcome,
        )
    }
}

pub struct MintNftHandler {
    simulator: Arc<dyn EffectSimulator>,
}

impl MintNftHandler {
    pub fn new(simulator: Arc<dyn EffectSimulator>) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl NodeHandler for MintNftHandler {
    async fn execute(
        &self,
        node: &Node,
        _context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        let NodeConfig::MintNft(config) = &node.config else {
            return Err(config_mismatch(node, "mintNFT"));
        };
        let outcome = self.simulator.mint_nft(config).await?;
        relay_outcome(
            node,
            &outcome.logs,
            format!("NFT minted: {}", outcome.mint_address),
            &outcome,
        )
    }
}

pub struct AlertHandler;

#[async_trait]
impl NodeHandler for AlertHandler {
    async fn execute(
        &self,
        node: &Node,
        _context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        let NodeConfig::Alert(config) = &node.config else {
            return Err(config_mismatch(node, "alert"));
        };
        let message = match config.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => "No message",
        };
        Ok(vec![entry(
            node,
            LogLevel::Warning,
            format!("Alert: {}", message),
        )])
    }
}

/// Custom nodes only announce themselves
pub struct CustomHandler;

#[async_trait]
impl NodeHandler for CustomHandler {
    async fn execute(
        &self,
        node: &Node,
        _context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError> {
        Ok(vec![entry(
            node,
            LogLevel::Info,
            format!("Custom node executed: {}", node.label),
        )])
    }
}
