// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::exoworks::workflow::context::ExecutionContext;
use crate::exoworks::workflow::graph::Node;
use crate::exoworks::workflow::handlers::{
    AlertHandler, ConditionHandler, CustomHandler, DeployTokenHandler, MintNftHandler,
    SnipeTaskHandler, SwapHandler, WalletHandler,
};
use crate::exoworks::workflow::log::LogEntry;
use crate::exoworks::workflow::types::NodeType;
use crate::sdk::effect::EffectSimulator;
use crate::sdk::error::ExoError;

/// Per-type node behavior.
///
/// A handler returns the node's type-specific log entries in emission order;
/// the engine adds the leading "executing" entry and converts an `Err` into
/// an error entry attributed to the node.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    async fn execute(
        &self,
        node: &Node,
        context: &mut ExecutionContext,
    ) -> Result<Vec<LogEntry>, ExoError>;
}

/// Maps node types to their handlers
#[derive(Clone)]
pub struct NodeRegistry {
    handlers: Arc<RwLock<HashMap<NodeType, Arc<dyn NodeHandler>>>>,
}

impl NodeRegistry {
    /// An empty registry; every node type is unrecognized until registered
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A registry with the built-in handler for every node type
    pub fn with_defaults(simulator: Arc<dyn EffectSimulator>) -> Self {
        let mut handlers: HashMap<NodeType, Arc<dyn NodeHandler>> = HashMap::new();
        handlers.insert(NodeType::Wallet, Arc::new(WalletHandler));
        handlers.insert(NodeType::Condition, Arc::new(ConditionHandler));
        handlers.insert(
            NodeType::Swap,
            Arc::new(SwapHandler::new(simulator.clone())),
        );
        handlers.insert(
            NodeType::DeployToken,
            Arc::new(DeployTokenHandler::new(simulator.clone())),
        );
        handlers.insert(
            NodeType::SnipeTask,
            Arc::new(SnipeTaskHandler::new(simulator.clone())),
        );
        handlers.insert(NodeType::MintNft, Arc::new(MintNftHandler::new(simulator)));
        handlers.insert(NodeType::Alert, Arc::new(AlertHandler));
        handlers.insert(NodeType::Custom, Arc::new(CustomHandler));

        Self {
            handlers: Arc::new(RwLock::new(handlers)),
        }
    }

    /// Register a handler, replacing any previous one for the type
    pub async fn register(&self, node_type: NodeType, handler: Arc<dyn NodeHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.insert(node_type, handler);
    }

    pub async fn get(&self, node_type: &NodeType) -> Option<Arc<dyn NodeHandler>> {
        let handlers = self.handlers.read().await;
        handlers.get(node_type).cloned()
    }

    pub async fn contains(&self, node_type: &NodeType) -> bool {
        self.handlers.read().await.contains_key(node_type)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
