//! Node factory
//!
//! Convenience constructors that turn a typed configuration into a node with
//! a fresh id and the default label for its type.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::exoworks::mock::{generate_fake_address, random_base36};
use crate::exoworks::workflow::graph::{Edge, Node, Workflow};
use crate::exoworks::workflow::types::{
    AlertConfig, ConditionConfig, Network, NodeConfig, NodeType, WalletConfig,
};
use crate::sdk::effect::{DeployTokenConfig, MintNftConfig, SnipeTaskConfig, SwapConfig};

/// `<type>-<unix millis>-<9 random base-36 chars>`
pub fn generate_node_id(node_type: &NodeType) -> String {
    format!(
        "{}-{}-{}",
        node_type,
        Utc::now().timestamp_millis(),
        random_base36(9)
    )
}

/// Node with a generated id, labelled after its configuration
pub fn create_node(config: NodeConfig) -> Node {
    let id = generate_node_id(&config.node_type());
    let label = config.default_label();
    Node::new(id, label, config)
}

pub fn create_wallet_node(config: WalletConfig) -> Node {
    create_node(NodeConfig::Wallet(config))
}

pub fn create_condition_node(config: ConditionConfig) -> Node {
    create_node(NodeConfig::Condition(config))
}

pub fn create_swap_node(config: SwapConfig) -> Node {
    create_node(NodeConfig::Swap(config))
}

pub fn create_deploy_token_node(config: DeployTokenConfig) -> Node {
    create_node(NodeConfig::DeployToken(config))
}

pub fn create_snipe_task_node(config: SnipeTaskConfig) -> Node {
    create_node(NodeConfig::SnipeTask(config))
}

pub fn create_mint_nft_node(config: MintNftConfig) -> Node {
    create_node(NodeConfig::MintNft(config))
}

pub fn create_alert_node(message: impl Into<String>) -> Node {
    create_node(NodeConfig::Alert(AlertConfig {
        message: Some(message.into()),
    }))
}

/// Custom nodes carry the caller's label rather than a derived one
pub fn create_custom_node(label: impl Into<String>, config: Map<String, Value>) -> Node {
    let config = NodeConfig::Custom(config);
    Node::new(generate_node_id(&config.node_type()), label, config)
}

/// Sample token launch: dev wallet -> deploy token -> snipe
pub fn launch_workflow() -> Workflow {
    let wallet = create_wallet_node(WalletConfig {
        name: Some("Dev Wallet".to_string()),
        address: generate_fake_address(),
        network: Network::Devnet,
    })
    .with_position(200.0, 100.0);

    let deploy = create_deploy_token_node(DeployTokenConfig {
        coin_name: "My Awesome Token".to_string(),
        ticker: "MAT".to_string(),
        description: "A token created with ExoWorks".to_string(),
        ..Default::default()
    })
    .with_position(500.0, 100.0);

    let snipe = create_snipe_task_node(SnipeTaskConfig {
        amount: 1.0,
        max_slippage: 5.0,
        dev_bonus_pct: 5.0,
    })
    .with_position(800.0, 100.0);

    let edges = vec![
        Edge::new("edge-1", &wallet.id, &deploy.id),
        Edge::new("edge-2", &deploy.id, &snipe.id),
    ];

    Workflow::from_parts(
        "token-launch",
        "Token Launch",
        vec![wallet, deploy, snipe],
        edges,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exoworks::mock::MockSolana;
    use crate::exoworks::workflow::condition::{ConditionOperator, Threshold};
    use crate::exoworks::workflow::context::ExecutionContext;
    use crate::exoworks::workflow::graph::ExecutionEngine;
    use crate::exoworks::workflow::log::LogLevel;
    use std::sync::Arc;

    #[test]
    fn test_node_id_format() {
        let id = generate_node_id(&NodeType::DeployToken);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "deployToken");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert_ne!(id, generate_node_id(&NodeType::DeployToken));
    }

    #[test]
    fn test_default_labels() {
        let wallet = create_wallet_node(WalletConfig {
            name: None,
            address: "ABCDEFGHIJKLMNOP".into(),
            network: Network::Mainnet,
        });
        assert_eq!(wallet.label, "Wallet: ABCDEFGH...");
        assert_eq!(wallet.node_type(), NodeType::Wallet);

        let condition = create_condition_node(ConditionConfig {
            variable: "price".into(),
            operator: ConditionOperator::Gt,
            threshold: Threshold::Number(10.0),
        });
        assert_eq!(condition.label, "If price gt 10");

        let swap = create_swap_node(SwapConfig {
            from_token: "SOL".into(),
            to_token: "USDC".into(),
            amount: 2.5,
        });
        assert_eq!(swap.label, "Swap 2.5 SOL → USDC");

        let snipe = create_snipe_task_node(SnipeTaskConfig {
            amount: 1.0,
            max_slippage: 5.0,
            dev_bonus_pct: 5.0,
        });
        assert_eq!(snipe.label, "Snipe: 1 SOL (5% dev bonus)");

        let mint = create_mint_nft_node(MintNftConfig {
            name: "Genesis".into(),
            uri: None,
        });
        assert_eq!(mint.label, "Mint NFT: Genesis");

        assert_eq!(create_alert_node("watch out").label, "Alert: watch out");

        let custom = create_custom_node("Webhook", Map::new());
        assert_eq!(custom.label, "Webhook");
        assert!(custom.id.starts_with("custom-"));
    }

    #[tokio::test]
    async fn test_deploy_token_node_round_trip() {
        let node = create_deploy_token_node(DeployTokenConfig {
            coin_name: "X".into(),
            ticker: "X".into(),
            description: "d".into(),
            ..Default::default()
        });
        assert_eq!(node.node_type().as_str(), "deployToken");
        assert_eq!(node.label, "Deploy Token: X");

        let mut wf = Workflow::new("wf", "deploy");
        let node_id = node.id.clone();
        wf.add_node(node).unwrap();

        let engine = ExecutionEngine::with_simulator(Arc::new(MockSolana::instant()));
        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        let entries: Vec<_> = result.logs_for(&node_id).collect();
        let successes: Vec<_> = entries
            .iter()
            .filter(|e| e.level == LogLevel::Success)
            .collect();
        assert_eq!(successes.len(), 1);
        let data = successes[0].data.as_ref().unwrap();
        assert!(data["programId"].as_str().unwrap().starts_with("Token"));
        assert!(data["transactionId"].as_str().unwrap().starts_with("tx"));

        // executing entry, trace lines, then the success entry
        assert_eq!(entries.last().unwrap().level, LogLevel::Success);
        assert!(entries[1..entries.len() - 1]
            .iter()
            .all(|e| e.level == LogLevel::Info));
        assert!(entries.len() > 2);
    }

    #[test]
    fn test_launch_workflow_shape() {
        let wf = launch_workflow();
        assert!(wf.validate().valid);
        assert_eq!(wf.nodes().len(), 3);

        let entry = wf.entry_nodes();
        assert_eq!(entry.len(), 1);
        assert_eq!(entry[0].label, "Dev Wallet");

        let exit = wf.exit_nodes();
        assert_eq!(exit.len(), 1);
        assert_eq!(exit[0].label, "Snipe: 1 SOL (5% dev bonus)");

        let ids: Vec<&str> = wf.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge-1", "edge-2"]);
    }
}
