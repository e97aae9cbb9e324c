// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use std::time::Duration;

use crate::sdk::effect::{
    DeployOutcome, DeployTokenConfig, EffectSimulator, MintNftConfig, MintOutcome, SnipeOutcome,
    SnipeTaskConfig, SwapConfig, SwapOutcome,
};
use crate::sdk::error::ExoError;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Simulated network behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorConfig {
    /// Multiplier applied to every simulated latency; 0 disables waiting
    pub latency_scale: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { latency_scale: 1.0 }
    }
}

/// Stand-in for a Solana backend: waits a random latency, then fabricates
/// identifiers and a timestamped trace.
#[derive(Debug, Clone, Default)]
pub struct MockSolana {
    config: SimulatorConfig,
}

impl MockSolana {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// A simulator that never sleeps
    pub fn instant() -> Self {
        Self::new(SimulatorConfig { latency_scale: 0.0 })
    }

    /// Sleep for `base_ms` plus up to `jitter_ms`, scaled
    async fn network_delay(&self, base_ms: u64, jitter_ms: u64) {
        if self.config.latency_scale <= 0.0 {
            return;
        }
        let delay = latency(base_ms, jitter_ms, self.config.latency_scale);
        log::debug!("Simulating {:?} of network latency", delay);
        tokio::time::sleep(delay).await;
    }
}

fn latency(base_ms: u64, jitter_ms: u64, scale: f64) -> Duration {
    let jitter = rand::thread_rng().gen_range(0.0..=jitter_ms as f64);
    Duration::from_secs_f64((base_ms as f64 + jitter) * scale / 1000.0)
}

fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Random lowercase base-36 suffix
pub fn random_base36(len: usize) -> String {
    random_string(BASE36, len)
}

/// A 44-character base-58 string shaped like a Solana address
pub fn generate_fake_address() -> String {
    random_string(BASE58, 44)
}

fn trace(message: impl AsRef<str>) -> String {
    format!(
        "[{}] {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        message.as_ref()
    )
}

fn transaction_id() -> String {
    format!("tx{}", random_base36(16))
}

#[async_trait]
impl EffectSimulator for MockSolana {
    async fn deploy_token(&self, config: &DeployTokenConfig) -> Result<DeployOutcome, ExoError> {
        self.network_delay(500, 1000).await;

        let program_id = format!("Token{}", random_base36(9).to_uppercase());
        let transaction_id = transaction_id();

        let logs = vec![
            trace(format!(
                "Initializing token deployment for {}",
                config.ticker
            )),
            trace("Creating token metadata..."),
            trace("Uploading token image..."),
            trace("Deploying token program..."),
            trace("Token deployed successfully!"),
            trace(format!("Program ID: {}", program_id)),
            trace(format!("Transaction: {}", transaction_id)),
        ];

        Ok(DeployOutcome {
            program_id,
            transaction_id,
            logs,
        })
    }

    async fn place_snipe_order(
        &self,
        config: &SnipeTaskConfig,
    ) -> Result<SnipeOutcome, ExoError> {
        self.network_delay(300, 800).await;

        let order_id = format!("order{}", random_base36(12));
        let transaction_id = transaction_id();

        let logs = vec![
            trace(format!("Creating snipe order for {} SOL", config.amount)),
            trace(format!("Max slippage: {}%", config.max_slippage)),
            trace(format!("Dev bonus: {}%", config.dev_bonus_pct)),
            trace("Monitoring for token launch..."),
            trace("Token detected, executing snipe..."),
            trace("Snipe order executed successfully!"),
            trace(format!("Order ID: {}", order_id)),
            trace(format!("Transaction: {}", transaction_id)),
        ];

        Ok(SnipeOutcome {
            order_id,
            transaction_id,
            logs,
        })
    }

    async fn swap(&self, config: &SwapConfig) -> Result<SwapOutcome, ExoError> {
        self.network_delay(400, 600).await;

        let transaction_id = transaction_id();
        // Up to 5% slippage
        let received = config.amount * rand::thread_rng().gen_range(0.95..=1.0);

        let logs = vec![
            trace(format!(
                "Initiating swap: {} {} → {}",
                config.amount, config.from_token, config.to_token
            )),
            trace("Fetching quote..."),
            trace("Executing swap transaction..."),
            trace("Swap completed!"),
            trace(format!("Received: {:.4} {}", received, config.to_token)),
            trace(format!("Transaction: {}", transaction_id)),
        ];

        Ok(SwapOutcome {
            transaction_id,
            logs,
        })
    }

    async fn mint_nft(&self, config: &MintNftConfig) -> Result<MintOutcome, ExoError> {
        self.network_delay(600, 900).await;

        let mint_address = format!("mint{}", random_base36(16));
        let transaction_id = transaction_id();

        let logs = vec![
            trace(format!("Creating NFT metadata for \"{}\"", config.name)),
            trace("Uploading metadata to Arweave..."),
            trace("Creating mint account..."),
            trace("Minting NFT..."),
            trace("NFT minted successfully!"),
            trace(format!("Mint address: {}", mint_address)),
            trace(format!("Transaction: {}", transaction_id)),
        ];

        Ok(MintOutcome {
            mint_address,
            transaction_id,
            logs,
        })
    }
}
