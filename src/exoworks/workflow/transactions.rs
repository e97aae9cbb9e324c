// SPDX-License-Identifier: MIT

//! Pending transactions surfaced from a run's log payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::log::LogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// A transaction or program id reported by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub id: String,
    /// Node type tag, or `deploy` for program ids
    pub kind: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Collect every `transactionId` and `programId` found in entry payloads,
/// in log order
pub fn pending_transactions(logs: &[LogEntry]) -> Vec<PendingTransaction> {
    let mut transactions = Vec::new();

    for entry in logs {
        let Some(data) = entry.data.as_ref().and_then(|d| d.as_object()) else {
            continue;
        };

        if let Some(id) = data.get("transactionId").and_then(|v| v.as_str()) {
            transactions.push(PendingTransaction {
                id: id.to_string(),
                kind: entry.node_type.to_string(),
                status: TransactionStatus::Pending,
                timestamp: entry.timestamp,
            });
        }
        if let Some(id) = data.get("programId").and_then(|v| v.as_str()) {
            transactions.push(PendingTransaction {
                id: id.to_string(),
                kind: "deploy".to_string(),
                status: TransactionStatus::Pending,
                timestamp: entry.timestamp,
            });
        }
    }

    transactions
}

pub fn confirm_all(transactions: &mut [PendingTransaction]) {
    for tx in transactions {
        tx.status = TransactionStatus::Confirmed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exoworks::workflow::log::LogLevel;
    use crate::exoworks::workflow::types::NodeType;
    use serde_json::json;

    fn success(node_type: NodeType, data: serde_json::Value) -> LogEntry {
        LogEntry::new("n", node_type, LogLevel::Success, "done").with_data(data)
    }

    #[test]
    fn test_extracts_transaction_and_program_ids() {
        let logs = vec![
            LogEntry::new("w", NodeType::Wallet, LogLevel::Info, "Wallet node configured: W"),
            success(
                NodeType::DeployToken,
                json!({"programId": "TokenABC", "transactionId": "tx1", "logs": []}),
            ),
            success(NodeType::SnipeTask, json!({"orderId": "o1", "transactionId": "tx2"})),
            LogEntry::new("x", NodeType::Custom, LogLevel::Error, "boom")
                .with_data(json!({"error": "boom"})),
        ];

        let txs = pending_transactions(&logs);
        let summary: Vec<(&str, &str)> = txs
            .iter()
            .map(|t| (t.id.as_str(), t.kind.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("tx1", "deployToken"), ("TokenABC", "deploy"), ("tx2", "snipeTask")]
        );
        assert!(txs.iter().all(|t| t.status == TransactionStatus::Pending));
    }

    #[test]
    fn test_ignores_non_string_ids() {
        let logs = vec![success(NodeType::Swap, json!({"transactionId": 42}))];
        assert!(pending_transactions(&logs).is_empty());
    }

    #[test]
    fn test_confirm_all() {
        let logs = vec![success(NodeType::Swap, json!({"transactionId": "tx9"}))];
        let mut txs = pending_transactions(&logs);
        confirm_all(&mut txs);
        assert_eq!(txs[0].status, TransactionStatus::Confirmed);
        assert_eq!(txs[0].status.to_string(), "confirmed");
    }
}
