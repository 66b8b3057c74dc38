use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ TRANSACTION STATUS ============

/// Outcome of a transaction-status lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusInfo {
    pub status: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    pub transaction_hash: String,
    pub confirmations: u64,
}

impl TransactionStatusInfo {
    /// Status for a mined transaction, from its receipt fields.
    pub fn confirmed(
        status_code: u64,
        block_number: u64,
        gas_used: Option<u64>,
        head: u64,
        transaction_hash: String,
    ) -> Self {
        let status = if status_code == 1 { "success" } else { "failed" };
        Self {
            status: status.to_string(),
            block_number: Some(block_number),
            gas_used,
            transaction_hash,
            confirmations: head.saturating_sub(block_number),
        }
    }

    /// Status for a known but unmined transaction.
    pub fn pending(transaction_hash: String) -> Self {
        Self {
            status: "pending".to_string(),
            block_number: None,
            gas_used: None,
            transaction_hash,
            confirmations: 0,
        }
    }
}

// ============ EVENTS ============

/// One decoded contract event entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub event: String,
    pub args: Map<String, Value>,
    pub transaction_hash: String,
    pub block_number: u64,
    pub log_index: u64,
}

// ============ CHAIN METADATA ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub network: String,
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price: u64,
    pub is_connected: bool,
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceInfo {
    pub balance_wei: String,
    pub balance_eth: String,
    pub balance_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasInfo {
    pub gas_price_wei: u64,
    pub gas_price_gwei: String,
    pub max_gas_price_gwei: u64,
}

/// The bound contract as shown to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInfo {
    pub address: Option<String>,
    pub loaded: bool,
    pub functions: Vec<String>,
    pub events: Vec<String>,
}

// ============ WRITE OUTCOME ============

/// Result of a write call: either a broadcast transaction hash (server-side
/// signing) or the unsigned payload for the frontend to sign.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    Broadcast { tx_hash: String },
    Unsigned { transaction: Value },
}

impl WriteOutcome {
    pub fn payload(&self) -> Value {
        match self {
            WriteOutcome::Broadcast { tx_hash } => Value::String(tx_hash.clone()),
            WriteOutcome::Unsigned { transaction } => transaction.clone(),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            WriteOutcome::Broadcast { .. } => "Transaction sent successfully",
            WriteOutcome::Unsigned { .. } => "Transaction built for external signing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_status_one_reports_success() {
        let info =
            TransactionStatusInfo::confirmed(1, 4990, Some(21000), 5000, "0xabc".to_string());
        assert_eq!(info.status, "success");
        assert_eq!(info.block_number, Some(4990));
        assert_eq!(info.gas_used, Some(21000));
        assert_eq!(info.confirmations, 10);
    }

    #[test]
    fn receipt_status_zero_reports_failed() {
        let info = TransactionStatusInfo::confirmed(0, 5000, Some(21000), 5000, "0xabc".to_string());
        assert_eq!(info.status, "failed");
        assert_eq!(info.confirmations, 0);
    }

    #[test]
    fn missing_receipt_reports_pending_with_null_fields() {
        let info = TransactionStatusInfo::pending("0xabc".to_string());
        assert_eq!(info.status, "pending");
        assert_eq!(info.block_number, None);
        assert_eq!(info.gas_used, None);
        assert_eq!(info.confirmations, 0);
    }

    #[test]
    fn confirmations_never_underflow() {
        // A receipt from a block ahead of our view of the head.
        let info = TransactionStatusInfo::confirmed(1, 5001, None, 5000, "0xabc".to_string());
        assert_eq!(info.confirmations, 0);
    }
}
