use serde::{Deserialize, Serialize};

// ============ NETWORK TYPES ============

/// Networks the gateway knows how to talk to.
///
/// The proof-of-authority variants carry non-standard block headers and the
/// legacy gas scheme; `is_poa` drives the compatibility accommodation
/// installed at client startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Mainnet,
    Sepolia,
    Polygon,
    Mumbai,
    Bsc,
    Local,
    Other,
}

impl NetworkKind {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" | "ethereum" => NetworkKind::Mainnet,
            "sepolia" => NetworkKind::Sepolia,
            "polygon" => NetworkKind::Polygon,
            "mumbai" => NetworkKind::Mumbai,
            "bsc" => NetworkKind::Bsc,
            "local" | "anvil" | "hardhat" => NetworkKind::Local,
            _ => NetworkKind::Other,
        }
    }

    /// Chains that need the proof-of-authority accommodation.
    pub fn is_poa(&self) -> bool {
        matches!(
            self,
            NetworkKind::Polygon | NetworkKind::Mumbai | NetworkKind::Bsc
        )
    }
}

/// Gas price strategy for the write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPriceStrategy {
    /// Always use the configured ceiling.
    Fixed,
    /// Ask the node, capped at the configured ceiling.
    Dynamic,
}

// ============ ERROR TYPES ============

/// Contract interaction errors
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract not loaded")]
    ContractNotLoaded,

    #[error("Unknown contract function: {name}")]
    UnknownFunction { name: String },

    #[error("Missing parameter '{name}' for {function}")]
    MissingParameter { function: String, name: String },

    #[error("Unexpected parameter '{name}' for {function}")]
    UnexpectedParameter { function: String, name: String },

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("ABI error: {0}")]
    AbiError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid transaction hash: {0}")]
    InvalidTransactionHash(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Transaction failed: {0}")]
    TransactionError(String),

    #[error("Invalid block tag: {0}")]
    InvalidBlockTag(String),

    #[error("Unit conversion error: {0}")]
    ConversionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poa_networks_are_flagged() {
        assert!(NetworkKind::from_name("polygon").is_poa());
        assert!(NetworkKind::from_name("Mumbai").is_poa());
        assert!(NetworkKind::from_name("bsc").is_poa());
        assert!(!NetworkKind::from_name("sepolia").is_poa());
        assert!(!NetworkKind::from_name("mainnet").is_poa());
        assert!(!NetworkKind::from_name("somethingelse").is_poa());
    }
}
