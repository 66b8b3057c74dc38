use std::path::PathBuf;

use ethers::types::Address;
use tracing::warn;

use crate::infrastructure::contracts::types::{GasPriceStrategy, NetworkKind};

/// Gateway configuration, read once at startup from environment variables
/// (a `.env` file is honored via dotenvy in `main`).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub network_name: String,
    pub network: NetworkKind,
    pub rpc_url: String,
    pub chain_id: u64,

    pub contract_address: Option<Address>,
    pub contract_abi_path: PathBuf,

    /// Server-side signing key. When unset, write calls return the unsigned
    /// transaction payload for the frontend to sign.
    pub private_key: Option<String>,

    /// Gas price ceiling in gwei.
    pub max_gas_price_gwei: u64,
    pub default_gas_limit: u64,
    pub gas_price_strategy: GasPriceStrategy,

    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let network_name =
            std::env::var("NETWORK_NAME").unwrap_or_else(|_| "sepolia".to_string());
        let network = NetworkKind::from_name(&network_name);

        let rpc_url =
            std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());

        let chain_id = std::env::var("CHAIN_ID")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(11155111);

        let contract_address = match std::env::var("CONTRACT_ADDRESS") {
            Ok(raw) if !raw.is_empty() => match raw.parse::<Address>() {
                Ok(address) => Some(address),
                Err(_) => {
                    warn!("CONTRACT_ADDRESS is not a valid address: {}", raw);
                    None
                }
            },
            _ => None,
        };

        let contract_abi_path = std::env::var("CONTRACT_ABI_PATH")
            .unwrap_or_else(|_| "contracts/abi.json".to_string())
            .into();

        let private_key = std::env::var("PRIVATE_KEY").ok().filter(|k| !k.is_empty());

        let max_gas_price_gwei = std::env::var("MAX_GAS_PRICE")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(50);

        let default_gas_limit = std::env::var("DEFAULT_GAS_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3_000_000);

        let gas_price_strategy = match std::env::var("GAS_PRICE_STRATEGY").as_deref() {
            Ok("dynamic") => GasPriceStrategy::Dynamic,
            _ => GasPriceStrategy::Fixed,
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        Self {
            network_name,
            network,
            rpc_url,
            chain_id,
            contract_address,
            contract_abi_path,
            private_key,
            max_gas_price_gwei,
            default_gas_limit,
            gas_price_strategy,
            host,
            port,
        }
    }
}
