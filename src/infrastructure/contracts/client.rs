use std::sync::Arc;

use ethers::abi::{Abi, RawLog};
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Filter, TransactionRequest, H256, U256};
use ethers::utils::{format_units, to_checksum};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::domain::models::{
    BalanceInfo, ContractInfo, EventEntry, GasInfo, NetworkInfo, TransactionStatusInfo,
    WriteOutcome,
};
use crate::infrastructure::contracts::codec::{bind_params, flatten_outputs, flatten_token};
use crate::infrastructure::contracts::config::GatewayConfig;
use crate::infrastructure::contracts::nonce::AccountLocks;
use crate::infrastructure::contracts::registry::AbiRegistry;
use crate::infrastructure::contracts::types::{ContractError, GasPriceStrategy};

/// How many blocks back a `latest` start tag reaches in event lookups.
const DEFAULT_EVENT_WINDOW: u64 = 100;

struct BoundContract {
    address: Address,
    registry: AbiRegistry,
}

/// Single point of contact with the chain node.
///
/// Holds the provider and the bound contract, both created once at startup
/// and shared read-only across requests.
pub struct ContractClient {
    provider: Arc<Provider<Http>>,
    config: GatewayConfig,
    wallet: Option<LocalWallet>,
    contract: Option<BoundContract>,
    locks: AccountLocks,
}

impl ContractClient {
    pub async fn connect(config: GatewayConfig) -> Result<Self, ContractError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ContractError::RpcError(e.to_string()))?;
        let provider = Arc::new(provider);

        if config.network.is_poa() {
            // These chains carry oversized extraData in their headers and
            // expect the legacy gas-price transaction format.
            info!(
                "{} is a proof-of-authority network, forcing legacy transactions",
                config.network_name
            );
        }

        match provider.get_block_number().await {
            Ok(block) => info!(
                "Connected to {} network, latest block: {}",
                config.network_name, block
            ),
            Err(e) => error!(
                "Failed to reach {} node at startup: {}",
                config.network_name, e
            ),
        }

        let wallet = match &config.private_key {
            Some(key) => Some(
                key.parse::<LocalWallet>()
                    .map_err(|e| {
                        ContractError::ConfigError(format!("invalid PRIVATE_KEY: {}", e))
                    })?
                    .with_chain_id(config.chain_id),
            ),
            None => None,
        };

        let contract = Self::load_contract(&config)?;

        Ok(Self {
            provider,
            config,
            wallet,
            contract,
            locks: AccountLocks::new(),
        })
    }

    /// Load the ABI file and bind the configured address. A missing file or
    /// unset address degrades to "no contract loaded"; a malformed ABI is an
    /// operator error and fails startup.
    fn load_contract(config: &GatewayConfig) -> Result<Option<BoundContract>, ContractError> {
        let Some(address) = config.contract_address else {
            warn!("No contract address configured, contract calls will fail");
            return Ok(None);
        };

        if !config.contract_abi_path.exists() {
            warn!(
                "Contract ABI file not found: {}",
                config.contract_abi_path.display()
            );
            return Ok(None);
        }

        let raw = std::fs::read(&config.contract_abi_path).map_err(|e| {
            ContractError::ConfigError(format!(
                "cannot read {}: {}",
                config.contract_abi_path.display(),
                e
            ))
        })?;
        let abi: Abi = serde_json::from_slice(&raw).map_err(|e| {
            ContractError::ConfigError(format!(
                "malformed ABI in {}: {}",
                config.contract_abi_path.display(),
                e
            ))
        })?;

        info!("Contract loaded at {}", to_checksum(&address, None));
        Ok(Some(BoundContract {
            address,
            registry: AbiRegistry::new(&abi),
        }))
    }

    fn bound(&self) -> Result<&BoundContract, ContractError> {
        self.contract.as_ref().ok_or(ContractError::ContractNotLoaded)
    }

    pub fn is_valid_address(address: &str) -> bool {
        address.parse::<Address>().is_ok()
    }

    pub async fn node_connected(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }

    // ============ READ PATH ============

    /// Execute a non-mutating contract call and flatten the result.
    pub async fn read_function(
        &self,
        name: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ContractError> {
        let bound = self.bound()?;
        let function = bound.registry.function(name, params.len())?;
        let tokens = bind_params(function, params)?;
        let data = function
            .encode_input(&tokens)
            .map_err(|e| ContractError::AbiError(e.to_string()))?;

        let call = TransactionRequest::new().to(bound.address).data(data);
        let typed = TypedTransaction::Legacy(call);
        let raw = self
            .provider
            .call(&typed, None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        let outputs = function
            .decode_output(&raw)
            .map_err(|e| ContractError::AbiError(e.to_string()))?;
        debug!("Read function {} returned {} value(s)", name, outputs.len());
        Ok(flatten_outputs(function, &outputs))
    }

    // ============ WRITE PATH ============

    /// Build and submit a state-changing call.
    ///
    /// With a server key configured the transaction is signed and broadcast
    /// here (the effective sender is the key's address); otherwise the
    /// unsigned payload goes back to the caller for external signing.
    pub async fn write_function(
        &self,
        name: &str,
        params: &Map<String, Value>,
        account_address: &str,
        gas_limit: Option<u64>,
    ) -> Result<WriteOutcome, ContractError> {
        let bound = self.bound()?;
        let function = bound.registry.function(name, params.len())?;
        let from = account_address
            .parse::<Address>()
            .map_err(|_| ContractError::InvalidAddress(account_address.to_string()))?;
        let tokens = bind_params(function, params)?;
        let data = function
            .encode_input(&tokens)
            .map_err(|e| ContractError::AbiError(e.to_string()))?;

        let call = TransactionRequest::new()
            .from(from)
            .to(bound.address)
            .data(data);

        // Nonce fetch and submission are serialized per account.
        let _guard = self.locks.acquire(from).await;

        let gas = match gas_limit {
            Some(limit) => U256::from(limit),
            None => {
                let typed = TypedTransaction::Legacy(call.clone());
                pad_gas(self.estimated_gas_for(&typed).await?)
            }
        };
        let gas_price = self.write_gas_price().await?;
        let nonce = self
            .provider
            .get_transaction_count(from, None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        let request = call
            .gas(gas)
            .gas_price(gas_price)
            .nonce(nonce)
            .chain_id(self.config.chain_id);

        match &self.wallet {
            Some(wallet) => {
                let typed = TypedTransaction::Legacy(request);
                let signature = wallet
                    .sign_transaction(&typed)
                    .await
                    .map_err(|e| ContractError::TransactionError(e.to_string()))?;
                let raw = typed.rlp_signed(&signature);
                let pending = self
                    .provider
                    .send_raw_transaction(raw)
                    .await
                    .map_err(|e| ContractError::TransactionError(e.to_string()))?;
                let tx_hash = hash_hex(pending.tx_hash());
                info!("Write function {} broadcast as {}", name, tx_hash);
                Ok(WriteOutcome::Broadcast { tx_hash })
            }
            None => {
                let transaction = serde_json::to_value(&request)
                    .map_err(|e| ContractError::TransactionError(e.to_string()))?;
                Ok(WriteOutcome::Unsigned { transaction })
            }
        }
    }

    /// Standalone gas estimate for a prospective call.
    pub async fn estimate_gas(
        &self,
        name: &str,
        params: &Map<String, Value>,
        account_address: &str,
    ) -> Result<u64, ContractError> {
        let bound = self.bound()?;
        let function = bound.registry.function(name, params.len())?;
        let from = account_address
            .parse::<Address>()
            .map_err(|_| ContractError::InvalidAddress(account_address.to_string()))?;
        let tokens = bind_params(function, params)?;
        let data = function
            .encode_input(&tokens)
            .map_err(|e| ContractError::AbiError(e.to_string()))?;

        let typed = TypedTransaction::Legacy(
            TransactionRequest::new()
                .from(from)
                .to(bound.address)
                .data(data),
        );
        let estimate = self.estimated_gas_for(&typed).await?;
        Ok(saturating_u64(estimate))
    }

    async fn estimated_gas_for(&self, typed: &TypedTransaction) -> Result<U256, ContractError> {
        self.provider
            .estimate_gas(typed, None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))
    }

    async fn write_gas_price(&self) -> Result<U256, ContractError> {
        let ceiling = gwei_to_wei(self.config.max_gas_price_gwei);
        match self.config.gas_price_strategy {
            GasPriceStrategy::Fixed => Ok(ceiling),
            GasPriceStrategy::Dynamic => {
                let current = self
                    .provider
                    .get_gas_price()
                    .await
                    .map_err(|e| ContractError::RpcError(e.to_string()))?;
                Ok(current.min(ceiling))
            }
        }
    }

    // ============ TRANSACTION STATUS ============

    pub async fn transaction_status(
        &self,
        tx_hash: &str,
    ) -> Result<TransactionStatusInfo, ContractError> {
        let hash = tx_hash
            .parse::<H256>()
            .map_err(|_| ContractError::InvalidTransactionHash(tx_hash.to_string()))?;
        let hash_text = hash_hex(hash);

        self.provider
            .get_transaction(hash)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionNotFound(hash_text.clone()))?;

        match self.provider.get_transaction_receipt(hash).await {
            Ok(Some(receipt)) => {
                let head = self
                    .provider
                    .get_block_number()
                    .await
                    .map_err(|e| ContractError::RpcError(e.to_string()))?
                    .as_u64();
                let status_code = receipt.status.map(|s| s.as_u64()).unwrap_or(0);
                let block_number = receipt.block_number.map(|b| b.as_u64()).unwrap_or_default();
                let gas_used = receipt.gas_used.map(saturating_u64);
                Ok(TransactionStatusInfo::confirmed(
                    status_code,
                    block_number,
                    gas_used,
                    head,
                    hash_text,
                ))
            }
            // No receipt yet, or the node refused the lookup.
            Ok(None) | Err(_) => Ok(TransactionStatusInfo::pending(hash_text)),
        }
    }

    // ============ EVENTS ============

    /// Fetch and decode recent contract events.
    ///
    /// Failures past the "contract loaded" check degrade to an empty list so
    /// the frontend's event feed keeps rendering; the cause is logged.
    pub async fn contract_events(
        &self,
        from_block: Option<&str>,
        to_block: Option<&str>,
        event_name: Option<&str>,
    ) -> Result<Vec<EventEntry>, ContractError> {
        let bound = self.bound()?;
        match self
            .collect_events(bound, from_block, to_block, event_name)
            .await
        {
            Ok(events) => Ok(events),
            Err(e) => {
                warn!("Event lookup failed, returning empty list: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn collect_events(
        &self,
        bound: &BoundContract,
        from_block: Option<&str>,
        to_block: Option<&str>,
        event_name: Option<&str>,
    ) -> Result<Vec<EventEntry>, ContractError> {
        let head = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?
            .as_u64();
        let (from, to) = resolve_block_range(head, from_block, to_block)?;

        let filter = Filter::new()
            .address(bound.address)
            .from_block(from)
            .to_block(to);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        let mut events = Vec::new();
        for log in logs {
            let Some(topic) = log.topics.first() else {
                continue;
            };
            let Some(event) = bound.registry.event_for_topic(topic) else {
                debug!("Skipping log with unknown event topic {:?}", topic);
                continue;
            };
            if let Some(wanted) = event_name {
                if event.name != wanted {
                    continue;
                }
            }

            let raw = RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            };
            let parsed = match event.parse_log(raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("Failed to decode {} log: {}", event.name, e);
                    continue;
                }
            };

            let args = parsed
                .params
                .into_iter()
                .map(|param| (param.name, flatten_token(&param.value)))
                .collect();

            events.push(EventEntry {
                event: event.name.clone(),
                args,
                transaction_hash: log
                    .transaction_hash
                    .map(hash_hex)
                    .unwrap_or_default(),
                block_number: log.block_number.map(|b| b.as_u64()).unwrap_or_default(),
                log_index: log.log_index.map(saturating_u64).unwrap_or_default(),
            });
        }
        Ok(events)
    }

    // ============ CHAIN METADATA ============

    pub async fn network_info(&self) -> Result<NetworkInfo, ContractError> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;
        let block_number = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        Ok(NetworkInfo {
            network: self.config.network_name.clone(),
            chain_id: saturating_u64(chain_id),
            block_number: block_number.as_u64(),
            gas_price: saturating_u64(gas_price),
            // The queries above just succeeded.
            is_connected: true,
            contract_address: self
                .config
                .contract_address
                .map(|address| to_checksum(&address, None)),
        })
    }

    pub async fn account_balance(&self, address: &str) -> Result<BalanceInfo, ContractError> {
        let account = address
            .parse::<Address>()
            .map_err(|_| ContractError::InvalidAddress(address.to_string()))?;
        let wei = self
            .provider
            .get_balance(account, None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;
        let balance_eth = format_units(wei, "ether")
            .map_err(|e| ContractError::ConversionError(e.to_string()))?;
        let balance_formatted = match balance_eth.parse::<f64>() {
            Ok(value) => format!("{:.4} ETH", value),
            Err(_) => format!("{} ETH", balance_eth),
        };

        Ok(BalanceInfo {
            balance_wei: wei.to_string(),
            balance_eth,
            balance_formatted,
        })
    }

    pub async fn gas_info(&self) -> Result<GasInfo, ContractError> {
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;
        let gas_price_gwei = format_units(gas_price, "gwei")
            .map_err(|e| ContractError::ConversionError(e.to_string()))?;

        Ok(GasInfo {
            gas_price_wei: saturating_u64(gas_price),
            gas_price_gwei,
            max_gas_price_gwei: self.config.max_gas_price_gwei,
        })
    }

    pub fn contract_info(&self) -> ContractInfo {
        match &self.contract {
            Some(bound) => ContractInfo {
                address: Some(to_checksum(&bound.address, None)),
                loaded: true,
                functions: bound.registry.function_names(),
                events: bound.registry.event_names(),
            },
            None => ContractInfo {
                address: self
                    .config
                    .contract_address
                    .map(|address| to_checksum(&address, None)),
                loaded: false,
                functions: Vec::new(),
                events: Vec::new(),
            },
        }
    }
}

// ============ HELPERS ============

/// Gas estimates get a 20% safety margin.
fn pad_gas(estimate: U256) -> U256 {
    estimate * U256::from(120u64) / U256::from(100u64)
}

fn gwei_to_wei(gwei: u64) -> U256 {
    U256::from(gwei) * U256::exp10(9)
}

fn saturating_u64(value: U256) -> u64 {
    value.min(U256::from(u64::MAX)).as_u64()
}

fn hash_hex(hash: H256) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}

/// Resolve `latest` tags against the current head: a `latest` start means
/// the last `DEFAULT_EVENT_WINDOW` blocks, a `latest` end means the head.
fn resolve_block_range(
    head: u64,
    from_block: Option<&str>,
    to_block: Option<&str>,
) -> Result<(u64, u64), ContractError> {
    let parse = |tag: &str| {
        tag.parse::<u64>()
            .map_err(|_| ContractError::InvalidBlockTag(tag.to_string()))
    };

    let from = match from_block {
        None | Some("latest") | Some("") => head.saturating_sub(DEFAULT_EVENT_WINDOW),
        Some(tag) => parse(tag)?,
    };
    let to = match to_block {
        None | Some("latest") | Some("") => head,
        Some(tag) => parse(tag)?,
    };
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_padding_adds_twenty_percent() {
        assert_eq!(pad_gas(U256::from(100_000u64)), U256::from(120_000u64));
        assert_eq!(pad_gas(U256::from(21_000u64)), U256::from(25_200u64));
    }

    #[test]
    fn gwei_conversion() {
        assert_eq!(gwei_to_wei(50), U256::from(50_000_000_000u64));
    }

    #[test]
    fn latest_tags_resolve_against_the_head() {
        assert_eq!(resolve_block_range(5000, None, None).unwrap(), (4900, 5000));
        assert_eq!(
            resolve_block_range(5000, Some("latest"), Some("latest")).unwrap(),
            (4900, 5000)
        );
        assert_eq!(
            resolve_block_range(5000, Some("4321"), None).unwrap(),
            (4321, 5000)
        );
    }

    #[test]
    fn early_head_does_not_underflow() {
        assert_eq!(resolve_block_range(40, None, None).unwrap(), (0, 40));
    }

    #[test]
    fn malformed_block_tags_are_rejected() {
        let err = resolve_block_range(5000, Some("abc"), None).expect_err("must fail");
        assert!(matches!(err, ContractError::InvalidBlockTag(_)));
    }

    #[test]
    fn addresses_validate_without_checksum() {
        assert!(ContractClient::is_valid_address(
            "0x00000000000000000000000000000000000000aa"
        ));
        assert!(!ContractClient::is_valid_address("0x1234"));
        assert!(!ContractClient::is_valid_address("not-an-address"));
    }
}
