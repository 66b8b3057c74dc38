use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::models::{
    BalanceInfo, ContractInfo, EventEntry, GasInfo, NetworkInfo, TransactionStatusInfo,
};

// ============ REQUEST TYPES ============

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub account_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub account_address: Option<String>,
    #[serde(default)]
    pub params: Map<String, Value>,
    pub gas_limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub from_block: Option<String>,
    pub to_block: Option<String>,
    pub event: Option<String>,
}

// ============ RESPONSE TYPES ============

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub message: String,
    pub account: String,
}

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub success: bool,
    pub result: Value,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub success: bool,
    pub tx_hash: Value,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionStatusResponse {
    pub success: bool,
    pub status: TransactionStatusInfo,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub success: bool,
    pub events: Vec<EventEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    pub success: bool,
    pub network: NetworkInfo,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub address: String,
    pub balance: BalanceInfo,
}

#[derive(Debug, Serialize)]
pub struct GasPriceResponse {
    pub success: bool,
    pub gas_info: GasInfo,
}

#[derive(Debug, Serialize)]
pub struct ContractInfoResponse {
    pub success: bool,
    pub contract: ContractInfo,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub node_connected: bool,
    pub timestamp: i64,
}
