use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::api::dto::{
    BalanceResponse, ConnectRequest, ConnectResponse, ContractInfoResponse, EventsQuery,
    EventsResponse, GasPriceResponse, HealthResponse, NetworkResponse, ReadResponse,
    TransactionStatusResponse, WriteRequest, WriteResponse,
};
use crate::api::errors::{ApiError, ApiResult};
use crate::handlers::AppState;
use crate::infrastructure::contracts::ContractClient;

/// Record a wallet connection. The address format is checked; no
/// cryptographic ownership proof is involved.
pub async fn connect_wallet(
    Json(request): Json<ConnectRequest>,
) -> ApiResult<Json<ConnectResponse>> {
    let account = request
        .account_address
        .filter(|address| !address.is_empty())
        .ok_or_else(|| ApiError::bad_request("No account address provided"))?;

    if !ContractClient::is_valid_address(&account) {
        return Err(ApiError::bad_request(format!(
            "Invalid account address: {}",
            account
        )));
    }

    info!("Wallet connected: {}", account);
    Ok(Json(ConnectResponse {
        success: true,
        message: "Wallet connected successfully".to_string(),
        account,
    }))
}

/// Read a contract function by name; query parameters become call arguments.
pub async fn read_contract(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ReadResponse>> {
    let params = params
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    let result = state.client.read_function(&function_name, &params).await?;
    Ok(Json(ReadResponse {
        success: true,
        result,
    }))
}

/// Write a contract function by name.
pub async fn write_contract(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
    Json(request): Json<WriteRequest>,
) -> ApiResult<Json<WriteResponse>> {
    // Checked before the contract-access layer is invoked.
    let account = request
        .account_address
        .filter(|address| !address.is_empty())
        .ok_or_else(|| ApiError::bad_request("Account address required"))?;

    let outcome = state
        .client
        .write_function(&function_name, &request.params, &account, request.gas_limit)
        .await?;

    Ok(Json(WriteResponse {
        success: true,
        tx_hash: outcome.payload(),
        message: outcome.message().to_string(),
    }))
}

pub async fn get_transaction_status(
    State(state): State<AppState>,
    Path(tx_hash): Path<String>,
) -> ApiResult<Json<TransactionStatusResponse>> {
    let status = state.client.transaction_status(&tx_hash).await?;
    Ok(Json(TransactionStatusResponse {
        success: true,
        status,
    }))
}

pub async fn get_contract_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<EventsResponse>> {
    let events = state
        .client
        .contract_events(
            query.from_block.as_deref(),
            query.to_block.as_deref(),
            query.event.as_deref(),
        )
        .await?;

    let count = events.len();
    Ok(Json(EventsResponse {
        success: true,
        events,
        count,
    }))
}

pub async fn get_network_info(
    State(state): State<AppState>,
) -> ApiResult<Json<NetworkResponse>> {
    let network = state.client.network_info().await?;
    Ok(Json(NetworkResponse {
        success: true,
        network,
    }))
}

pub async fn get_account_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    if !ContractClient::is_valid_address(&address) {
        return Err(ApiError::bad_request(format!("Invalid address: {}", address)));
    }

    let balance = state.client.account_balance(&address).await?;
    Ok(Json(BalanceResponse {
        success: true,
        address,
        balance,
    }))
}

pub async fn get_gas_price(State(state): State<AppState>) -> ApiResult<Json<GasPriceResponse>> {
    let gas_info = state.client.gas_info().await?;
    Ok(Json(GasPriceResponse {
        success: true,
        gas_info,
    }))
}

pub async fn get_contract_info(
    State(state): State<AppState>,
) -> Json<ContractInfoResponse> {
    Json(ContractInfoResponse {
        success: true,
        contract: state.client.contract_info(),
    })
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let node_connected = state.client.node_connected().await;
    let status = if node_connected { "healthy" } else { "unhealthy" };

    Json(HealthResponse {
        success: true,
        status: status.to_string(),
        node_connected,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
