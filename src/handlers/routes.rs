use std::any::Any;
use std::sync::Arc;

use axum::{
    body::{Bytes, Full},
    http::{header, Response, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AllowAny, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::contracts::{
    connect_wallet, get_account_balance, get_contract_events, get_contract_info, get_gas_price,
    get_network_info, get_transaction_status, health_check, read_contract, write_contract,
};
use crate::api::errors::ApiError;
use crate::infrastructure::contracts::ContractClient;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ContractClient>,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/connect", post(connect_wallet))
        .route("/contract/read/:function_name", get(read_contract))
        .route("/contract/write/:function_name", post(write_contract))
        .route("/contract/events", get(get_contract_events))
        .route("/contract/info", get(get_contract_info))
        .route("/transaction/:tx_hash", get(get_transaction_status))
        .route("/network", get(get_network_info))
        .route("/balance/:address", get(get_account_balance))
        .route("/gas-price", get(get_gas_price));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .fallback(endpoint_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowAny)
                .allow_methods(AllowAny)
                .allow_headers(AllowAny),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn endpoint_not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "success": false,
        "message": "Internal server error"
    })
    .to_string();

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::from(body))
        .expect("static response must build")
}
