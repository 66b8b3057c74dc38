use std::net::SocketAddr;
use std::sync::Arc;

use axum::Server;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use chaingate_backend::{create_router, AppState, ContractClient, GatewayConfig};

#[tokio::main]
async fn main() {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid HOST/PORT configuration");

    let client = match ContractClient::connect(config).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to initialize chain client: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        client: Arc::new(client),
    };
    let app = create_router(state);

    tracing::info!("Server running at http://{}", addr);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
