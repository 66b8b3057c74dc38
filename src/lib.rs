pub mod api;
pub mod domain;
pub mod handlers;
pub mod infrastructure;

#[cfg(test)]
mod tests;

// Main exports for external use
pub use handlers::routes::{create_router, AppState};
pub use infrastructure::contracts::{ContractClient, GatewayConfig};
