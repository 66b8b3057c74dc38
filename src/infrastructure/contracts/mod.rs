// Contract integration module
// This module is the single point of contact with the chain node.

pub mod client;
pub mod codec;
pub mod config;
pub mod nonce;
pub mod registry;
pub mod types;

// Re-export main components for easy access
pub use client::ContractClient;
pub use config::GatewayConfig;
pub use types::*;
