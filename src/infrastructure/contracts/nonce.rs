//! Per-account write serialization.
//!
//! The nonce for a write call is read from the node and used immediately;
//! two concurrent writes from one account would otherwise race and submit
//! conflicting nonces. Each account gets its own async lock, held from the
//! nonce fetch until the transaction is handed to the node.

use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::Address;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct AccountLocks {
    slots: Mutex<HashMap<Address, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one account. Guards for different accounts do
    /// not contend.
    pub async fn acquire(&self, account: Address) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots
                .entry(account)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }
}
