//! Wallet event types

use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// Notification raised by the wallet outside of any request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    /// The set of authorised accounts changed. Empty means disconnected.
    AccountsChanged(Vec<Address>),
    /// The active chain changed.
    ChainChanged(u64),
}

impl WalletEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WalletEvent::AccountsChanged(_) => "accountsChanged",
            WalletEvent::ChainChanged(_) => "chainChanged",
        }
    }
}
