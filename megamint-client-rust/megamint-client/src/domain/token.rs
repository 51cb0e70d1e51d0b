use chrono::{DateTime, Utc};
use ethers::types::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Token metadata as recorded by the factory contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token_address: Address,
    pub name: String,
    pub symbol: String,
    /// Raw supply, 18-decimal fixed point
    pub total_supply: U256,
    pub owner: Address,
    /// Unix seconds
    pub created_at: u64,
}

/// Display-ready projection of a [`TokenRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub token_address: Address,
    pub name: String,
    pub symbol: String,
    pub total_supply: String,
    pub owner: Address,
    pub created_at: String,
}

/// A creation transaction that has been accepted by the wallet but not mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCreation {
    pub id: String,
    pub tx_hash: TxHash,
    pub name: String,
    pub symbol: String,
    /// Whole tokens, as submitted
    pub supply: U256,
    pub submitted_at: DateTime<Utc>,
}

/// Token recovered from a mined creation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedToken {
    pub token_address: Address,
    pub owner: Option<Address>,
    pub name: String,
    pub symbol: String,
    pub supply: U256,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}
