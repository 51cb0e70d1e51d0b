//! Wallet provider boundary
//!
//! [`WalletProvider`] is the set of wallet operations the client consumes:
//! account discovery, chain management, signing and sending contract calls,
//! read-only calls, receipts, asset tracking and change notifications.

pub mod eip1193;
pub mod subscription;

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, TxHash};

use crate::domain::entities::network::ChainConfig;
use crate::domain::entities::token::WatchAssetRequest;
use crate::shared::error::WalletError;

use self::subscription::WalletSubscription;

/// Shared handle to a wallet provider
pub type SharedWallet = Arc<dyn WalletProvider>;

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorised for this client, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Prompt the user for account access.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Ask the wallet to make `chain_id` active. Fails with
    /// [`WalletError::UnrecognizedChain`] when the wallet does not know it.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Register a chain with the wallet.
    async fn add_chain(&self, chain: &ChainConfig) -> Result<(), WalletError>;

    /// Sign and send a transaction; gas fields are passed through untouched.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError>;

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, WalletError>;

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, WalletError>;

    async fn code_at(&self, address: Address) -> Result<Bytes, WalletError>;

    /// Ask the wallet to track a token. Returns whether the user accepted.
    async fn watch_asset(&self, asset: &WatchAssetRequest) -> Result<bool, WalletError>;

    /// Start receiving chain and account change notifications. The
    /// notifications stop when the returned handle is dropped.
    fn subscribe(&self) -> WalletSubscription;
}
