//! EIP-1193 wallet adapter
//!
//! Speaks the wallet JSON-RPC method set over HTTP, e.g. to a wallet bridge
//! or a dev node with unlocked accounts. Errors keep their EIP-1193 codes.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use ethers::providers::{Http, Provider};
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, TxHash, U256};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::core::provider::subscription::{spawn_poller, WalletSubscription};
use crate::core::provider::WalletProvider;
use crate::domain::entities::network::ChainConfig;
use crate::domain::entities::token::WatchAssetRequest;
use crate::shared::constants::*;
use crate::shared::error::WalletError;

#[derive(Clone, Debug)]
pub struct Eip1193Wallet {
    provider: Provider<Http>,
    poll_interval: Duration,
}

impl Eip1193Wallet {
    pub fn new(rpc_url: &str) -> Result<Self, WalletError> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
            WalletError::unavailable(format!("Invalid wallet RPC URL '{}': {}", rpc_url, e))
        })?;

        Ok(Self {
            provider,
            poll_interval: Duration::from_millis(DEFAULT_EVENT_POLL_INTERVAL_MS),
        })
    }

    /// How often the event subscription polls chain id and accounts.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(MIN_EVENT_POLL_INTERVAL_MS));
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, WalletError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        log::trace!("wallet request: {}", method);
        self.provider
            .request(method, params)
            .await
            .map_err(WalletError::from)
    }
}

#[async_trait]
impl WalletProvider for Eip1193Wallet {
    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request(METHOD_ACCOUNTS, ()).await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request(METHOD_REQUEST_ACCOUNTS, ()).await
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let chain_id: U256 = self.request(METHOD_CHAIN_ID, ()).await?;
        if chain_id > U256::from(u64::MAX) {
            return Err(WalletError::decode(format!("chain id {} out of range", chain_id)));
        }
        Ok(chain_id.as_u64())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let params = [json!({ "chainId": format!("0x{:x}", chain_id) })];
        let _: serde_json::Value = self.request(METHOD_SWITCH_CHAIN, params).await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainConfig) -> Result<(), WalletError> {
        let params = [serde_json::to_value(chain.add_chain_parameter())?];
        let _: serde_json::Value = self.request(METHOD_ADD_CHAIN, params).await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        self.request(METHOD_SEND_TRANSACTION, [tx]).await
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, WalletError> {
        self.request(METHOD_CALL, (tx, "latest")).await
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        self.request(METHOD_GET_RECEIPT, [hash]).await
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, WalletError> {
        self.request(METHOD_GET_CODE, (address, "latest")).await
    }

    async fn watch_asset(&self, asset: &WatchAssetRequest) -> Result<bool, WalletError> {
        self.request(METHOD_WATCH_ASSET, asset.to_params()).await
    }

    fn subscribe(&self) -> WalletSubscription {
        spawn_poller(self.clone(), self.poll_interval)
    }
}
