//! Wallet mock shared by unit tests.

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, Bytes, Log, TransactionReceipt, TransactionRequest, TxHash, H256, U256};
use megamint_wallet_core::{
    ChainConfig, WalletError, WalletProvider, WalletSubscription, WatchAssetRequest,
};
use mockall::mock;

use crate::domain::token::TokenRecord;
use crate::infrastructure::blockchain::gateway::factory_abi;

mock! {
    pub Wallet {}

    #[async_trait]
    impl WalletProvider for Wallet {
        async fn accounts(&self) -> Result<Vec<Address>, WalletError>;
        async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;
        async fn chain_id(&self) -> Result<u64, WalletError>;
        async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;
        async fn add_chain(&self, chain: &ChainConfig) -> Result<(), WalletError>;
        async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError>;
        async fn call(&self, tx: TransactionRequest) -> Result<Bytes, WalletError>;
        async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>, WalletError>;
        async fn code_at(&self, address: Address) -> Result<Bytes, WalletError>;
        async fn watch_asset(&self, asset: &WatchAssetRequest) -> Result<bool, WalletError>;
        fn subscribe(&self) -> WalletSubscription;
    }
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn whole_tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

pub fn record(token: u8, owner: u8, symbol: &str) -> TokenRecord {
    TokenRecord {
        token_address: address(token),
        name: format!("{symbol} Token"),
        symbol: symbol.to_string(),
        total_supply: whole_tokens(1_000_000),
        owner: address(owner),
        created_at: 1_700_000_000,
    }
}

/// ABI-encoded return value of `getAllTokens` / `getTokensByOwner`.
pub fn encode_records(records: &[TokenRecord]) -> Bytes {
    let items = records
        .iter()
        .map(|r| {
            Token::Tuple(vec![
                Token::Address(r.token_address),
                Token::String(r.name.clone()),
                Token::String(r.symbol.clone()),
                Token::Uint(r.total_supply),
                Token::Address(r.owner),
                Token::Uint(U256::from(r.created_at)),
            ])
        })
        .collect();
    Bytes::from(ethers::abi::encode(&[Token::Array(items)]))
}

pub fn token_created_log(factory: Address, token: Address, owner: Address) -> Log {
    let event = factory_abi().unwrap().event("TokenCreated").unwrap().signature();
    Log {
        address: factory,
        topics: vec![event, H256::from(token), H256::from(owner)],
        data: Bytes::from(ethers::abi::encode(&[
            Token::String("Mega".to_string()),
            Token::String("MEGA".to_string()),
            Token::Uint(whole_tokens(1_000)),
        ])),
        ..Default::default()
    }
}

pub fn receipt(status: u64, logs: Vec<Log>) -> TransactionReceipt {
    TransactionReceipt {
        status: Some(status.into()),
        block_number: Some(42u64.into()),
        logs,
        ..Default::default()
    }
}
