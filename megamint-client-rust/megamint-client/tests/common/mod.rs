#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{
    Address, Bytes, Log, TransactionReceipt, TransactionRequest, TxHash, H256, U256,
};
use megamint_client::app::controller::ViewController;
use megamint_client::domain::token::TokenRecord;
use megamint_client::infrastructure::blockchain::gateway::factory_abi;
use megamint_client::infrastructure::config::AppConfig;
use megamint_wallet_core::{
    ChainConfig, SharedWallet, WalletError, WalletProvider, WalletSubscription, WatchAssetRequest,
};
use tokio::sync::{mpsc, Notify};

pub const TIMOTHY: u64 = 6343;
pub const OTHER_CHAIN: u64 = 1;

pub fn factory() -> Address {
    Address::repeat_byte(0xfa)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        factory_address: format!("{:?}", factory()),
        settle_delay_ms: 0,
        confirmation_poll_ms: 5,
        ..AppConfig::default()
    }
}

pub fn controller(wallet: &FakeWallet) -> Arc<ViewController> {
    controller_with(wallet, test_config())
}

pub fn controller_with(wallet: &FakeWallet, config: AppConfig) -> Arc<ViewController> {
    let shared: SharedWallet = Arc::new(wallet.clone());
    Arc::new(ViewController::from_config(shared, &config).unwrap())
}

pub fn record(token: u8, owner: Address, symbol: &str) -> TokenRecord {
    TokenRecord {
        token_address: Address::repeat_byte(token),
        name: format!("{symbol} Token"),
        symbol: symbol.to_string(),
        total_supply: U256::from(1_000u64) * U256::exp10(18),
        owner,
        created_at: 1_700_000_000,
    }
}

#[derive(Default)]
pub struct FakeState {
    pub chain_id: u64,
    pub authorised: Vec<Address>,
    pub approval: Option<Result<Vec<Address>, WalletError>>,
    pub known_chains: HashSet<u64>,
    pub reject_switch: bool,
    pub ignore_switch: bool,
    pub reject_add: bool,
    pub reject_send: Option<WalletError>,
    pub hold_sends: bool,
    pub fail_queries: bool,
    pub code: Bytes,
    pub tokens: Vec<TokenRecord>,
    /// Returned by getTokensByOwner on top of the real matches.
    pub extra_owned: Vec<TokenRecord>,
    pub receipts: HashMap<TxHash, TransactionReceipt>,
    pub sent: Vec<TransactionRequest>,
    pub send_attempts: usize,
    pub switch_requests: Vec<u64>,
    pub added_chains: Vec<u64>,
    pub watched: Vec<WatchAssetRequest>,
    pub next_token: u8,
}

/// Scriptable in-memory wallet backed by a fake factory contract.
#[derive(Clone)]
pub struct FakeWallet {
    state: Arc<Mutex<FakeState>>,
    release: Arc<Notify>,
}

impl FakeWallet {
    pub fn new(chain_id: u64, authorised: Vec<Address>) -> Self {
        let state = FakeState {
            chain_id,
            authorised,
            known_chains: [chain_id, TIMOTHY, OTHER_CHAIN].into_iter().collect(),
            code: Bytes::from(vec![0x60, 0x80, 0x60, 0x40]),
            next_token: 0x10,
            ..FakeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn forget_chain(&self, chain_id: u64) -> &Self {
        self.state().known_chains.remove(&chain_id);
        self
    }

    pub fn release_sends(&self) {
        self.state().hold_sends = false;
        self.release.notify_waiters();
        self.release.notify_one();
    }

    /// Waits until `count` sends have reached the wallet.
    pub async fn wait_for_send_attempts(&self, count: usize) {
        for _ in 0..400 {
            if self.state().send_attempts >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("wallet never saw {count} send(s)");
    }

    fn mine_creation(&self, tx: &TransactionRequest) -> Result<TxHash, WalletError> {
        let data = tx
            .data
            .as_ref()
            .ok_or_else(|| WalletError::decode("missing calldata"))?;
        let abi = factory_abi().map_err(|e| WalletError::decode(e.to_string()))?;
        let function = abi
            .function("createToken")
            .map_err(|e| WalletError::decode(e.to_string()))?;
        let args = function
            .decode_input(&data[4..])
            .map_err(|e| WalletError::decode(e.to_string()))?;
        let (name, symbol, supply) = match args.as_slice() {
            [Token::String(name), Token::String(symbol), Token::Uint(supply)] => {
                (name.clone(), symbol.clone(), *supply)
            }
            other => return Err(WalletError::decode(format!("unexpected args {other:?}"))),
        };
        let owner = tx.from.unwrap_or_default();

        let mut state = self.state();
        state.next_token += 1;
        let token_address = Address::repeat_byte(state.next_token);
        let tx_hash = TxHash::repeat_byte(state.next_token);
        let scaled = supply * U256::exp10(18);
        let created_at = 1_700_000_000 + state.tokens.len() as u64;

        state.tokens.push(TokenRecord {
            token_address,
            name: name.clone(),
            symbol: symbol.clone(),
            total_supply: scaled,
            owner,
            created_at,
        });

        let event = abi.event("TokenCreated").map_err(|e| WalletError::decode(e.to_string()))?;
        let log = Log {
            address: factory(),
            topics: vec![event.signature(), H256::from(token_address), H256::from(owner)],
            data: Bytes::from(ethers::abi::encode(&[
                Token::String(name),
                Token::String(symbol),
                Token::Uint(scaled),
            ])),
            ..Default::default()
        };
        state.receipts.insert(
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                status: Some(1u64.into()),
                block_number: Some(7u64.into()),
                logs: vec![log],
                ..Default::default()
            },
        );
        state.sent.push(tx.clone());
        Ok(tx_hash)
    }

    fn answer_query(&self, data: &[u8]) -> Result<Bytes, WalletError> {
        let abi = factory_abi().map_err(|e| WalletError::decode(e.to_string()))?;
        let state = self.state();
        if state.fail_queries {
            return Err(WalletError::transport("connection refused"));
        }

        let by_owner = abi
            .function("getTokensByOwner")
            .map_err(|e| WalletError::decode(e.to_string()))?;
        let records: Vec<TokenRecord> = if data[..4] == by_owner.short_signature()[..] {
            let owner = match by_owner.decode_input(&data[4..]).ok().and_then(|t| t.into_iter().next()) {
                Some(Token::Address(owner)) => owner,
                _ => return Err(WalletError::decode("bad owner argument")),
            };
            state
                .tokens
                .iter()
                .filter(|r| r.owner == owner)
                .chain(state.extra_owned.iter())
                .cloned()
                .collect()
        } else {
            state.tokens.clone()
        };

        let items = records
            .into_iter()
            .map(|r| {
                Token::Tuple(vec![
                    Token::Address(r.token_address),
                    Token::String(r.name),
                    Token::String(r.symbol),
                    Token::Uint(r.total_supply),
                    Token::Address(r.owner),
                    Token::Uint(U256::from(r.created_at)),
                ])
            })
            .collect();
        Ok(Bytes::from(ethers::abi::encode(&[Token::Array(items)])))
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.state().authorised.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let mut state = self.state();
        match state.approval.clone() {
            Some(Ok(accounts)) => {
                state.authorised = accounts.clone();
                Ok(accounts)
            }
            Some(Err(e)) => Err(e),
            None => Ok(state.authorised.clone()),
        }
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.state().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut state = self.state();
        state.switch_requests.push(chain_id);
        if state.reject_switch {
            return Err(WalletError::from_rpc(4001, "User rejected the request."));
        }
        if !state.known_chains.contains(&chain_id) {
            return Err(WalletError::from_rpc(4902, "Unrecognized chain ID"));
        }
        if !state.ignore_switch {
            state.chain_id = chain_id;
        }
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainConfig) -> Result<(), WalletError> {
        let mut state = self.state();
        state.added_chains.push(chain.chain_id);
        if state.reject_add {
            return Err(WalletError::from_rpc(4001, "User rejected the request."));
        }
        state.known_chains.insert(chain.chain_id);
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let (hold, rejection) = {
            let mut state = self.state();
            state.send_attempts += 1;
            (state.hold_sends, state.reject_send.clone())
        };
        if hold {
            self.release.notified().await;
        }
        if let Some(e) = rejection {
            return Err(e);
        }
        self.mine_creation(&tx)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, WalletError> {
        let data = tx.data.unwrap_or_default();
        if data.len() < 4 {
            return Err(WalletError::decode("calldata too short"));
        }
        self.answer_query(&data)
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        Ok(self.state().receipts.get(&hash).cloned())
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, WalletError> {
        if address == factory() {
            Ok(self.state().code.clone())
        } else {
            Ok(Bytes::new())
        }
    }

    async fn watch_asset(&self, asset: &WatchAssetRequest) -> Result<bool, WalletError> {
        self.state().watched.push(asset.clone());
        Ok(true)
    }

    fn subscribe(&self) -> WalletSubscription {
        let (_tx, rx) = mpsc::unbounded_channel();
        WalletSubscription::detached(rx)
    }
}
