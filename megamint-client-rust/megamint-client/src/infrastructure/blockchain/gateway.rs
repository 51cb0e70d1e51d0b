use std::time::{Duration, Instant};

use chrono::Utc;
use ethers::abi::{Abi, RawLog, Token};
use ethers::types::{Address, TransactionReceipt, TransactionRequest, U256};
use megamint_wallet_core::{SharedWallet, WalletError, WatchAssetRequest};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::error::{
    ConfirmationError, FactoryError, QueryError, SubmissionError, ValidationError,
};
use crate::domain::token::{CreatedToken, PendingCreation, TokenRecord};
use crate::infrastructure::config::{AppConfig, GasPolicy};
use crate::infrastructure::logger::Logger;

const CREATE_TOKEN: &str = "createToken";
const GET_TOKENS_BY_OWNER: &str = "getTokensByOwner";
const GET_ALL_TOKENS: &str = "getAllTokens";
const TOKEN_CREATED: &str = "TokenCreated";

/// ABI of the deployed factory contract.
pub fn factory_abi() -> Result<Abi, serde_json::Error> {
    let abi_bytes = include_bytes!("../../../abi/TokenFactory.json");
    serde_json::from_slice(abi_bytes)
}

/// Parses a whole-token supply as typed into the form.
pub fn parse_supply(input: &str) -> Result<U256, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidSupply(input.to_string()));
    }
    U256::from_dec_str(trimmed).map_err(|_| ValidationError::InvalidSupply(input.to_string()))
}

/// Calls and queries against the token factory, routed through the wallet.
pub struct FactoryGateway {
    wallet: SharedWallet,
    factory: Address,
    abi: Abi,
    gas: GasPolicy,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl FactoryGateway {
    pub fn new(wallet: SharedWallet, factory: Address, gas: GasPolicy) -> Result<Self, FactoryError> {
        let abi = factory_abi()
            .map_err(|e| FactoryError::Config(format!("Invalid factory ABI: {e}")))?;
        Ok(Self {
            wallet,
            factory,
            abi,
            gas,
            poll_interval: Duration::from_secs(1),
            timeout: None,
        })
    }

    pub fn from_config(wallet: SharedWallet, config: &AppConfig) -> Result<Self, FactoryError> {
        let factory = config.factory_address()?;
        Ok(Self::new(wallet, factory, config.gas)?
            .with_confirmation(config.confirmation_poll_interval(), config.confirmation_timeout()))
    }

    pub fn with_confirmation(mut self, poll_interval: Duration, timeout: Option<Duration>) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }

    pub fn factory_address(&self) -> Address {
        self.factory
    }

    /// Submits `createToken` from `from`. `supply` is in whole tokens.
    pub async fn create_token(
        &self,
        from: Address,
        name: &str,
        symbol: &str,
        supply: &str,
    ) -> Result<PendingCreation, FactoryError> {
        let name = name.trim();
        let symbol = symbol.trim();
        if name.is_empty() || symbol.is_empty() || supply.trim().is_empty() {
            return Err(ValidationError::MissingFields.into());
        }
        let supply = parse_supply(supply)?;

        let function = self
            .abi
            .function(CREATE_TOKEN)
            .map_err(|e| SubmissionError::Encoding(e.to_string()))?;
        let data = function
            .encode_input(&[
                Token::String(name.to_string()),
                Token::String(symbol.to_string()),
                Token::Uint(supply),
            ])
            .map_err(|e| SubmissionError::Encoding(e.to_string()))?;

        let code = self
            .wallet
            .code_at(self.factory)
            .await
            .map_err(SubmissionError::from)?;
        if code.is_empty() {
            warn!(factory = ?self.factory, "No contract code at factory address");
            return Err(SubmissionError::ContractMissing(format!("{:?}", self.factory)).into());
        }

        let tx = self.gas.apply(
            TransactionRequest::new()
                .from(from)
                .to(self.factory)
                .data(data),
        );

        let tx_hash = match self.wallet.send_transaction(tx).await {
            Ok(hash) => hash,
            Err(e) => {
                Logger::submission_failed(symbol, &e.to_string());
                return Err(SubmissionError::from(e).into());
            }
        };
        Logger::transaction_submitted(tx_hash, from, symbol);

        Ok(PendingCreation {
            id: Uuid::new_v4().to_string(),
            tx_hash,
            name: name.to_string(),
            symbol: symbol.to_string(),
            supply,
            submitted_at: Utc::now(),
        })
    }

    /// Polls for the receipt until mined, or until the configured timeout.
    /// Failed polls are retried; only an undecodable receipt ends the wait early.
    pub async fn await_confirmation(
        &self,
        pending: &PendingCreation,
    ) -> Result<CreatedToken, ConfirmationError> {
        let started = Instant::now();
        loop {
            match self.wallet.transaction_receipt(pending.tx_hash).await {
                Ok(Some(receipt)) => {
                    let result = self.extract_created_token(pending, &receipt);
                    match &result {
                        Ok(token) => {
                            Logger::token_created(token.tx_hash, token.token_address, token.block_number)
                        }
                        Err(e) => Logger::confirmation_failed(pending.tx_hash, &e.to_string()),
                    }
                    return result;
                }
                Ok(None) => debug!(tx_hash = ?pending.tx_hash, "Transaction not mined yet"),
                Err(e @ WalletError::Decode(_)) => {
                    Logger::confirmation_failed(pending.tx_hash, &e.to_string());
                    return Err(ConfirmationError::Wait(e.to_string()));
                }
                // The transaction may still be pending; keep polling.
                Err(e) => warn!(tx_hash = ?pending.tx_hash, error = %e, "Receipt poll failed"),
            }

            if let Some(timeout) = self.timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(ConfirmationError::Timeout {
                        tx_hash: format!("{:?}", pending.tx_hash),
                        waited_secs: waited.as_secs(),
                    });
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Recovers the new token from the factory's `TokenCreated` log.
    pub fn extract_created_token(
        &self,
        pending: &PendingCreation,
        receipt: &TransactionReceipt,
    ) -> Result<CreatedToken, ConfirmationError> {
        let tx_label = format!("{:?}", pending.tx_hash);
        if receipt.status == Some(0u64.into()) {
            return Err(ConfirmationError::Reverted(tx_label));
        }

        let event = self
            .abi
            .event(TOKEN_CREATED)
            .map_err(|e| ConfirmationError::Wait(e.to_string()))?;
        let signature = event.signature();

        let log = receipt
            .logs
            .iter()
            .find(|log| log.address == self.factory && log.topics.first() == Some(&signature))
            .ok_or_else(|| ConfirmationError::EventMissing(tx_label.clone()))?;

        let parsed = event
            .parse_log(RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            })
            .map_err(|e| {
                warn!(tx_hash = %tx_label, error = %e, "Undecodable TokenCreated log");
                ConfirmationError::EventMissing(tx_label.clone())
            })?;

        let param = |name: &str| {
            parsed
                .params
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.value.clone())
        };

        let token_address = param("tokenAddress")
            .and_then(Token::into_address)
            .ok_or_else(|| ConfirmationError::EventMissing(tx_label.clone()))?;

        Ok(CreatedToken {
            token_address,
            owner: param("owner").and_then(Token::into_address),
            name: param("name")
                .and_then(Token::into_string)
                .unwrap_or_else(|| pending.name.clone()),
            symbol: param("symbol")
                .and_then(Token::into_string)
                .unwrap_or_else(|| pending.symbol.clone()),
            supply: pending.supply,
            tx_hash: pending.tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
        })
    }

    pub async fn list_tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenRecord>, QueryError> {
        self.query_tokens(GET_TOKENS_BY_OWNER, &[Token::Address(owner)]).await
    }

    pub async fn list_all_tokens(&self) -> Result<Vec<TokenRecord>, QueryError> {
        self.query_tokens(GET_ALL_TOKENS, &[]).await
    }

    /// Asks the wallet to track the token; `Ok(false)` when the user declines.
    pub async fn watch_asset(&self, token: Address, symbol: &str) -> Result<bool, WalletError> {
        self.wallet
            .watch_asset(&WatchAssetRequest::erc20(token, symbol))
            .await
    }

    async fn query_tokens(&self, name: &str, args: &[Token]) -> Result<Vec<TokenRecord>, QueryError> {
        let function = self
            .abi
            .function(name)
            .map_err(|e| QueryError::Decode(e.to_string()))?;
        let data = function
            .encode_input(args)
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        let output = self
            .wallet
            .call(TransactionRequest::new().to(self.factory).data(data))
            .await?;
        if output.is_empty() {
            return Err(QueryError::Decode(format!(
                "{name} returned no data, is the factory deployed at {:?}?",
                self.factory
            )));
        }

        let decoded = function
            .decode_output(&output)
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        match decoded.into_iter().next() {
            Some(Token::Array(items)) => items.into_iter().map(decode_record).collect(),
            other => Err(QueryError::Decode(format!("{name}: expected array, got {other:?}"))),
        }
    }
}

fn decode_record(token: Token) -> Result<TokenRecord, QueryError> {
    let fields = match token {
        Token::Tuple(fields) if fields.len() == 6 => fields,
        other => return Err(QueryError::Decode(format!("Invalid token tuple: {other:?}"))),
    };

    let mut fields = fields.into_iter();
    let mut next = |what: &str| {
        fields
            .next()
            .ok_or_else(|| QueryError::Decode(format!("Missing {what}")))
    };

    let token_address = next("tokenAddress")?
        .into_address()
        .ok_or_else(|| QueryError::Decode("Invalid tokenAddress".into()))?;
    let name = next("name")?
        .into_string()
        .ok_or_else(|| QueryError::Decode("Invalid name".into()))?;
    let symbol = next("symbol")?
        .into_string()
        .ok_or_else(|| QueryError::Decode("Invalid symbol".into()))?;
    let total_supply = next("totalSupply")?
        .into_uint()
        .ok_or_else(|| QueryError::Decode("Invalid totalSupply".into()))?;
    let owner = next("owner")?
        .into_address()
        .ok_or_else(|| QueryError::Decode("Invalid owner".into()))?;
    let created_at = next("createdAt")?
        .into_uint()
        .ok_or_else(|| QueryError::Decode("Invalid createdAt".into()))?;
    if created_at > U256::from(u64::MAX) {
        return Err(QueryError::Decode(format!("createdAt out of range: {created_at}")));
    }

    Ok(TokenRecord {
        token_address,
        name,
        symbol,
        total_supply,
        owner,
        created_at: created_at.as_u64(),
    })
}
