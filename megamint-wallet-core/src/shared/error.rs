//! Error handling for the wallet core
//!
//! Wallet RPC failures are classified by their EIP-1193 code so callers can
//! tell a user rejection or an unknown chain apart from a transport problem.

use ethers::providers::{ProviderError, RpcError};
use thiserror::Error;

use crate::shared::constants::{UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE};

/// Wallet error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet provider unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    #[error("Chain is not registered in the wallet: {0}")]
    UnrecognizedChain(String),

    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decoding error: {0}")]
    Decode(String),
}

impl WalletError {
    /// Create an unavailable-provider error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a decoding error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Classify a JSON-RPC error object returned by the wallet
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED_CODE => Self::UserRejected(message),
            UNRECOGNIZED_CHAIN_CODE => Self::UnrecognizedChain(message),
            _ => Self::Rpc { code, message },
        }
    }

    /// EIP-1193 code carried by this error, if any
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::UserRejected(_) => Some(USER_REJECTED_CODE),
            Self::UnrecognizedChain(_) => Some(UNRECOGNIZED_CHAIN_CODE),
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected(_))
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        matches!(self, Self::UnrecognizedChain(_))
    }
}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        if let Some(response) = err.as_error_response() {
            return Self::from_rpc(response.code, response.message.clone());
        }
        if let Some(serde_err) = err.as_serde_error() {
            return Self::decode(serde_err.to_string());
        }
        Self::transport(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(format!("JSON error: {}", err))
    }
}
