use megamint_wallet_core::WalletError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for the MegaMint client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactoryError {
    // Form and state preconditions
    Validation(ValidationError),

    // Wallet is on the wrong chain and reconciliation did not fix it
    NetworkMismatch(NetworkMismatchError),

    // createToken was not accepted
    Submission(SubmissionError),

    // createToken was accepted but the result could not be recovered
    Confirmation(ConfirmationError),

    // List reads
    Query(QueryError),

    // Configuration errors
    Config(String),
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::Validation(e) => write!(f, "Validation error: {e}"),
            FactoryError::NetworkMismatch(e) => write!(f, "Network mismatch: {e}"),
            FactoryError::Submission(e) => write!(f, "Submission error: {e}"),
            FactoryError::Confirmation(e) => write!(f, "Confirmation error: {e}"),
            FactoryError::Query(e) => write!(f, "Query error: {e}"),
            FactoryError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for FactoryError {}

impl FactoryError {
    /// Message shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            FactoryError::Validation(e) => e.to_string(),
            FactoryError::NetworkMismatch(e) => e.to_string(),
            FactoryError::Submission(SubmissionError::UserRejected) => {
                "Transaction was rejected by user".to_string()
            }
            FactoryError::Submission(e) => format!("Error: {e}"),
            FactoryError::Confirmation(e) => {
                format!("Error: {e}. Please check the logs for details.")
            }
            FactoryError::Query(e) => format!("Failed to load tokens: {e}"),
            FactoryError::Config(msg) => msg.clone(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, FactoryError::Submission(SubmissionError::UserRejected))
    }
}

impl From<ValidationError> for FactoryError {
    fn from(err: ValidationError) -> Self {
        FactoryError::Validation(err)
    }
}

impl From<NetworkMismatchError> for FactoryError {
    fn from(err: NetworkMismatchError) -> Self {
        FactoryError::NetworkMismatch(err)
    }
}

impl From<SubmissionError> for FactoryError {
    fn from(err: SubmissionError) -> Self {
        FactoryError::Submission(err)
    }
}

impl From<ConfirmationError> for FactoryError {
    fn from(err: ConfirmationError) -> Self {
        FactoryError::Confirmation(err)
    }
}

impl From<QueryError> for FactoryError {
    fn from(err: QueryError) -> Self {
        FactoryError::Query(err)
    }
}

impl From<anyhow::Error> for FactoryError {
    fn from(err: anyhow::Error) -> Self {
        FactoryError::Config(err.to_string())
    }
}

// Validation Error Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    NotConnected,
    WrongNetwork(String),
    MissingFields,
    InvalidSupply(String),
    SymbolTooLong { max: usize, actual: usize },
    SubmissionInFlight,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotConnected => write!(f, "Please connect wallet first!"),
            ValidationError::WrongNetwork(chain) => write!(f, "Please switch to {chain}"),
            ValidationError::MissingFields => write!(f, "Please fill all fields!"),
            ValidationError::InvalidSupply(value) => {
                write!(f, "Total supply must be a whole number, got '{value}'")
            }
            ValidationError::SymbolTooLong { max, actual } => {
                write!(f, "Token symbol is {actual} characters, maximum is {max}")
            }
            ValidationError::SubmissionInFlight => {
                write!(f, "A token is already being created, please wait")
            }
        }
    }
}

// Network Mismatch Error Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkMismatchError {
    ChainIdUnavailable(String),
    SwitchFailed { required: u64, reason: String },
    RegistrationFailed { required: u64, reason: String },
    StillMismatched { required: u64, current: u64 },
}

impl fmt::Display for NetworkMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkMismatchError::ChainIdUnavailable(msg) => {
                write!(f, "Failed to check network: {msg}")
            }
            NetworkMismatchError::SwitchFailed { required, reason } => {
                write!(f, "Failed to switch to chain {required}: {reason}")
            }
            NetworkMismatchError::RegistrationFailed { required, reason } => {
                write!(f, "Failed to add chain {required} to the wallet: {reason}")
            }
            NetworkMismatchError::StillMismatched { required, current } => {
                write!(f, "Wallet is on chain {current}, expected {required}")
            }
        }
    }
}

// Submission Error Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionError {
    UserRejected,
    ContractMissing(String),
    Rejected(String),
    Encoding(String),
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::UserRejected => write!(f, "Transaction was rejected by user"),
            SubmissionError::ContractMissing(address) => write!(
                f,
                "Factory contract not found at {address}. The contract may need to be redeployed"
            ),
            SubmissionError::Rejected(msg) => write!(f, "{msg}"),
            SubmissionError::Encoding(msg) => write!(f, "Failed to encode call: {msg}"),
        }
    }
}

impl From<WalletError> for SubmissionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::UserRejected(_) => SubmissionError::UserRejected,
            WalletError::Rpc { message, .. } => SubmissionError::Rejected(message),
            other => SubmissionError::Rejected(other.to_string()),
        }
    }
}

// Confirmation Error Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationError {
    EventMissing(String),
    Reverted(String),
    Timeout { tx_hash: String, waited_secs: u64 },
    Wait(String),
}

impl fmt::Display for ConfirmationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationError::EventMissing(tx) => {
                write!(f, "Transaction {tx} was mined but emitted no TokenCreated event")
            }
            ConfirmationError::Reverted(tx) => write!(f, "Transaction {tx} reverted"),
            ConfirmationError::Timeout { tx_hash, waited_secs } => {
                write!(f, "Transaction {tx_hash} not mined after {waited_secs}s")
            }
            ConfirmationError::Wait(msg) => write!(f, "Failed waiting for confirmation: {msg}"),
        }
    }
}

// Query Error Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryError {
    Rpc(String),
    Decode(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Rpc(msg) => write!(f, "RPC failure: {msg}"),
            QueryError::Decode(msg) => write!(f, "Unexpected response: {msg}"),
        }
    }
}

impl From<WalletError> for QueryError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Decode(msg) => QueryError::Decode(msg),
            other => QueryError::Rpc(other.to_string()),
        }
    }
}
