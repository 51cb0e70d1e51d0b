//! MegaMint Wallet Core
//!
//! The wallet side of MegaMint: everything the client needs from an injected
//! wallet, expressed as the [`WalletProvider`] trait.
//!
//! ## Architecture
//!
//! - **Core**: the provider trait, the EIP-1193 JSON-RPC adapter and the
//!   scoped wallet-event subscription
//! - **Domain**: chain and asset entities
//! - **Shared**: error codes, constants and event types
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use megamint_wallet_core::{ChainConfig, Eip1193Wallet, WalletProvider};
//!
//! # async fn run() -> Result<(), megamint_wallet_core::WalletError> {
//! let wallet = Arc::new(Eip1193Wallet::new("http://127.0.0.1:8545")?);
//! let chain = ChainConfig::megaeth_timothy();
//!
//! if wallet.chain_id().await? != chain.chain_id {
//!     wallet.switch_chain(chain.chain_id).await?;
//! }
//! let accounts = wallet.request_accounts().await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod shared;

pub use crate::core::provider::eip1193::Eip1193Wallet;
pub use crate::core::provider::subscription::WalletSubscription;
pub use crate::core::provider::{SharedWallet, WalletProvider};

pub use crate::domain::entities::network::{ChainConfig, NativeCurrency};
pub use crate::domain::entities::token::WatchAssetRequest;

pub use shared::error::WalletError;
pub use shared::types::WalletEvent;
