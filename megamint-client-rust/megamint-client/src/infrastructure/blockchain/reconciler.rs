use std::fmt;
use std::time::Duration;

use megamint_wallet_core::{ChainConfig, SharedWallet};
use tracing::{debug, info, warn};

use crate::domain::error::NetworkMismatchError;
use crate::infrastructure::logger::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Wallet was already on the required chain
    AlreadyActive,
    Switched,
    /// Chain had to be added to the wallet before switching
    Registered,
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::AlreadyActive => write!(f, "already_active"),
            ReconcileOutcome::Switched => write!(f, "switched"),
            ReconcileOutcome::Registered => write!(f, "registered"),
        }
    }
}

/// Moves the wallet onto the configured chain, registering it first when
/// the wallet does not know it.
pub struct NetworkReconciler {
    wallet: SharedWallet,
    chain: ChainConfig,
    settle_delay: Duration,
}

impl NetworkReconciler {
    pub fn new(wallet: SharedWallet, chain: ChainConfig, settle_delay: Duration) -> Self {
        Self {
            wallet,
            chain,
            settle_delay,
        }
    }

    pub fn required_chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub async fn current_chain_id(&self) -> Result<u64, NetworkMismatchError> {
        self.wallet
            .chain_id()
            .await
            .map_err(|e| NetworkMismatchError::ChainIdUnavailable(e.to_string()))
    }

    pub async fn is_on_required_chain(&self) -> Result<bool, NetworkMismatchError> {
        Ok(self.current_chain_id().await? == self.chain.chain_id)
    }

    /// Succeeds only once a fresh chain id read matches the required chain.
    pub async fn ensure_chain(&self) -> Result<ReconcileOutcome, NetworkMismatchError> {
        let required = self.chain.chain_id;
        let current = self.current_chain_id().await?;
        if current == required {
            debug!(chain_id = required, "Wallet already on required chain");
            return Ok(ReconcileOutcome::AlreadyActive);
        }

        info!(current, required, chain = %self.chain.chain_name, "Switching wallet network");

        let outcome = match self.wallet.switch_chain(required).await {
            Ok(()) => ReconcileOutcome::Switched,
            Err(e) if e.is_unrecognized_chain() => {
                info!(required, "Chain unknown to wallet, registering it");
                self.wallet.add_chain(&self.chain).await.map_err(|e| {
                    NetworkMismatchError::RegistrationFailed {
                        required,
                        reason: e.to_string(),
                    }
                })?;
                self.wallet.switch_chain(required).await.map_err(|e| {
                    NetworkMismatchError::SwitchFailed {
                        required,
                        reason: e.to_string(),
                    }
                })?;
                ReconcileOutcome::Registered
            }
            Err(e) => {
                return Err(NetworkMismatchError::SwitchFailed {
                    required,
                    reason: e.to_string(),
                })
            }
        };

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let current = self.current_chain_id().await?;
        if current != required {
            warn!(current, required, "Wallet reported a switch but is still on another chain");
            return Err(NetworkMismatchError::StillMismatched { required, current });
        }

        Logger::network_reconciled(required, &outcome.to_string());
        Ok(outcome)
    }
}
