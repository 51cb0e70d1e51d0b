//! Scoped wallet-event subscriptions
//!
//! A [`WalletSubscription`] owns the receiving end of the event channel and,
//! for polling providers, the task feeding it. Dropping the handle stops the
//! task, so a torn-down view never leaves a listener behind.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::provider::WalletProvider;
use crate::shared::types::WalletEvent;

pub struct WalletSubscription {
    events: mpsc::UnboundedReceiver<WalletEvent>,
    poller: Option<JoinHandle<()>>,
}

impl WalletSubscription {
    pub fn new(events: mpsc::UnboundedReceiver<WalletEvent>, poller: JoinHandle<()>) -> Self {
        Self {
            events,
            poller: Some(poller),
        }
    }

    /// Subscription fed by someone else (push-based providers, tests).
    pub fn detached(events: mpsc::UnboundedReceiver<WalletEvent>) -> Self {
        Self {
            events,
            poller: None,
        }
    }

    /// Next event, or `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<WalletEvent> {
        self.events.recv().await
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().map(|p| !p.is_finished()).unwrap_or(false)
    }
}

impl Drop for WalletSubscription {
    fn drop(&mut self) {
        self.events.close();
        if let Some(poller) = self.poller.take() {
            poller.abort();
            log::debug!("Wallet event poller stopped");
        }
    }
}

/// Spawn a task that polls `eth_chainId` and `eth_accounts` and reports
/// changes. The first successful read only establishes the baseline.
pub fn spawn_poller<W>(wallet: W, interval: Duration) -> WalletSubscription
where
    W: WalletProvider + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let poller = tokio::spawn(async move {
        let mut last_chain: Option<u64> = None;
        let mut last_accounts: Option<Vec<ethers::types::Address>> = None;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }

            match wallet.chain_id().await {
                Ok(chain_id) => {
                    if last_chain.is_some_and(|prev| prev != chain_id)
                        && tx.send(WalletEvent::ChainChanged(chain_id)).is_err()
                    {
                        break;
                    }
                    last_chain = Some(chain_id);
                }
                Err(e) => log::warn!("Wallet chain poll failed: {}", e),
            }

            match wallet.accounts().await {
                Ok(accounts) => {
                    let changed = last_accounts
                        .as_ref()
                        .is_some_and(|prev| *prev != accounts);
                    if changed && tx.send(WalletEvent::AccountsChanged(accounts.clone())).is_err() {
                        break;
                    }
                    last_accounts = Some(accounts);
                }
                Err(e) => log::warn!("Wallet account poll failed: {}", e),
            }
        }
    });

    WalletSubscription::new(rx, poller)
}
