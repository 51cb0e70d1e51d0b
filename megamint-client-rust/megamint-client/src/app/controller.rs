use std::sync::atomic::{AtomicBool, Ordering};

use ethers::types::Address;
use megamint_wallet_core::{SharedWallet, WalletEvent};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::app::projector::{owned_subset, project_all};
use crate::domain::error::{FactoryError, QueryError, ValidationError};
use crate::domain::token::{CreatedToken, TokenInfo};
use crate::infrastructure::blockchain::gateway::{parse_supply, FactoryGateway};
use crate::infrastructure::blockchain::reconciler::NetworkReconciler;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::logger::Logger;

pub const MAX_SYMBOL_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkStatus {
    WrongNetwork,
    CorrectNetwork,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected {
        account: Address,
        network: NetworkStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Token creation form. The symbol is kept upper-case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenForm {
    pub name: String,
    pub symbol: String,
    pub supply: String,
}

impl TokenForm {
    pub fn new(name: impl Into<String>, symbol: &str, supply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.to_uppercase(),
            supply: supply.into(),
        }
    }

    pub fn set_symbol(&mut self, symbol: &str) {
        self.symbol = symbol.to_uppercase();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() || self.supply.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        let symbol_len = self.symbol.trim().chars().count();
        if symbol_len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                max: MAX_SYMBOL_LEN,
                actual: symbol_len,
            });
        }
        parse_supply(&self.supply)?;
        Ok(())
    }
}

/// Everything the front-end renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub connection: ConnectionState,
    pub chain_id: Option<u64>,
    pub required_chain_id: u64,
    pub form: TokenForm,
    pub creating: bool,
    pub my_tokens: Vec<TokenInfo>,
    pub all_tokens: Vec<TokenInfo>,
    pub notice: Option<Notice>,
    pub last_created: Option<CreatedToken>,
}

impl ViewModel {
    pub fn new(required_chain_id: u64) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            chain_id: None,
            required_chain_id,
            form: TokenForm::default(),
            creating: false,
            my_tokens: Vec::new(),
            all_tokens: Vec::new(),
            notice: None,
            last_created: None,
        }
    }

    pub fn account(&self) -> Option<Address> {
        match self.connection {
            ConnectionState::Connected { account, .. } => Some(account),
            _ => None,
        }
    }

    pub fn is_on_correct_network(&self) -> bool {
        matches!(
            self.connection,
            ConnectionState::Connected { network: NetworkStatus::CorrectNetwork, .. }
        )
    }

    /// Whether the create action should be enabled.
    pub fn can_create(&self) -> bool {
        self.is_on_correct_network() && !self.creating
    }

    fn disconnect(&mut self) {
        self.connection = ConnectionState::Disconnected;
        self.my_tokens.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerPolicy {
    /// Move the wallet onto the required chain when it is found elsewhere, on
    /// load or after a chain change.
    pub auto_reconcile_on_chain_change: bool,
}

impl Default for ControllerPolicy {
    fn default() -> Self {
        Self {
            auto_reconcile_on_chain_change: true,
        }
    }
}

/// Holds the in-flight flag for one submission and releases it on drop.
struct SubmissionGuard<'a> {
    flag: &'a AtomicBool,
    view: &'a watch::Sender<ViewModel>,
}

impl<'a> SubmissionGuard<'a> {
    fn acquire(flag: &'a AtomicBool, view: &'a watch::Sender<ViewModel>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, view })
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.view.send_if_modified(|v| std::mem::replace(&mut v.creating, false));
    }
}

/// Drives wallet connection, network reconciliation, token creation and
/// list reloads, publishing every state change as one [`ViewModel`] update.
pub struct ViewController {
    wallet: SharedWallet,
    reconciler: NetworkReconciler,
    gateway: FactoryGateway,
    policy: ControllerPolicy,
    view: watch::Sender<ViewModel>,
    in_flight: AtomicBool,
}

impl ViewController {
    pub fn new(
        wallet: SharedWallet,
        reconciler: NetworkReconciler,
        gateway: FactoryGateway,
        policy: ControllerPolicy,
    ) -> Self {
        let (view, _) = watch::channel(ViewModel::new(reconciler.required_chain().chain_id));
        Self {
            wallet,
            reconciler,
            gateway,
            policy,
            view,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn from_config(wallet: SharedWallet, config: &AppConfig) -> Result<Self, FactoryError> {
        let gateway = FactoryGateway::from_config(wallet.clone(), config)?;
        let reconciler =
            NetworkReconciler::new(wallet.clone(), config.chain.clone(), config.settle_delay());
        let policy = ControllerPolicy {
            auto_reconcile_on_chain_change: config.auto_reconcile_on_chain_change,
        };
        Ok(Self::new(wallet, reconciler, gateway, policy))
    }

    pub fn subscribe_view(&self) -> watch::Receiver<ViewModel> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> ViewModel {
        self.view.borrow().clone()
    }

    pub fn policy(&self) -> ControllerPolicy {
        self.policy
    }

    pub fn set_form(&self, form: TokenForm) {
        self.view.send_modify(|v| v.form = form);
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut TokenForm)) {
        self.view.send_modify(|v| edit(&mut v.form));
    }

    pub fn dismiss_notice(&self) {
        self.view.send_if_modified(|v| v.notice.take().is_some());
    }

    fn required_chain_id(&self) -> u64 {
        self.reconciler.required_chain().chain_id
    }

    fn network_status(&self, chain_id: Option<u64>) -> NetworkStatus {
        if chain_id == Some(self.required_chain_id()) {
            NetworkStatus::CorrectNetwork
        } else {
            NetworkStatus::WrongNetwork
        }
    }

    async fn read_chain_id(&self) -> Option<u64> {
        match self.wallet.chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Failed to read wallet chain id");
                None
            }
        }
    }

    /// Silent account discovery on start-up. An authorised account on another
    /// chain is moved onto the required one when auto-reconcile is on.
    pub async fn load(&self) -> ConnectionState {
        self.discover(self.policy.auto_reconcile_on_chain_change).await
    }

    async fn discover(&self, reconcile: bool) -> ConnectionState {
        let account = match self.wallet.accounts().await {
            Ok(accounts) => accounts.first().copied(),
            Err(e) => {
                error!(error = %e, "Error initializing wallet");
                None
            }
        };
        let mut chain_id = self.read_chain_id().await;
        let mut notice = None;

        let connection = match account {
            Some(account) => {
                let mut network = self.network_status(chain_id);
                if network == NetworkStatus::WrongNetwork && reconcile {
                    match self.reconciler.ensure_chain().await {
                        Ok(outcome) => {
                            info!(%outcome, from = ?chain_id, "Moved wallet onto required chain");
                            network = NetworkStatus::CorrectNetwork;
                            chain_id = Some(self.required_chain_id());
                        }
                        Err(e) => {
                            warn!(error = %e, "Network reconciliation failed on load");
                            chain_id = self.read_chain_id().await;
                        }
                    }
                }
                if network == NetworkStatus::WrongNetwork {
                    let chain_name = self.reconciler.required_chain().chain_name.clone();
                    notice = Some(Notice::warning(
                        ValidationError::WrongNetwork(chain_name).to_string(),
                    ));
                }
                ConnectionState::Connected { account, network }
            }
            None => ConnectionState::Disconnected,
        };

        self.view.send_modify(|v| {
            v.chain_id = chain_id;
            if connection == ConnectionState::Disconnected {
                v.disconnect();
            } else {
                v.connection = connection;
            }
            if notice.is_some() {
                v.notice = notice;
            }
        });
        info!(?connection, ?chain_id, "Wallet state loaded");

        self.reload_after_change().await;
        connection
    }

    /// Requests account access, then moves the wallet onto the required chain.
    pub async fn connect(&self) -> ConnectionState {
        self.view.send_modify(|v| {
            v.connection = ConnectionState::Connecting;
            v.notice = None;
        });

        let account = match self.wallet.request_accounts().await {
            Ok(accounts) => accounts.first().copied(),
            Err(e) => {
                let message = if e.is_user_rejection() {
                    "Wallet connection was rejected".to_string()
                } else {
                    format!("Error connecting wallet: {e}")
                };
                warn!(error = %e, "Wallet connection failed");
                self.view.send_modify(|v| {
                    v.disconnect();
                    v.notice = Some(Notice::error(message));
                });
                return ConnectionState::Disconnected;
            }
        };

        let Some(account) = account else {
            self.view.send_modify(|v| {
                v.disconnect();
                v.notice = Some(Notice::error(ValidationError::NotConnected.to_string()));
            });
            return ConnectionState::Disconnected;
        };

        let (network, chain_id, notice) = match self.reconciler.ensure_chain().await {
            Ok(outcome) => {
                debug!(%outcome, "Network ready");
                (NetworkStatus::CorrectNetwork, Some(self.required_chain_id()), None)
            }
            Err(e) => {
                warn!(error = %e, "Network reconciliation failed on connect");
                let chain_name = self.reconciler.required_chain().chain_name.clone();
                let notice = Notice::warning(format!("{e}. Please add {chain_name} to your wallet"));
                (NetworkStatus::WrongNetwork, self.read_chain_id().await, Some(notice))
            }
        };

        let connection = ConnectionState::Connected { account, network };
        self.view.send_modify(|v| {
            v.connection = connection;
            v.chain_id = chain_id;
            v.notice = notice;
        });
        info!(account = ?account, ?network, "Wallet connected");

        self.reload_after_change().await;
        connection
    }

    /// Applies a wallet notification.
    pub async fn handle_event(&self, event: WalletEvent) -> ConnectionState {
        Logger::wallet_event(event.name());
        match event {
            WalletEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            WalletEvent::ChainChanged(chain_id) => self.on_chain_changed(chain_id).await,
        }
    }

    async fn on_accounts_changed(&self, accounts: Vec<Address>) -> ConnectionState {
        let Some(account) = accounts.first().copied() else {
            self.view.send_modify(|v| v.disconnect());
            info!("Wallet disconnected");
            return ConnectionState::Disconnected;
        };

        let known = self.view.borrow().chain_id;
        let chain_id = match known {
            Some(id) => Some(id),
            None => self.read_chain_id().await,
        };
        let connection = ConnectionState::Connected {
            account,
            network: self.network_status(chain_id),
        };
        self.view.send_modify(|v| {
            v.connection = connection;
            v.chain_id = chain_id;
        });

        self.reload_after_change().await;
        connection
    }

    async fn on_chain_changed(&self, chain_id: u64) -> ConnectionState {
        let current = self.view.borrow().connection;
        let ConnectionState::Connected { account, .. } = current else {
            self.view.send_modify(|v| v.chain_id = Some(chain_id));
            return current;
        };

        if chain_id == self.required_chain_id() {
            let connection = ConnectionState::Connected {
                account,
                network: NetworkStatus::CorrectNetwork,
            };
            self.view.send_modify(|v| {
                v.connection = connection;
                v.chain_id = Some(chain_id);
                v.notice = None;
            });
            self.reload_after_change().await;
            return connection;
        }

        if !self.policy.auto_reconcile_on_chain_change {
            let chain_name = self.reconciler.required_chain().chain_name.clone();
            let connection = ConnectionState::Connected {
                account,
                network: NetworkStatus::WrongNetwork,
            };
            self.view.send_modify(|v| {
                v.connection = connection;
                v.chain_id = Some(chain_id);
                v.notice = Some(Notice::warning(
                    ValidationError::WrongNetwork(chain_name).to_string(),
                ));
            });
            return connection;
        }

        match self.reconciler.ensure_chain().await {
            Ok(outcome) => {
                info!(%outcome, from = chain_id, "Switched wallet back to required chain");
                let connection = ConnectionState::Connected {
                    account,
                    network: NetworkStatus::CorrectNetwork,
                };
                let required = self.required_chain_id();
                self.view.send_modify(|v| {
                    v.connection = connection;
                    v.chain_id = Some(required);
                });
                self.reload_after_change().await;
                connection
            }
            Err(e) => {
                warn!(error = %e, "Auto-switch failed, reloading wallet state");
                self.discover(false).await
            }
        }
    }

    async fn reload_after_change(&self) {
        // Failures are already logged and leave the previous lists in place.
        let _ = self.reload_tokens().await;
    }

    /// Refreshes both token lists when connected to the required chain.
    pub async fn reload_tokens(&self) -> Result<(), QueryError> {
        let snapshot = self.snapshot();
        let Some(account) = snapshot.account() else {
            return Ok(());
        };
        if !snapshot.is_on_correct_network() {
            debug!("Wrong network, skipping token load");
            return Ok(());
        }

        let (mine, all) = tokio::join!(
            self.gateway.list_tokens_by_owner(account),
            self.gateway.list_all_tokens()
        );
        let (mine, all) = match (mine, all) {
            (Ok(mine), Ok(all)) => (mine, all),
            (Err(e), _) => {
                Logger::query_failed("getTokensByOwner", &e.to_string());
                return Err(e);
            }
            (_, Err(e)) => {
                Logger::query_failed("getAllTokens", &e.to_string());
                return Err(e);
            }
        };

        let mine = owned_subset(mine, &all, account);
        let my_tokens = project_all(&mine);
        let all_tokens = project_all(&all);
        debug!(mine = my_tokens.len(), all = all_tokens.len(), "Token lists reloaded");

        self.view.send_modify(|v| {
            // The account may have changed while the queries ran.
            if v.account() == Some(account) {
                v.my_tokens = my_tokens;
            }
            v.all_tokens = all_tokens;
        });
        Ok(())
    }

    /// Submits the current form and waits for the token to be mined.
    pub async fn create_token(&self) -> Result<CreatedToken, FactoryError> {
        let snapshot = self.snapshot();

        let account = match snapshot.connection {
            ConnectionState::Connected { account, network: NetworkStatus::CorrectNetwork } => account,
            ConnectionState::Connected { .. } => {
                let chain_name = self.reconciler.required_chain().chain_name.clone();
                return Err(self.reject(ValidationError::WrongNetwork(chain_name)));
            }
            _ => return Err(self.reject(ValidationError::NotConnected)),
        };

        if let Err(e) = snapshot.form.validate() {
            return Err(self.reject(e));
        }

        let Some(_guard) = SubmissionGuard::acquire(&self.in_flight, &self.view) else {
            debug!("Create ignored, submission already in flight");
            return Err(ValidationError::SubmissionInFlight.into());
        };

        let form = snapshot.form;
        self.view.send_modify(|v| {
            v.creating = true;
            v.notice = Some(Notice::info(format!("Creating {}...", form.symbol.trim())));
        });

        let result = async {
            let pending = self
                .gateway
                .create_token(account, &form.name, &form.symbol, &form.supply)
                .await?;
            self.view.send_modify(|v| {
                v.notice = Some(Notice::info(format!(
                    "Transaction sent: {:?}. Waiting for confirmation...",
                    pending.tx_hash
                )));
            });
            let created = self.gateway.await_confirmation(&pending).await?;
            Ok::<_, FactoryError>(created)
        }
        .await;

        match result {
            Ok(created) => {
                let message = format!(
                    "Token created successfully!\nAddress: {:?}\nYou are the owner and have received all {} tokens!",
                    created.token_address,
                    form.supply.trim()
                );
                let record = created.clone();
                self.view.send_modify(|v| {
                    v.creating = false;
                    v.form = TokenForm::default();
                    v.last_created = Some(record);
                    v.notice = Some(Notice::success(message));
                });
                self.reload_after_change().await;
                Ok(created)
            }
            Err(e) => {
                error!(error = %e, symbol = %form.symbol, "Error creating token");
                let message = e.user_message();
                self.view.send_modify(|v| {
                    v.creating = false;
                    v.notice = Some(Notice::error(message));
                });
                Err(e)
            }
        }
    }

    fn reject(&self, err: ValidationError) -> FactoryError {
        let message = err.to_string();
        self.view.send_modify(|v| v.notice = Some(Notice::warning(message)));
        err.into()
    }

    /// Asks the wallet to track `token`. Failures are only logged.
    pub async fn add_to_wallet(&self, token: &TokenInfo) -> bool {
        match self.gateway.watch_asset(token.token_address, &token.symbol).await {
            Ok(accepted) => {
                info!(token = ?token.token_address, accepted, "Watch asset request answered");
                accepted
            }
            Err(e) => {
                warn!(token = ?token.token_address, error = %e, "Error adding token to wallet");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::GasPolicy;
    use crate::test_support::{address, MockWallet};
    use megamint_wallet_core::{ChainConfig, WalletError};
    use std::sync::Arc;
    use std::time::Duration;

    fn controller(wallet: MockWallet, policy: ControllerPolicy) -> ViewController {
        let wallet: SharedWallet = Arc::new(wallet);
        let reconciler =
            NetworkReconciler::new(wallet.clone(), ChainConfig::megaeth_timothy(), Duration::ZERO);
        let gateway = FactoryGateway::new(wallet.clone(), address(0xfa), GasPolicy::default()).unwrap();
        ViewController::new(wallet, reconciler, gateway, policy)
    }

    #[test]
    fn test_form_validation() {
        assert_eq!(TokenForm::new("Mega", "mega", "100").symbol, "MEGA");
        assert!(TokenForm::new("Mega", "MEGA", "100").validate().is_ok());
        assert_eq!(
            TokenForm::new("", "MEGA", "100").validate(),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            TokenForm::new("Mega", "ABCDEFGHIJK", "100").validate(),
            Err(ValidationError::SymbolTooLong { max: 10, actual: 11 })
        );
        assert!(matches!(
            TokenForm::new("Mega", "MEGA", "1.5").validate(),
            Err(ValidationError::InvalidSupply(_))
        ));
    }

    #[tokio::test]
    async fn test_create_while_disconnected_never_touches_wallet() {
        let mut wallet = MockWallet::new();
        wallet.expect_code_at().never();
        wallet.expect_send_transaction().never();
        wallet.expect_transaction_receipt().never();

        let controller = controller(wallet, ControllerPolicy::default());
        controller.set_form(TokenForm::new("Mega", "MEGA", "1000"));

        let err = controller.create_token().await.unwrap_err();
        assert_eq!(err, FactoryError::Validation(ValidationError::NotConnected));

        let view = controller.snapshot();
        assert_eq!(view.notice.unwrap().message, "Please connect wallet first!");
        assert_eq!(view.form.symbol, "MEGA");
        assert!(!view.creating);
    }

    #[tokio::test]
    async fn test_chain_change_without_auto_reconcile_marks_wrong_network() {
        let mut wallet = MockWallet::new();
        wallet.expect_accounts().returning(|| Ok(vec![address(1)]));
        wallet.expect_chain_id().returning(|| Ok(6343));
        wallet
            .expect_call()
            .returning(|_| Ok(crate::test_support::encode_records(&[])));
        wallet.expect_switch_chain().never();

        let controller = controller(
            wallet,
            ControllerPolicy { auto_reconcile_on_chain_change: false },
        );
        controller.load().await;
        assert!(controller.snapshot().is_on_correct_network());

        let state = controller.handle_event(WalletEvent::ChainChanged(1)).await;
        assert_eq!(
            state,
            ConnectionState::Connected { account: address(1), network: NetworkStatus::WrongNetwork }
        );
        let view = controller.snapshot();
        assert_eq!(view.chain_id, Some(1));
        assert_eq!(view.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_rejected_connect_returns_to_disconnected() {
        let mut wallet = MockWallet::new();
        wallet
            .expect_request_accounts()
            .returning(|| Err(WalletError::from_rpc(4001, "User rejected the request.")));
        wallet.expect_switch_chain().never();

        let controller = controller(wallet, ControllerPolicy::default());
        assert_eq!(controller.connect().await, ConnectionState::Disconnected);
        assert_eq!(
            controller.snapshot().notice.unwrap().message,
            "Wallet connection was rejected"
        );
    }

    #[test]
    fn test_guard_releases_flag_and_creating() {
        let flag = AtomicBool::new(false);
        let (view, _rx) = watch::channel(ViewModel::new(6343));
        {
            let _guard = SubmissionGuard::acquire(&flag, &view).unwrap();
            view.send_modify(|v| v.creating = true);
            assert!(SubmissionGuard::acquire(&flag, &view).is_none());
        }
        assert!(!flag.load(Ordering::SeqCst));
        assert!(!view.borrow().creating);
        assert!(SubmissionGuard::acquire(&flag, &view).is_some());
    }
}
