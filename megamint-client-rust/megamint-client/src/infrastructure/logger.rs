use ethers::types::{Address, TxHash};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::{Once, OnceLock};
use tracing::{debug, error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling, rolling::Rotation};
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

static INIT: Once = Once::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub service_name: String,
    pub enable_console: bool,
    pub enable_file: bool,
    pub log_directory: String,
    pub enable_colors: bool,
    pub enable_thread_ids: bool,
    pub enable_file_line: bool,
    pub enable_module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            service_name: "megamint".to_string(),
            enable_console: true,
            enable_file: true,
            log_directory: "logs".to_string(),
            enable_colors: true,
            enable_thread_ids: false,
            enable_file_line: false,
            enable_module_path: true,
        }
    }
}

impl LogConfig {
    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            ..Self::default()
        }
    }

    pub fn level(&self) -> Level {
        match self.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// `RUST_LOG` wins; otherwise the configured level for this crate and
    /// the wallet core.
    pub fn filter_directive(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| {
            let level = self.level();
            format!("megamint={level},megamint_client={level},megamint_wallet_core={level},deploy_factory={level}")
        })
    }
}

pub struct EnhancedLogger {
    config: LogConfig,
}

impl EnhancedLogger {
    pub fn new(config: LogConfig) -> Self {
        if config.enable_file {
            if let Err(e) = fs::create_dir_all(&config.log_directory) {
                eprintln!("Failed to create log directory: {e}");
            }
        }

        Self { config }
    }

    /// Installs the global subscriber. Later calls are no-ops.
    pub fn init(&self) {
        INIT.call_once(|| {
            let env_filter = EnvFilter::new(self.config.filter_directive());

            let mut layers: Vec<Box<dyn Layer<_> + Send + Sync>> = Vec::new();

            // stderr keeps stdout free for the terminal view
            if self.config.enable_console {
                let console_layer = fmt::layer()
                    .with_timer(UtcTime::rfc_3339())
                    .with_thread_ids(self.config.enable_thread_ids)
                    .with_file(self.config.enable_file_line)
                    .with_line_number(self.config.enable_file_line)
                    .with_target(self.config.enable_module_path)
                    .with_ansi(self.config.enable_colors)
                    .with_writer(std::io::stderr);
                layers.push(Box::new(console_layer));
            }

            if self.config.enable_file {
                let file_appender = rolling::RollingFileAppender::new(
                    Rotation::DAILY,
                    &self.config.log_directory,
                    format!("{}.log", self.config.service_name),
                );
                let (non_blocking_file_appender, guard) = non_blocking(file_appender);
                let _ = FILE_GUARD.set(guard);
                let file_layer = fmt::layer()
                    .with_timer(UtcTime::rfc_3339())
                    .with_thread_ids(self.config.enable_thread_ids)
                    .with_file(self.config.enable_file_line)
                    .with_line_number(self.config.enable_file_line)
                    .with_target(self.config.enable_module_path)
                    .with_ansi(false)
                    .with_writer(non_blocking_file_appender);
                layers.push(Box::new(file_layer));
            }

            let subscriber = Registry::default().with(env_filter).with(layers);

            if let Err(e) = subscriber.try_init() {
                eprintln!("Failed to install tracing subscriber: {e}");
            }
        });
    }
}

/// Structured events for the token lifecycle.
pub struct Logger;

impl Logger {
    pub fn init(log_level: &str) {
        EnhancedLogger::new(LogConfig::with_level(log_level)).init();
    }

    pub fn init_with(config: LogConfig) {
        EnhancedLogger::new(config).init();
    }

    pub fn transaction_submitted(tx_hash: TxHash, from: Address, symbol: &str) {
        info!(
            operation = "transaction_submitted",
            tx_hash = ?tx_hash,
            from = ?from,
            symbol = %symbol,
            "Token creation submitted"
        );
    }

    pub fn token_created(tx_hash: TxHash, token_address: Address, block_number: Option<u64>) {
        info!(
            operation = "token_created",
            tx_hash = ?tx_hash,
            token_address = ?token_address,
            block_number = ?block_number,
            "Token created"
        );
    }

    pub fn submission_failed(symbol: &str, error: &str) {
        error!(operation = "submission_failed", symbol = %symbol, error = %error, "Token creation failed");
    }

    pub fn confirmation_failed(tx_hash: TxHash, error: &str) {
        error!(operation = "confirmation_failed", tx_hash = ?tx_hash, error = %error, "Token creation did not confirm");
    }

    pub fn network_reconciled(chain_id: u64, outcome: &str) {
        info!(operation = "network_reconciled", chain_id, outcome = %outcome, "Wallet network reconciled");
    }

    pub fn query_failed(query: &str, error: &str) {
        warn!(operation = "query_failed", query = %query, error = %error, "Token list query failed");
    }

    pub fn wallet_event(name: &str) {
        debug!(operation = "wallet_event", event = %name, "Wallet event received");
    }
}
