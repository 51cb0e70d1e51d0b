use anyhow::{anyhow, Result};
use chrono::Utc;
use ethers::types::{Address, TransactionRequest, U256};
use megamint_wallet_core::shared::constants::DEFAULT_EVENT_POLL_INTERVAL_MS;
use megamint_wallet_core::ChainConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config/factory.json";

/// Fixed gas ceiling and price sent with every factory transaction.
///
/// The Timothy testnet estimates gas unreliably, so calls skip estimation
/// and carry these values instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPolicy {
    pub gas_limit: u64,
    pub gas_price_wei: u64,
}

impl GasPolicy {
    /// 80M gas at 0.5 gwei
    pub const TESTNET_FIXED: GasPolicy = GasPolicy {
        gas_limit: 80_000_000,
        gas_price_wei: 500_000_000,
    };

    pub fn gas_limit(&self) -> U256 {
        U256::from(self.gas_limit)
    }

    pub fn gas_price(&self) -> U256 {
        U256::from(self.gas_price_wei)
    }

    pub fn apply(&self, tx: TransactionRequest) -> TransactionRequest {
        tx.gas(self.gas_limit()).gas_price(self.gas_price())
    }
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self::TESTNET_FIXED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub chain: ChainConfig,
    pub factory_address: String,
    pub wallet_rpc_url: String,
    pub gas: GasPolicy,
    pub settle_delay_ms: u64,
    pub confirmation_poll_ms: u64,
    pub confirmation_timeout_secs: Option<u64>,
    pub event_poll_ms: u64,
    pub auto_reconcile_on_chain_change: bool,
    pub log_level: String,
    pub last_modified: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            chain: ChainConfig::megaeth_timothy(),
            factory_address: "".to_string(),
            wallet_rpc_url: "http://127.0.0.1:8545".to_string(),
            gas: GasPolicy::default(),
            settle_delay_ms: 500,
            confirmation_poll_ms: 1000,
            confirmation_timeout_secs: None,
            event_poll_ms: DEFAULT_EVENT_POLL_INTERVAL_MS,
            auto_reconcile_on_chain_change: true,
            log_level: "info".to_string(),
            last_modified: Some(Utc::now().timestamp() as u64),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        // Load environment variables
        dotenv::dotenv().ok();

        let config_file = Self::validate_and_get_env_var("CONFIG_FILE", DEFAULT_CONFIG_FILE, false)?;

        let mut config = if Path::new(&config_file).exists() {
            Self::load_from_file(&config_file)?
        } else {
            tracing::warn!(config_file = %config_file, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let mut config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to deserialize config: {}", e))?;
        config.last_modified = Some(Utc::now().timestamp() as u64);
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
            }
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
        fs::write(path, content).map_err(|e| anyhow!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// Environment variables win over the config file.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = env::var("RUST_ENV") {
            if !value.is_empty() {
                self.environment = value;
            }
        }
        if let Ok(value) = env::var("WALLET_RPC_URL") {
            if !value.is_empty() {
                self.wallet_rpc_url = value;
            }
        }
        if let Ok(value) = env::var("FACTORY_ADDRESS") {
            if !value.is_empty() {
                self.factory_address = Self::validate_contract_address("FACTORY_ADDRESS", &value, &self.chain.chain_name)?;
            }
        }
        if let Ok(value) = env::var("LOG_LEVEL") {
            if !value.is_empty() {
                self.log_level = value;
            }
        }
        if let Ok(value) = env::var("AUTO_RECONCILE") {
            if !value.trim().is_empty() {
                self.auto_reconcile_on_chain_change = Self::parse_flag("AUTO_RECONCILE", &value)?;
            }
        }
        Ok(())
    }

    /// Every problem with this configuration, empty when valid.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.factory_address.is_empty() {
            errors.push("FACTORY_ADDRESS is required".to_string());
        } else if !Self::is_valid_hex_address(&self.factory_address) {
            errors.push(format!(
                "Invalid factory address: '{}'. Expected format: 0x followed by 40 hex characters",
                self.factory_address
            ));
        }

        if self.wallet_rpc_url.is_empty() {
            errors.push("WALLET_RPC_URL is required".to_string());
        }

        if self.chain.rpc_urls.iter().all(|url| url.is_empty()) {
            errors.push(format!("RPC URL is required for chain {} ({})", self.chain.chain_id, self.chain.chain_name));
        }

        if self.gas.gas_limit == 0 {
            errors.push("Gas limit must be greater than 0".to_string());
        }

        if self.gas.gas_price_wei == 0 {
            errors.push("Gas price must be greater than 0".to_string());
        }

        if self.confirmation_poll_ms == 0 {
            errors.push("Confirmation poll interval must be greater than 0".to_string());
        }

        errors
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if !errors.is_empty() {
            return Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")));
        }
        Ok(())
    }

    pub fn factory_address(&self) -> Result<Address> {
        self.factory_address
            .parse::<Address>()
            .map_err(|e| anyhow!("Invalid factory address '{}': {}", self.factory_address, e))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_ms)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }

    pub fn event_poll_interval(&self) -> Duration {
        Duration::from_millis(self.event_poll_ms)
    }

    /// Parses a boolean switch; unrecognised values are rejected.
    pub fn parse_flag(name: &str, value: &str) -> Result<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(anyhow!(
                "Invalid value for {}: '{}'. Expected true/false, 1/0, yes/no or on/off",
                name,
                other
            )),
        }
    }

    /// Validates if a string is a valid hex address (0x followed by 40 hex characters)
    pub fn is_valid_hex_address(address: &str) -> bool {
        if !address.starts_with("0x") {
            return false;
        }

        let hex_part = &address[2..];
        if hex_part.len() != 40 {
            return false;
        }

        hex_part.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Validates environment variables and provides fallback values
    pub fn validate_and_get_env_var(key: &str, fallback: &str, required: bool) -> Result<String> {
        match env::var(key) {
            Ok(value) => {
                if value.is_empty() {
                    if required {
                        return Err(anyhow!("Environment variable {} is required but empty", key));
                    }
                    Ok(fallback.to_string())
                } else {
                    Ok(value)
                }
            }
            Err(_) => {
                if required {
                    return Err(anyhow!("Required environment variable {} is not set", key));
                }
                Ok(fallback.to_string())
            }
        }
    }

    pub fn validate_contract_address(env_key: &str, address: &str, chain_name: &str) -> Result<String> {
        if !Self::is_valid_hex_address(address) {
            return Err(anyhow!(
                "Invalid {} for {}: '{}'. Expected format: 0x followed by 40 hex characters",
                env_key,
                chain_name,
                address
            ));
        }
        Ok(address.to_string())
    }
}
