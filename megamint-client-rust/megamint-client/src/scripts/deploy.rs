//! One-shot deployment of the token factory contract.
//!
//! Compiles `contracts/TokenFactory.sol`, deploys it from the key in
//! `PRIVATE_KEY`, records the deployment and points the client
//! configuration at the new factory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use ethers::abi::Abi;
use ethers::contract::ContractFactory;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::solc::{CompilerInput, Solc};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::{format_ether, parse_ether};
use megamint_wallet_core::shared::constants::TIMOTHY_RPC_URL;
use megamint_wallet_core::ChainConfig;
use serde::{Deserialize, Serialize};

use crate::infrastructure::config::{AppConfig, GasPolicy, DEFAULT_CONFIG_FILE};

pub const FACTORY_CONTRACT: &str = "TokenFactory";
pub const TOKEN_CONTRACT: &str = "FactoryToken";
pub const DEFAULT_CONTRACT_PATH: &str = "contracts/TokenFactory.sol";
pub const DEFAULT_DEPLOYMENT_RECORD: &str = "factory-deployment.json";
pub const FAUCET_URL: &str = "https://docs.megaeth.com/faucet";

#[derive(Debug, Clone)]
pub struct DeploymentSettings {
    pub private_key: String,
    pub rpc_url: String,
    pub chain: ChainConfig,
    pub contract_path: PathBuf,
    pub record_path: PathBuf,
    pub client_config_path: PathBuf,
    pub gas: GasPolicy,
    pub min_balance: U256,
    pub confirmations: usize,
    pub optimizer_runs: usize,
}

impl DeploymentSettings {
    /// Builds settings from a variable lookup. `PRIVATE_KEY` is required.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let private_key = var("PRIVATE_KEY").ok_or_else(|| {
            anyhow!("PRIVATE_KEY environment variable is not set. Please create a .env file with: PRIVATE_KEY=your_private_key_here")
        })?;

        Ok(Self {
            private_key,
            rpc_url: var("RPC_URL").unwrap_or_else(|| TIMOTHY_RPC_URL.to_string()),
            chain: ChainConfig::megaeth_timothy(),
            contract_path: var("CONTRACT_PATH")
                .unwrap_or_else(|| DEFAULT_CONTRACT_PATH.to_string())
                .into(),
            record_path: DEFAULT_DEPLOYMENT_RECORD.into(),
            client_config_path: var("CONFIG_FILE")
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
                .into(),
            gas: GasPolicy::TESTNET_FIXED,
            min_balance: parse_ether("0.1")?,
            confirmations: 2,
            optimizer_runs: 200,
        })
    }

    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }
}

/// Written to `factory-deployment.json` after a successful deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub network: String,
    pub chain_id: u64,
    pub factory_address: Address,
    pub deployer_address: Address,
    pub transaction_hash: String,
    pub abi: Abi,
    pub token_abi: Option<Abi>,
    pub gas_used: String,
    pub block_number: Option<u64>,
    pub deployed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CompiledFactory {
    pub abi: Abi,
    pub bytecode: Bytes,
    pub token_abi: Option<Abi>,
}

pub fn ensure_sufficient_balance(balance: U256, minimum: U256) -> Result<()> {
    if balance < minimum {
        bail!(
            "Balance too low ({} ETH, need {} ETH). Please get test ETH from: {}",
            format_ether(balance),
            format_ether(minimum),
            FAUCET_URL
        );
    }
    Ok(())
}

pub struct FactoryDeployer {
    settings: DeploymentSettings,
}

impl FactoryDeployer {
    pub fn new(settings: DeploymentSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DeploymentSettings {
        &self.settings
    }

    /// Compiles the factory source with the optimizer enabled.
    pub fn compile(&self) -> Result<CompiledFactory> {
        let path = &self.settings.contract_path;
        log::info!("📝 Compiling {} contract from {}", FACTORY_CONTRACT, path.display());

        let mut input = CompilerInput::new(path)
            .with_context(|| format!("Failed to read contract source {}", path.display()))?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No Solidity sources found in {}", path.display()))?;
        input.settings.optimizer.enabled = Some(true);
        input.settings.optimizer.runs = Some(self.settings.optimizer_runs);

        let output = Solc::default()
            .compile(&input)
            .context("Failed to run solc")?;

        let errors: Vec<String> = output
            .errors
            .iter()
            .filter(|e| e.severity.is_error())
            .map(|e| e.formatted_message.clone().unwrap_or_else(|| e.message.clone()))
            .collect();
        if !errors.is_empty() {
            for err in &errors {
                log::error!("❌ Compilation error: {}", err);
            }
            bail!("Compilation failed with {} error(s)", errors.len());
        }

        let factory = output
            .find(FACTORY_CONTRACT)
            .ok_or_else(|| anyhow!("{} missing from compiler output", FACTORY_CONTRACT))?;
        let abi = factory
            .abi
            .cloned()
            .ok_or_else(|| anyhow!("{} has no ABI", FACTORY_CONTRACT))?;
        let bytecode = factory
            .bin
            .and_then(|bin| bin.as_bytes())
            .cloned()
            .ok_or_else(|| anyhow!("{} has no bytecode", FACTORY_CONTRACT))?;
        let token_abi = output.find(TOKEN_CONTRACT).and_then(|c| c.abi.cloned());

        log::info!("✅ Contract compiled successfully! Bytecode length: {} bytes", bytecode.len());

        Ok(CompiledFactory {
            abi,
            bytecode,
            token_abi,
        })
    }

    /// Full deployment: balance check, compile, deploy, record, reconfigure.
    pub async fn deploy(&self) -> Result<DeploymentRecord> {
        let settings = &self.settings;
        log::info!("🚀 Starting {} deployment on {}", FACTORY_CONTRACT, settings.chain.chain_name);

        let provider = Provider::<Http>::try_from(settings.rpc_url.as_str())
            .map_err(|e| anyhow!("Failed to create HTTP provider for {}: {}", settings.rpc_url, e))?;
        let wallet: LocalWallet = settings
            .private_key
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid PRIVATE_KEY: {}", e))?;

        let chain_id = provider
            .get_chainid()
            .await
            .context("Failed to fetch chain id")?
            .as_u64();
        let deployer = wallet.address();
        log::info!("📡 Connected to: {} (chain {})", settings.rpc_url, chain_id);
        log::info!("💳 Deployer address: {:?}", deployer);

        let balance = provider
            .get_balance(deployer, None)
            .await
            .context("Failed to fetch deployer balance")?;
        log::info!("💰 Balance: {} ETH", format_ether(balance));
        ensure_sufficient_balance(balance, settings.min_balance)?;

        let compiled = self.compile()?;

        log::info!(
            "🔨 Deploying {} with {} gas at {} wei",
            FACTORY_CONTRACT,
            settings.gas.gas_limit,
            settings.gas.gas_price_wei
        );
        let client = Arc::new(SignerMiddleware::new(provider, wallet.with_chain_id(chain_id)));
        let factory = ContractFactory::new(compiled.abi.clone(), compiled.bytecode.clone(), client);

        let mut deployment = factory
            .deploy(())
            .context("Failed to build deployment transaction")?
            .legacy()
            .confirmations(settings.confirmations);
        deployment.tx.set_gas(settings.gas.gas_limit());
        deployment.tx.set_gas_price(settings.gas.gas_price());

        log::info!("⏳ Waiting for {} confirmation(s), this may take a while...", settings.confirmations);
        let (contract, receipt) = deployment
            .send_with_receipt()
            .await
            .context("Deployment transaction failed, this is common on the Timothy testnet; try running the script again")?;

        let factory_address = contract.address();
        log::info!("✅ {} deployed at {:?}", FACTORY_CONTRACT, factory_address);
        if let Some(url) = settings
            .chain
            .explorer_address_url(&format!("{factory_address:?}"))
        {
            log::info!("🔗 Explorer: {}", url);
        }

        let record = DeploymentRecord {
            network: settings.chain.chain_name.clone(),
            chain_id,
            factory_address,
            deployer_address: deployer,
            transaction_hash: format!("{:?}", receipt.transaction_hash),
            abi: compiled.abi,
            token_abi: compiled.token_abi,
            gas_used: receipt.gas_used.unwrap_or_default().to_string(),
            block_number: receipt.block_number.map(|b| b.as_u64()),
            deployed_at: Utc::now(),
        };
        log::info!("⛽ Gas used: {}", record.gas_used);

        write_deployment_record(&record, &settings.record_path)?;
        log::info!("💾 Deployment info saved to {}", settings.record_path.display());

        regenerate_client_config(&record, &settings.chain, &settings.client_config_path)?;
        log::info!("📝 Updated {} with the new factory address", settings.client_config_path.display());

        Ok(record)
    }
}

pub fn write_deployment_record(record: &DeploymentRecord, path: &Path) -> Result<()> {
    let content =
        serde_json::to_string_pretty(record).context("Failed to serialize deployment record")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write deployment record {}", path.display()))?;
    Ok(())
}

/// Points the client configuration at the deployed factory, keeping the
/// other settings of an existing file.
pub fn regenerate_client_config(
    record: &DeploymentRecord,
    chain: &ChainConfig,
    path: &Path,
) -> Result<AppConfig> {
    let mut config = if path.exists() {
        AppConfig::load_from_file(path)?
    } else {
        AppConfig::default()
    };
    config.chain = chain.clone();
    config.factory_address = format!("{:?}", record.factory_address);
    config.validate()?;
    config.save_to_file(path)?;
    Ok(config)
}
