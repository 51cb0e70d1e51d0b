//! Network entity for the wallet core

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    TIMOTHY_CHAIN_ID, TIMOTHY_CHAIN_NAME, TIMOTHY_EXPLORER_URL, TIMOTHY_RPC_URL,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// The chain the application requires the wallet to be on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

/// `wallet_addEthereumChain` parameter object (EIP-3085).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameter<'a> {
    pub chain_id: String,
    pub chain_name: &'a str,
    pub rpc_urls: &'a [String],
    pub native_currency: &'a NativeCurrency,
    pub block_explorer_urls: &'a [String],
}

impl ChainConfig {
    pub fn megaeth_timothy() -> Self {
        Self {
            chain_id: TIMOTHY_CHAIN_ID,
            chain_name: TIMOTHY_CHAIN_NAME.to_string(),
            rpc_urls: vec![TIMOTHY_RPC_URL.to_string()],
            native_currency: NativeCurrency {
                name: "ETH".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            block_explorer_urls: vec![TIMOTHY_EXPLORER_URL.to_string()],
        }
    }

    /// Chain id in the `0x`-prefixed form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    pub fn add_chain_parameter(&self) -> AddChainParameter<'_> {
        AddChainParameter {
            chain_id: self.chain_id_hex(),
            chain_name: &self.chain_name,
            rpc_urls: &self.rpc_urls,
            native_currency: &self.native_currency,
            block_explorer_urls: &self.block_explorer_urls,
        }
    }

    pub fn primary_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }

    /// Explorer page for an address, based on the first explorer URL.
    pub fn explorer_address_url(&self, address: &str) -> Option<String> {
        self.block_explorer_urls.first().map(|base| {
            if base.ends_with('/') {
                format!("{base}address/{address}")
            } else {
                format!("{base}/address/{address}")
            }
        })
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::megaeth_timothy()
    }
}
