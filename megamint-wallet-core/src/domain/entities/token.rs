//! Token entity for the wallet core

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::shared::constants::{ERC20_ASSET_TYPE, ERC20_DECIMALS};

/// Request for the wallet to track an ERC-20 token (EIP-747).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchAssetRequest {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl WatchAssetRequest {
    pub fn erc20(address: Address, symbol: impl Into<String>) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals: ERC20_DECIMALS,
        }
    }

    /// `wallet_watchAsset` params object.
    pub fn to_params(&self) -> serde_json::Value {
        json!({
            "type": ERC20_ASSET_TYPE,
            "options": {
                "address": self.address,
                "symbol": self.symbol,
                "decimals": self.decimals,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_asset_params() {
        let address: Address = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6".parse().unwrap();
        let params = WatchAssetRequest::erc20(address, "MTK").to_params();

        assert_eq!(params["type"], "ERC20");
        assert_eq!(params["options"]["symbol"], "MTK");
        assert_eq!(params["options"]["decimals"], 18);
        assert_eq!(
            params["options"]["address"],
            "0x742d35cc6634c0532925a3b8d4c9db96c4b4d8b6"
        );
    }
}
