//! Constants for the wallet core
//!
//! EIP-1193 / EIP-3085 / EIP-747 protocol values and adapter defaults.

// EIP-1193 provider error codes
pub const USER_REJECTED_CODE: i64 = 4001;
// wallet_switchEthereumChain: the chain has not been added to the wallet
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

// Wallet RPC methods
pub const METHOD_ACCOUNTS: &str = "eth_accounts";
pub const METHOD_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const METHOD_CHAIN_ID: &str = "eth_chainId";
pub const METHOD_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const METHOD_ADD_CHAIN: &str = "wallet_addEthereumChain";
pub const METHOD_WATCH_ASSET: &str = "wallet_watchAsset";
pub const METHOD_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const METHOD_CALL: &str = "eth_call";
pub const METHOD_GET_RECEIPT: &str = "eth_getTransactionReceipt";
pub const METHOD_GET_CODE: &str = "eth_getCode";

// Asset watch requests
pub const ERC20_ASSET_TYPE: &str = "ERC20";
pub const ERC20_DECIMALS: u8 = 18;

// Event polling
pub const DEFAULT_EVENT_POLL_INTERVAL_MS: u64 = 1000;
pub const MIN_EVENT_POLL_INTERVAL_MS: u64 = 50;

// MegaETH Timothy testnet
pub const TIMOTHY_CHAIN_ID: u64 = 6343;
pub const TIMOTHY_CHAIN_NAME: &str = "MegaETH Timothy Testnet";
pub const TIMOTHY_RPC_URL: &str = "https://timothy.megaeth.com/rpc";
pub const TIMOTHY_EXPLORER_URL: &str = "https://megaeth-testnet-v2.blockscout.com/";
