//! Constants for Ethereum mainnet.

use alloy::primitives::{address, Address};

/// Name of the chain.
pub const NAME: &str = "Ethereum";
/// Chain ID for Ethereum mainnet.
pub const CHAIN_ID: u64 = 1;
/// Block explorer for Ethereum mainnet.
pub const EXPLORER: &str = "https://etherscan.io";

/// Circle USDC. Its permit domain uses version `"2"`.
pub const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
