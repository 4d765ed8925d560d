//! Constants for the OP Sepolia testnet.
//!
//! The flow scheduler forwarder and macro are not pinned here; their
//! addresses are loaded from the environment.

use alloy::primitives::{address, Address};

/// Name of the chain.
pub const NAME: &str = "OP Sepolia";
/// Chain ID for OP Sepolia.
pub const CHAIN_ID: u64 = 11_155_420;
/// Block explorer for OP Sepolia.
pub const EXPLORER: &str = "https://sepolia-optimism.etherscan.io";

/// Circle USDC. Its permit domain uses version `"2"`.
pub const USDC: Address = address!("0x5fd84259d66Cd46123540766Be93DFE6D43130D7");
