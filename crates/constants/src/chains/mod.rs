/// Ethereum mainnet constants.
pub mod mainnet;

/// OP Sepolia testnet constants.
pub mod op_sepolia;

/// Test utilities for chains.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
