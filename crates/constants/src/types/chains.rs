use crate::{mainnet, op_sepolia};
use std::str::FromStr;

/// The list of known chains as a string.
const KNOWN_CHAINS: &str = "mainnet, op-sepolia, test";

/// Error type for parsing struct from a chain name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseChainError {
    /// The chain name is not supported.
    #[error("chain name {0} is not parseable. supported chains: {KNOWN_CHAINS}")]
    ChainNotSupported(String),
}

/// Chains with pinned constants in this crate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KnownChains {
    /// Ethereum mainnet.
    Mainnet,
    /// OP Sepolia testnet.
    OpSepolia,
    /// Local test chain.
    #[cfg(any(test, feature = "test-utils"))]
    Test,
}

impl KnownChains {
    /// Get the chain id.
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => mainnet::CHAIN_ID,
            Self::OpSepolia => op_sepolia::CHAIN_ID,
            #[cfg(any(test, feature = "test-utils"))]
            Self::Test => crate::test_utils::CHAIN_ID,
        }
    }

    /// Look up a known chain by id.
    pub const fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            mainnet::CHAIN_ID => Some(Self::Mainnet),
            op_sepolia::CHAIN_ID => Some(Self::OpSepolia),
            #[cfg(any(test, feature = "test-utils"))]
            crate::test_utils::CHAIN_ID => Some(Self::Test),
            _ => None,
        }
    }
}

impl FromStr for KnownChains {
    type Err = ParseChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            #[cfg(any(test, feature = "test-utils"))]
            "test" => Ok(Self::Test),
            "mainnet" | "ethereum" => Ok(Self::Mainnet),
            "op-sepolia" | "optimism-sepolia" => Ok(Self::OpSepolia),
            _ => Err(ParseChainError::ChainNotSupported(s)),
        }
    }
}
