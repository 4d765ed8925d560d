use crate::{mainnet, op_sepolia};
use alloy::primitives::{address, Address};
use std::borrow::Cow;

/// A permit domain that deviates from the default `{version: "1", chainId}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DomainOverride {
    /// Chain the token is deployed on.
    chain_id: u64,
    /// Token address.
    token: Address,
    /// Domain `version`, if not the default.
    version: Option<&'static str>,
    /// Domain `chainId`, if not the chain the token is deployed on.
    domain_chain_id: Option<u64>,
}

impl DomainOverride {
    /// Create a new override.
    pub const fn new(
        chain_id: u64,
        token: Address,
        version: Option<&'static str>,
        domain_chain_id: Option<u64>,
    ) -> Self {
        Self { chain_id, token, version, domain_chain_id }
    }

    /// Override of the domain version only.
    pub const fn version(chain_id: u64, token: Address, version: &'static str) -> Self {
        Self::new(chain_id, token, Some(version), None)
    }

    /// Get the chain the token is deployed on.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the token address.
    pub const fn token(&self) -> Address {
        self.token
    }

    /// Get the overridden domain version.
    pub const fn domain_version(&self) -> Option<&'static str> {
        self.version
    }

    /// Get the overridden domain chain id.
    pub const fn domain_chain_id(&self) -> Option<u64> {
        self.domain_chain_id
    }
}

/// Known tokens whose permit domains deviate from the defaults.
pub const DOMAIN_OVERRIDES: &[DomainOverride] = &[
    DomainOverride::version(mainnet::CHAIN_ID, mainnet::USDC, "2"),
    DomainOverride::version(op_sepolia::CHAIN_ID, op_sepolia::USDC, "2"),
    // USDC on Sepolia, OP Mainnet, Base
    DomainOverride::version(11_155_111, address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"), "2"),
    DomainOverride::version(10, address!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"), "2"),
    DomainOverride::version(8_453, address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"), "2"),
];

/// A lookup table of [`DomainOverride`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOverrides {
    entries: Cow<'static, [DomainOverride]>,
}

impl Default for DomainOverrides {
    fn default() -> Self {
        Self::known()
    }
}

impl DomainOverrides {
    /// The built-in [`DOMAIN_OVERRIDES`].
    pub const fn known() -> Self {
        Self { entries: Cow::Borrowed(DOMAIN_OVERRIDES) }
    }

    /// An empty table.
    pub const fn none() -> Self {
        Self { entries: Cow::Borrowed(&[]) }
    }

    /// A table of caller-supplied entries.
    pub const fn from_entries(entries: &'static [DomainOverride]) -> Self {
        Self { entries: Cow::Borrowed(entries) }
    }

    /// Add an entry, replacing any existing entry for the same token.
    pub fn with_entry(mut self, entry: DomainOverride) -> Self {
        let entries = self.entries.to_mut();
        entries.retain(|e| (e.chain_id, e.token) != (entry.chain_id, entry.token));
        entries.push(entry);
        self
    }

    /// Find the override for a token on a chain.
    pub fn lookup(&self, chain_id: u64, token: Address) -> Option<&DomainOverride> {
        self.entries.iter().find(|e| e.chain_id == chain_id && e.token == token)
    }
}
