use serde::{Deserialize, Serialize};

/// ERC-20 metadata resolved for one `(token, chain)` pair.
///
/// Resolved once and never mutated; a different token or chain yields a
/// fresh resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    /// Token name, also the permit domain name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Token decimals.
    pub decimals: u8,
    /// Whether EIP-2612 permit support was detected, if probed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_permit: Option<bool>,
    /// Whether the domain came from EIP-5267 introspection, if probed.
    #[serde(default, rename = "usedEIP5267", skip_serializing_if = "Option::is_none")]
    pub used_eip5267: Option<bool>,
}

impl TokenMetadata {
    /// Create metadata with no capability information.
    pub const fn new(name: String, symbol: String, decimals: u8) -> Self {
        Self { name, symbol, decimals, supports_permit: None, used_eip5267: None }
    }

    /// Record the permit probe result.
    pub const fn with_permit_support(mut self, supported: bool) -> Self {
        self.supports_permit = Some(supported);
        self
    }

    /// Record whether EIP-5267 was used.
    pub const fn with_eip5267(mut self, used: bool) -> Self {
        self.used_eip5267 = Some(used);
        self
    }
}
