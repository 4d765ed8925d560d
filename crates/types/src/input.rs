use crate::AmountError;
use alloy::primitives::{Address, Bytes, U256};

/// Local validation errors, reported before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Not a 20-byte hex address.
    #[error("invalid address for {field}: {value:?}")]
    InvalidAddress {
        /// The input field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Not a valid amount.
    #[error("invalid amount for {field}: {source}")]
    InvalidAmount {
        /// The input field.
        field: &'static str,
        /// The amount error.
        #[source]
        source: AmountError,
    },
    /// Not a valid unsigned integer of the expected width.
    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber {
        /// The input field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Not valid hex bytes.
    #[error("invalid hex for {field}: {value:?}")]
    InvalidHex {
        /// The input field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl InputError {
    /// Wrap an [`AmountError`] for a field.
    pub const fn amount(field: &'static str, source: AmountError) -> Self {
        Self::InvalidAmount { field, source }
    }
}

/// Parse a `0x`-prefixed, 40-hex-char address.
pub fn parse_address(field: &'static str, value: &str) -> Result<Address, InputError> {
    let value = value.trim();
    let invalid = || InputError::InvalidAddress { field, value: value.to_string() };
    let hex_str = value.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_str.len() != 40 {
        return Err(invalid());
    }
    hex_str.parse().map_err(|_| invalid())
}

/// Parse a decimal `uint32`.
pub fn parse_u32(field: &'static str, value: &str) -> Result<u32, InputError> {
    value
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidNumber { field, value: value.to_string() })
}

/// Parse a decimal `uint256`.
pub fn parse_u256(field: &'static str, value: &str) -> Result<U256, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidNumber { field, value: value.to_string() });
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|_| InputError::InvalidNumber { field, value: value.to_string() })
}

/// Decode hex bytes, adding the `0x` prefix if it is missing. Empty input
/// decodes to empty bytes.
pub fn normalize_hex_bytes(field: &'static str, value: &str) -> Result<Bytes, InputError> {
    let value = value.trim();
    let prefixed =
        if value.starts_with("0x") { value.to_string() } else { format!("0x{value}") };
    prefixed.parse().map_err(|_| InputError::InvalidHex { field, value: value.to_string() })
}
