use alloy::primitives::{aliases::I96, U256};
use clearsig_constants::SECONDS_PER_DAY;
use std::{fmt, str::FromStr};

/// Decimals of a super token's wei representation.
const FLOW_RATE_DECIMALS: u8 = 18;

/// Errors produced while converting a human-entered amount to integer units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The string is not a non-negative decimal number.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
    /// The amount has more fractional digits than the token supports.
    #[error("amount {amount} has more than {decimals} fractional digits")]
    AmountPrecisionExceeded {
        /// The amount as entered.
        amount: String,
        /// The token's decimals.
        decimals: u8,
    },
    /// The scaled amount does not fit the target integer type.
    #[error("amount {0} is out of range")]
    Overflow(String),
    /// The amount scales to zero.
    #[error("amount must be greater than zero")]
    Zero,
}

/// A syntactically valid, non-negative decimal amount such as `"1.5"`.
///
/// Validation happens on construction, before any network call. Scaling to
/// integer units needs the token's decimals and happens later via
/// [`HumanAmount::to_units`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HumanAmount {
    raw: String,
    integer: String,
    /// Fractional digits with trailing zeros removed.
    fraction: String,
}

impl HumanAmount {
    /// Parse a decimal amount. Accepts `"1"`, `"1.5"`, `".5"`, and `"5."`;
    /// rejects signs, exponents, separators, and empty input.
    pub fn parse(amount: &str) -> Result<Self, AmountError> {
        let raw = amount.trim();
        let invalid = || AmountError::InvalidAmount(amount.to_string());

        let (integer, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(Self {
            raw: raw.to_string(),
            integer: integer.trim_start_matches('0').to_string(),
            fraction: fraction.trim_end_matches('0').to_string(),
        })
    }

    /// The amount as entered, trimmed of whitespace.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of significant fractional digits.
    pub fn fractional_digits(&self) -> usize {
        self.fraction.len()
    }

    /// True if the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.integer.is_empty() && self.fraction.is_empty()
    }

    /// Scale to integer units with `decimals` fractional digits.
    ///
    /// Fails with [`AmountError::AmountPrecisionExceeded`] if the amount has
    /// more significant fractional digits than `decimals`.
    pub fn to_units(&self, decimals: u8) -> Result<U256, AmountError> {
        if self.fraction.len() > decimals as usize {
            return Err(AmountError::AmountPrecisionExceeded {
                amount: self.raw.clone(),
                decimals,
            });
        }
        self.scale(&self.fraction, decimals)
    }

    /// Scale to integer units, discarding fractional digits beyond
    /// `decimals`. Computes `floor(amount * 10^decimals)`.
    pub fn to_units_floor(&self, decimals: u8) -> Result<U256, AmountError> {
        let keep = self.fraction.len().min(decimals as usize);
        self.scale(&self.fraction[..keep], decimals)
    }

    fn scale(&self, fraction: &str, decimals: u8) -> Result<U256, AmountError> {
        let mut digits = String::with_capacity(self.integer.len() + decimals as usize + 1);
        digits.push('0');
        digits.push_str(&self.integer);
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

        U256::from_str_radix(&digits, 10).map_err(|_| AmountError::Overflow(self.raw.clone()))
    }
}

impl FromStr for HumanAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HumanAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse a decimal string into integer units, rejecting excess precision.
///
/// `parse_units_exact("1.0", 6) == 1_000_000`, while `"1.0000001"` at 6
/// decimals fails with [`AmountError::AmountPrecisionExceeded`].
pub fn parse_units_exact(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    HumanAmount::parse(amount)?.to_units(decimals)
}

/// Render integer units as a decimal string without trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
    } else {
        digits
    };
    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}

/// Convert a tokens-per-day rate into a per-second `int96` flow rate.
///
/// Computes `floor(rate * 10^18) / 86400` with integer division. A rate that
/// rounds to zero is rejected.
pub fn flow_rate_from_tokens_per_day(rate: &HumanAmount) -> Result<I96, AmountError> {
    let wei_per_day = rate.to_units_floor(FLOW_RATE_DECIMALS)?;
    let per_second = wei_per_day / U256::from(SECONDS_PER_DAY);
    if per_second.is_zero() {
        return Err(AmountError::Zero);
    }

    let overflow = || AmountError::Overflow(rate.to_string());
    let per_second = u128::try_from(per_second).map_err(|_| overflow())?;
    let per_second = i128::try_from(per_second).map_err(|_| overflow())?;
    I96::try_from(per_second).map_err(|_| overflow())
}
