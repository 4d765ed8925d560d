use crate::ConfigError;
use alloy::primitives::Address;
use std::env;
use url::Url;

/// Load a required variable from the environment.
pub fn load_string(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::missing(key))
}

/// Load an optional variable. Unset and blank values are `None`.
pub fn load_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Load a required `0x`-prefixed address.
pub fn load_address(key: &str) -> Result<Address, ConfigError> {
    load_string(key)?.trim().parse().map_err(Into::into)
}

/// Load an optional URL. A set but unparseable value is an error.
pub fn load_url_opt(key: &str) -> Result<Option<Url>, ConfigError> {
    load_string_opt(key).map(|s| Url::parse(s.trim())).transpose().map_err(Into::into)
}
