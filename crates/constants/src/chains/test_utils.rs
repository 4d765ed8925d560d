//! Constants for local test chains.

use crate::{DomainOverride, NetworkRecord};
use alloy::primitives::Address;
use std::borrow::Cow;

/// Name for the test chain.
pub const NAME: &str = "Test Chain";
/// Test chain id.
pub const CHAIN_ID: u64 = 31_337;
/// Explorer used for the test chain.
pub const EXPLORER: &str = "https://explorer.test";

/// Test ERC-20 token with permit support.
pub const TOKEN: Address = Address::repeat_byte(0xaa);
/// Test token with an overridden domain.
pub const OVERRIDDEN_TOKEN: Address = Address::repeat_byte(0xab);
/// Test super token streamed by the flow scheduler.
pub const SUPER_TOKEN: Address = Address::repeat_byte(0x5f);
/// Test 712 macro forwarder.
pub const FORWARDER: Address = Address::repeat_byte(0xf0);
/// Test flow scheduler macro.
pub const MACRO: Address = Address::repeat_byte(0xf1);
/// Test permit spender.
pub const SPENDER: Address = Address::repeat_byte(0x22);
/// Test flow receiver.
pub const RECEIVER: Address = Address::repeat_byte(0x33);

/// Domain override for [`OVERRIDDEN_TOKEN`].
pub const OVERRIDE: DomainOverride =
    DomainOverride::new(CHAIN_ID, OVERRIDDEN_TOKEN, Some("2"), Some(1));

/// Override table used in tests.
pub const OVERRIDES: &[DomainOverride] = &[OVERRIDE];

/// Network record for the test chain.
pub const NETWORK: NetworkRecord =
    NetworkRecord::new(CHAIN_ID, Cow::Borrowed(NAME), Some(Cow::Borrowed(EXPLORER)));
