use alloy::primitives::{aliases::U192, b256, B256};

/// Seed string hashed to derive the flow scheduler macro's nonce key.
pub const FLOW_SCHEDULER_NONCE_KEY_SEED: &str = "FlowSchedulerMacro";

/// Nonce key of the flow scheduler macro under the 712 forwarder.
///
/// The low 192 bits of `keccak256("FlowSchedulerMacro")`. Identical for all
/// callers and chains.
pub const FLOW_SCHEDULER_NONCE_KEY: U192 =
    U192::from_limbs([0xb5ccfddea5795ced, 0x6b7612571a9e09f3, 0x7a25d671c9073483]);

/// EIP-712 domain name used by the macro forwarder.
pub const CLEAR_SIGNING_NAME: &str = "ClearSigning";

/// EIP-712 domain version used by the macro forwarder.
pub const CLEAR_SIGNING_VERSION: &str = "1";

/// Domain version used for permit tokens with no override or EIP-5267 data.
pub const DEFAULT_PERMIT_VERSION: &str = "1";

/// Default `Security.domain` for flow schedule authorizations.
pub const SECURITY_DOMAIN: &str = "flowscheduler.xyz";

/// Default `Security.provider` for flow schedule authorizations.
pub const SECURITY_PROVIDER: &str = "macros.superfluid.eth";

/// Language tag passed to the macro's description renderer: `bytes32("en")`.
pub const LANG_EN: B256 =
    b256!("0x656e000000000000000000000000000000000000000000000000000000000000");

/// Seconds in a day, the denominator of the tokens-per-day flow rate.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Lifetime of a permit signature, added to the current time.
pub const PERMIT_VALIDITY_SECS: u64 = 3_600;
