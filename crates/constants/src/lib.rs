//! Clear-signing constants.
//!
//! This crate contains the chain identifiers, known token domain overrides,
//! explorer registry, and protocol constants shared by the permit and
//! flow-schedule signing flows.
//!

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod chains;
pub use chains::mainnet;
pub use chains::op_sepolia;
#[cfg(any(test, feature = "test-utils"))]
pub use chains::test_utils;

mod protocol;
pub use protocol::{
    CLEAR_SIGNING_NAME, CLEAR_SIGNING_VERSION, DEFAULT_PERMIT_VERSION, FLOW_SCHEDULER_NONCE_KEY,
    FLOW_SCHEDULER_NONCE_KEY_SEED, LANG_EN, PERMIT_VALIDITY_SECS, SECONDS_PER_DAY,
    SECURITY_DOMAIN, SECURITY_PROVIDER,
};

mod types;
pub use types::{
    DomainOverride, DomainOverrides, KnownChains, NetworkRecord, NetworkRegistry,
    ParseChainError, StaticNetworks, DOMAIN_OVERRIDES, KNOWN_NETWORKS,
};
