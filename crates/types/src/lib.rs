//! Types shared by the clear-signing flows: token metadata, permit and flow
//! schedule parameters, typed-data envelopes, exact unit scaling, and the
//! 65-byte signature codec.

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
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod config;
pub use config::{
    env_utils, ClearSigConfig, ConfigError, FlowSchedulerDeployment, OP_SEPOLIA_FORWARDER_ENV,
    OP_SEPOLIA_MACRO_ENV, RELAYER_URL_ENV,
};

mod envelope;
pub use envelope::TypedDataEnvelope;

mod input;
pub use input::{normalize_hex_bytes, parse_address, parse_u256, parse_u32, InputError};

mod metadata;
pub use metadata::TokenMetadata;

mod permit;
pub use permit::PermitParameters;

mod schedule;
pub use schedule::{ScheduleFlowForm, ScheduleFlowParams, ScheduleFlowSecurity, SecurityTemplate};

mod signature;
pub use signature::{SignatureError, SignatureParts};

mod units;
pub use units::{
    flow_rate_from_tokens_per_day, format_units, parse_units_exact, AmountError, HumanAmount,
};
