//! Clear-signing flows.
//!
//! This crate builds EIP-712 typed data for two authorizations, requests
//! signatures over it, and executes the signed result:
//!
//! - [`PermitTypedDataBuilder`]: EIP-2612 permits. Token metadata and
//!   capabilities are resolved through a [`TokenCapabilityResolver`].
//! - [`FlowScheduleTypedDataBuilder`]: flow schedules executed by a 712
//!   macro forwarder. The macro renders the human-readable description that
//!   is signed as part of the message.
//!
//! Signing goes through a [`SigningGate`], which refuses to sign for a chain
//! other than the typed data's and allows one pending signature per action.
//! Signed requests are tracked by [`SignedRequest`] and executed by an
//! [`ExecutionDispatcher`], from the connected wallet or through a
//! [`Relayer`].
//!
//! Chain access is abstracted by [`ChainReader`] and [`Writer`], which are
//! implemented for alloy's [`FillProvider`].
//!
//! [`FillProvider`]: alloy::providers::fillers::FillProvider

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

mod capability;
pub use capability::{CapabilityError, Eip5267Report, ProbeOutcome, TokenCapabilityResolver};

mod dispatch;
pub use dispatch::{ExecutionDispatcher, ExecutionError, ExecutionReport, PermitExecution};

mod impls;

mod lifecycle;
pub use lifecycle::{
    ExecutionState, InvalidTransition, MacroCall, Recovery, SignedMacro, SignedPermit,
    SignedRequest,
};

mod nonce;
pub use nonce::{NonceScope, NonceTicket, NonceTracker};

mod permit;
pub use permit::{permit_domain, PermitError, PermitOptions, PermitTypedDataBuilder, PreparedPermit};

mod schedule;
pub use schedule::{
    build_typed_data, clear_signing_domain, compute_nonce_key, EncodedAction,
    FlowScheduleTypedDataBuilder, PreparedSchedule, ScheduleError,
};

mod sign;
pub use sign::{ActionKey, InFlightGuard, SignError, SigningGate};

mod traits;
pub use traits::{ChainReader, Confirmation, ReadError, Relayer, Writer};

pub mod watch;
