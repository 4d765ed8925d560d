//! Solidity bindings for the contracts touched by the clear-signing flows.
//!
//! - [`IERC20Permit`]: ERC-20 metadata, EIP-2612 `permit`, and `transferFrom`.
//! - [`IERC5267`]: on-chain EIP-712 domain introspection.
//! - [`IFlowScheduler712Macro`]: the flow scheduler macro's description and
//!   parameter encoder.
//! - [`IOnly712MacroForwarder`]: the forwarder that executes signed macros.
//!
//! The EIP-712 message structs ([`Permit`], [`ScheduleFlow`], [`Action`],
//! [`Security`]) are defined in this crate so that their type strings are
//! fixed in one place.
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

mod bindings;
pub use bindings::{IFlowScheduler712Macro, IOnly712MacroForwarder, IERC20Permit, IERC5267};

mod eip712;
pub use eip712::{Action, Permit, ScheduleFlow, Security};
