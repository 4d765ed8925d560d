//! Relayer client.
//!
//! A relayer accepts a signed macro call as `POST /relay` and submits it as
//! an on-chain transaction, paying gas itself. Transport failures (network
//! errors, non-2xx responses) are reported separately from relayer-reported
//! rejections so callers can retry the former with the same signature.

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

/// The [`RelayClient`].
pub mod client;
pub use client::RelayClient;

mod error;
pub use error::{RelayError, Result};

/// Request and response bodies for the relayer.
pub mod types;
pub use types::{RelayRequest, RelayResponse};
