use crate::{ChainReader, ReadError};
use alloy::{primitives::Address, signers::Signer, sol_types::SolStruct};
use clearsig_types::{SignatureParts, TypedDataEnvelope};
use parking_lot::Mutex;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, instrument, warn};

/// Errors requesting a signature.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SignError {
    /// The typed data has no chain id to check against.
    #[error("typed data domain has no chain id")]
    MissingChainId,
    /// The connected chain could not be read.
    #[error("failed to read chain id: {0}")]
    ChainId(#[source] ReadError),
    /// The wallet is on a different chain than the typed data.
    #[error("wallet is on chain {actual}, typed data is for chain {expected}")]
    ChainMismatch {
        /// The typed data's chain.
        expected: u64,
        /// The wallet's chain.
        actual: u64,
    },
    /// A signature for the same action is already pending.
    #[error("a {primary_type} signature for {verifying_contract} is already in flight")]
    AlreadyInFlight {
        /// The primary type being signed.
        primary_type: &'static str,
        /// The verifying contract.
        verifying_contract: Address,
    },
    /// The signer refused or failed to sign.
    #[error("signer rejected the request: {0}")]
    SignerRejected(#[source] alloy::signers::Error),
}

/// A logical action a signer may have at most one pending signature for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKey {
    /// The signing account.
    pub signer: Address,
    /// The typed data's verifying contract.
    pub verifying_contract: Address,
    /// The typed data's primary type.
    pub primary_type: &'static str,
}

/// Marks an action as in flight until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<ActionKey>>>,
    key: ActionKey,
}

impl InFlightGuard {
    /// Get the guarded action.
    pub const fn key(&self) -> &ActionKey {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}

/// Requests signatures over typed data, at most one per [`ActionKey`] at a
/// time.
///
/// The gate checks that the connected chain still matches the typed data's
/// domain immediately before the signer is invoked.
#[derive(Debug, Clone, Default)]
pub struct SigningGate {
    in_flight: Arc<Mutex<HashSet<ActionKey>>>,
}

impl SigningGate {
    /// Create a new gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a signature for `key` is pending.
    pub fn is_in_flight(&self, key: &ActionKey) -> bool {
        self.in_flight.lock().contains(key)
    }

    /// Mark `key` as in flight.
    pub fn try_acquire(&self, key: ActionKey) -> Result<InFlightGuard, SignError> {
        if !self.in_flight.lock().insert(key) {
            return Err(SignError::AlreadyInFlight {
                primary_type: key.primary_type,
                verifying_contract: key.verifying_contract,
            });
        }
        Ok(InFlightGuard { in_flight: self.in_flight.clone(), key })
    }

    /// Sign `envelope` with `signer`.
    ///
    /// Fails with [`SignError::ChainMismatch`] if either the reader or the
    /// signer reports a chain other than the envelope's.
    #[instrument(skip_all, fields(signer = %signer.address(), primary_type = T::NAME))]
    pub async fn sign_typed_data<S, R, T>(
        &self,
        signer: &S,
        reader: &R,
        envelope: &TypedDataEnvelope<T>,
    ) -> Result<SignatureParts, SignError>
    where
        S: Signer + Sync,
        R: ChainReader + Sync,
        T: SolStruct + Send + Sync,
    {
        let expected = envelope.chain_id().ok_or(SignError::MissingChainId)?;
        let actual = reader.chain_id().await.map_err(SignError::ChainId)?;
        if actual != expected {
            warn!(expected, actual, "refusing to sign for a different chain");
            return Err(SignError::ChainMismatch { expected, actual });
        }
        if let Some(actual) = signer.chain_id().filter(|id| *id != expected) {
            warn!(expected, actual, "signer is bound to a different chain");
            return Err(SignError::ChainMismatch { expected, actual });
        }

        let _guard = self.try_acquire(ActionKey {
            signer: signer.address(),
            verifying_contract: envelope.verifying_contract().unwrap_or_default(),
            primary_type: T::NAME,
        })?;

        debug!(digest = %envelope.signing_hash(), "requesting signature");
        let signature = signer
            .sign_typed_data(envelope.message(), envelope.domain())
            .await
            .inspect_err(|e| warn!(%e, "signer rejected"))
            .map_err(SignError::SignerRejected)?;

        Ok(signature.into())
    }
}
