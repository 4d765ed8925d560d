use alloy::primitives::{Address, Bytes, TxHash};
use clearsig_types::{PermitParameters, SignatureParts};
use uuid::Uuid;

/// How a failed request may be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// Submit the same signature again.
    Resubmit,
    /// Relay the same signature again.
    RetryRelay,
    /// Check the transaction later; it may still confirm.
    AwaitReceipt,
    /// The permit of a permit-and-transfer was sent but the transfer was
    /// not. Finish the permit, then send the transfer.
    ContinueTransfer,
    /// The signature is spent or refused. Sign again with fresh data.
    Resign,
}

/// Where a signed request is in its execution.
///
/// ```text
/// Signed -> Submitting -> Confirmed | Failed
/// Failed (AwaitReceipt | ContinueTransfer) -> Submitting
/// Signed -> RelaySubmitting -> RelayAccepted | RelayFailed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
    /// Signed, not yet submitted.
    Signed,
    /// Being submitted from the connected wallet. The hash is known once
    /// the node accepts the transaction.
    Submitting {
        /// The submitted transaction.
        tx_hash: Option<TxHash>,
    },
    /// Included and successful.
    Confirmed {
        /// The transaction.
        tx_hash: TxHash,
        /// The inclusion block.
        block_number: Option<u64>,
    },
    /// Submission or execution failed.
    Failed {
        /// The transaction, if one was sent.
        tx_hash: Option<TxHash>,
        /// How to recover.
        recovery: Option<Recovery>,
        /// The failure, rendered.
        reason: String,
    },
    /// Being sent to the relayer.
    RelaySubmitting,
    /// The relayer submitted a transaction.
    RelayAccepted {
        /// The relayed transaction.
        tx_hash: TxHash,
    },
    /// The relayer could not be reached or refused the call.
    RelayFailed {
        /// How to recover.
        recovery: Option<Recovery>,
        /// The failure, rendered.
        reason: String,
    },
}

impl ExecutionState {
    /// The state's name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Signed => "Signed",
            Self::Submitting { .. } => "Submitting",
            Self::Confirmed { .. } => "Confirmed",
            Self::Failed { .. } => "Failed",
            Self::RelaySubmitting => "RelaySubmitting",
            Self::RelayAccepted { .. } => "RelayAccepted",
            Self::RelayFailed { .. } => "RelayFailed",
        }
    }

    /// True for states no further transition leaves, short of an explicit
    /// retry.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Confirmed { .. }
                | Self::Failed { .. }
                | Self::RelayAccepted { .. }
                | Self::RelayFailed { .. }
        )
    }

    /// The most recent transaction hash, if any.
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Submitting { tx_hash } | Self::Failed { tx_hash, .. } => *tx_hash,
            Self::Confirmed { tx_hash, .. } | Self::RelayAccepted { tx_hash } => Some(*tx_hash),
            _ => None,
        }
    }
}

/// An attempted state transition that the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move from {from} to {to}")]
pub struct InvalidTransition {
    /// The current state.
    pub from: &'static str,
    /// The requested state.
    pub to: &'static str,
}

/// A signed permit.
pub type SignedPermit = SignedRequest<PermitParameters>;

/// A signed macro call.
pub type SignedMacro = SignedRequest<MacroCall>;

/// A signed `runMacro` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    /// The forwarder executing the macro.
    pub forwarder: Address,
    /// The macro.
    pub macro_address: Address,
    /// The forwarder-encoded params.
    pub params: Bytes,
    /// The account that signed.
    pub signer: Address,
}

/// A signature and the payload it authorizes, tracked through execution.
///
/// The payload and signature are fixed at construction. Only the state
/// changes, and only along the lifecycle's edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest<P> {
    id: Uuid,
    chain_id: u64,
    payload: P,
    signature: SignatureParts,
    state: ExecutionState,
}

impl<P> SignedRequest<P> {
    /// Create a request in the [`ExecutionState::Signed`] state.
    pub fn new(chain_id: u64, payload: P, signature: SignatureParts) -> Self {
        Self { id: Uuid::new_v4(), chain_id, payload, signature, state: ExecutionState::Signed }
    }

    /// Get the request id.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Get the chain the request was signed for.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the payload.
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Get the signature.
    pub const fn signature(&self) -> &SignatureParts {
        &self.signature
    }

    /// Get the current state.
    pub const fn state(&self) -> &ExecutionState {
        &self.state
    }

    fn invalid(&self, to: &'static str) -> InvalidTransition {
        InvalidTransition { from: self.state.name(), to }
    }

    /// `Signed -> Submitting`.
    pub fn begin_submit(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            ExecutionState::Signed => {
                self.state = ExecutionState::Submitting { tx_hash: None };
                Ok(())
            }
            _ => Err(self.invalid("Submitting")),
        }
    }

    /// Record the hash of the submitted transaction.
    pub fn record_submitted(&mut self, hash: TxHash) -> Result<(), InvalidTransition> {
        match &mut self.state {
            ExecutionState::Submitting { tx_hash } => {
                *tx_hash = Some(hash);
                Ok(())
            }
            _ => Err(self.invalid("Submitting")),
        }
    }

    /// `Submitting -> Confirmed`. Requires a recorded hash.
    pub fn confirm(&mut self, block_number: Option<u64>) -> Result<TxHash, InvalidTransition> {
        match self.state {
            ExecutionState::Submitting { tx_hash: Some(tx_hash) } => {
                self.state = ExecutionState::Confirmed { tx_hash, block_number };
                Ok(tx_hash)
            }
            _ => Err(self.invalid("Confirmed")),
        }
    }

    /// Return a request whose receipt could not be obtained to
    /// `Submitting`, so the same transaction can be awaited again.
    pub fn resume_pending(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            ExecutionState::Failed {
                tx_hash: Some(tx_hash),
                recovery: Some(Recovery::AwaitReceipt),
                ..
            } => {
                self.state = ExecutionState::Submitting { tx_hash: Some(tx_hash) };
                Ok(())
            }
            _ => Err(self.invalid("Submitting")),
        }
    }

    /// Return a permit-and-transfer request whose transfer was never sent
    /// to `Submitting` on its permit transaction. Returns the permit hash.
    pub fn resume_transfer(&mut self) -> Result<TxHash, InvalidTransition> {
        match self.state {
            ExecutionState::Failed {
                tx_hash: Some(tx_hash),
                recovery: Some(Recovery::ContinueTransfer),
                ..
            } => {
                self.state = ExecutionState::Submitting { tx_hash: Some(tx_hash) };
                Ok(tx_hash)
            }
            _ => Err(self.invalid("Submitting")),
        }
    }

    /// `Submitting -> Failed`.
    pub fn fail(
        &mut self,
        recovery: Option<Recovery>,
        reason: String,
    ) -> Result<(), InvalidTransition> {
        match self.state {
            ExecutionState::Submitting { tx_hash } => {
                self.state = ExecutionState::Failed { tx_hash, recovery, reason };
                Ok(())
            }
            _ => Err(self.invalid("Failed")),
        }
    }

    /// `Signed -> RelaySubmitting`.
    pub fn begin_relay(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            ExecutionState::Signed => {
                self.state = ExecutionState::RelaySubmitting;
                Ok(())
            }
            _ => Err(self.invalid("RelaySubmitting")),
        }
    }

    /// `RelaySubmitting -> RelayAccepted`.
    pub fn relay_accepted(&mut self, tx_hash: TxHash) -> Result<(), InvalidTransition> {
        match self.state {
            ExecutionState::RelaySubmitting => {
                self.state = ExecutionState::RelayAccepted { tx_hash };
                Ok(())
            }
            _ => Err(self.invalid("RelayAccepted")),
        }
    }

    /// `RelaySubmitting -> RelayFailed`.
    pub fn relay_failed(
        &mut self,
        recovery: Option<Recovery>,
        reason: String,
    ) -> Result<(), InvalidTransition> {
        match self.state {
            ExecutionState::RelaySubmitting => {
                self.state = ExecutionState::RelayFailed { recovery, reason };
                Ok(())
            }
            _ => Err(self.invalid("RelayFailed")),
        }
    }

    /// Return a failed request to [`ExecutionState::Signed`] so the same
    /// signature can be submitted or relayed again.
    ///
    /// Only failures whose recovery is [`Recovery::Resubmit`] or
    /// [`Recovery::RetryRelay`] can be retried. Nothing retries
    /// automatically.
    pub fn retry(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            ExecutionState::Failed { recovery: Some(Recovery::Resubmit), .. }
            | ExecutionState::RelayFailed { recovery: Some(Recovery::RetryRelay), .. } => {
                self.state = ExecutionState::Signed;
                Ok(())
            }
            _ => Err(self.invalid("Signed")),
        }
    }
}
