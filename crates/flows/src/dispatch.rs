use crate::{
    lifecycle::{
        ExecutionState, InvalidTransition, Recovery, SignedMacro, SignedPermit, SignedRequest,
    },
    Relayer, Writer,
};
use alloy::{
    primitives::{Address, Bytes, TxHash},
    sol_types::SolCall,
};
use clearsig_bindings::IOnly712MacroForwarder;
use clearsig_constants::{NetworkRegistry, StaticNetworks};
use clearsig_relay::{RelayClient, RelayError, RelayRequest};
use clearsig_types::ClearSigConfig;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Errors executing a signed request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// The transaction was never accepted by the node.
    #[error("failed to submit transaction: {0}")]
    NotSubmitted(#[source] Box<dyn core::error::Error + Send + Sync>),
    /// The transaction was included and reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    /// The transaction was sent but its receipt could not be obtained.
    #[error("receipt unavailable for {tx_hash}: {source}")]
    ReceiptUnavailable {
        /// The sent transaction.
        tx_hash: TxHash,
        /// The failed wait.
        #[source]
        source: Box<dyn core::error::Error + Send + Sync>,
    },
    /// The permit of a permit-and-transfer was sent, but the transfer was
    /// not.
    #[error("transfer not sent after permit {permit_hash}: {source}")]
    TransferPending {
        /// The permit transaction.
        permit_hash: TxHash,
        /// Why the transfer was not sent.
        #[source]
        source: Box<ExecutionError>,
    },
    /// The relayer could not be reached or answered unintelligibly.
    #[error("relay transport error: {0}")]
    RelayTransport(#[source] RelayError),
    /// The relayer refused the call.
    #[error("relayer rejected the call: {0}")]
    RelayRejected(String),
    /// No relayer is configured.
    #[error("no relayer configured")]
    RelayNotConfigured,
    /// The request is not in a state that allows this step.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl ExecutionError {
    /// Wrap a writer error from sending.
    pub fn not_submitted<E: core::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::NotSubmitted(Box::new(error))
    }

    /// How the request can be recovered, if at all.
    pub const fn recovery(&self) -> Option<Recovery> {
        match self {
            Self::NotSubmitted(_) => Some(Recovery::Resubmit),
            Self::Reverted(_) | Self::RelayRejected(_) => Some(Recovery::Resign),
            Self::ReceiptUnavailable { .. } => Some(Recovery::AwaitReceipt),
            Self::TransferPending { .. } => Some(Recovery::ContinueTransfer),
            Self::RelayTransport(_) => Some(Recovery::RetryRelay),
            Self::RelayNotConfigured | Self::InvalidTransition(_) => None,
        }
    }
}

impl From<RelayError> for ExecutionError {
    fn from(error: RelayError) -> Self {
        match error {
            RelayError::Rejected(message) => Self::RelayRejected(message),
            other => Self::RelayTransport(other),
        }
    }
}

/// How a signed permit is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PermitExecution {
    /// Submit `permit` only.
    #[default]
    PermitOnly,
    /// Submit `permit`, wait for it, then submit `transferFrom` for the
    /// permitted value.
    PermitAndTransfer,
}

/// A successful execution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// The request.
    pub request_id: Uuid,
    /// The chain executed on.
    pub chain_id: u64,
    /// The transaction.
    pub tx_hash: TxHash,
    /// Inclusion block, once confirmed.
    pub block_number: Option<u64>,
    /// Explorer link for the transaction, if the chain has an explorer.
    pub explorer_url: Option<String>,
}

/// Submits signed requests from the connected wallet or through a relayer.
#[derive(Debug, Clone)]
pub struct ExecutionDispatcher<W, Rl, Reg = StaticNetworks> {
    writer: W,
    relayer: Option<Rl>,
    networks: Reg,
}

impl<W, Rl> ExecutionDispatcher<W, Rl> {
    /// Create a dispatcher with the known explorer registry and no relayer.
    pub const fn new(writer: W) -> Self {
        Self { writer, relayer: None, networks: StaticNetworks::known() }
    }
}

impl<W> ExecutionDispatcher<W, RelayClient> {
    /// Create a dispatcher relaying through the configured relayer, if any.
    pub fn from_config(writer: W, config: &ClearSigConfig) -> Self {
        let relayer = config.relayer_url().cloned().map(RelayClient::new);
        Self { writer, relayer, networks: StaticNetworks::known() }
    }
}

impl<W, Rl, Reg> ExecutionDispatcher<W, Rl, Reg> {
    /// Set the relayer.
    pub fn with_relayer(mut self, relayer: Rl) -> Self {
        self.relayer = Some(relayer);
        self
    }

    /// Replace the explorer registry.
    pub fn with_networks<R2>(self, networks: R2) -> ExecutionDispatcher<W, Rl, R2> {
        ExecutionDispatcher { writer: self.writer, relayer: self.relayer, networks }
    }

    /// Get the writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Get the relayer, if configured.
    pub const fn relayer(&self) -> Option<&Rl> {
        self.relayer.as_ref()
    }

    /// Get the explorer registry.
    pub const fn networks(&self) -> &Reg {
        &self.networks
    }
}

impl<W, Rl, Reg> ExecutionDispatcher<W, Rl, Reg>
where
    W: Writer + Sync,
    Rl: Relayer + Sync,
    Reg: NetworkRegistry + Sync,
{
    fn report(
        &self,
        request_id: Uuid,
        chain_id: u64,
        tx_hash: TxHash,
        block_number: Option<u64>,
    ) -> ExecutionReport {
        ExecutionReport {
            request_id,
            chain_id,
            tx_hash,
            block_number,
            explorer_url: self.networks.explorer_tx_url(chain_id, tx_hash),
        }
    }

    async fn send_call<C: SolCall>(
        &self,
        to: Address,
        call: &C,
    ) -> Result<TxHash, ExecutionError> {
        self.writer
            .send(to, Bytes::from(call.abi_encode()))
            .await
            .inspect_err(|e| warn!(%e, %to, "failed to send transaction"))
            .map_err(ExecutionError::not_submitted)
    }

    async fn await_success(&self, tx_hash: TxHash) -> Result<Option<u64>, ExecutionError> {
        let confirmation = self
            .writer
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| ExecutionError::ReceiptUnavailable { tx_hash, source: Box::new(e) })?;
        if !confirmation.success {
            warn!(%tx_hash, "transaction reverted");
            return Err(ExecutionError::Reverted(tx_hash));
        }
        Ok(confirmation.block_number)
    }

    /// Record `error` on a wallet-submitted request and return it.
    fn fail_submit<P>(request: &mut SignedRequest<P>, error: ExecutionError) -> ExecutionError {
        // A rejected transition leaves the state as it was.
        let _ = request.fail(error.recovery(), error.to_string());
        error
    }

    /// Wait for the permit, then send `transferFrom`.
    async fn transfer_after_permit(
        &self,
        request: &mut SignedPermit,
        permit_hash: TxHash,
    ) -> Result<TxHash, ExecutionError> {
        let pending = |e: ExecutionError| ExecutionError::TransferPending {
            permit_hash,
            source: Box::new(e),
        };

        let block_number = match self.await_success(permit_hash).await {
            Ok(block_number) => block_number,
            Err(e @ ExecutionError::ReceiptUnavailable { .. }) => {
                return Err(Self::fail_submit(request, pending(e)))
            }
            Err(e) => return Err(Self::fail_submit(request, e)),
        };
        info!(%permit_hash, ?block_number, "permit confirmed");

        let params = *request.payload();
        let transfer = params.transfer_from_call();
        let tx_hash = match self.send_call(params.token_address, &transfer).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(Self::fail_submit(request, pending(e))),
        };
        request.record_submitted(tx_hash)?;
        info!(%tx_hash, "transfer submitted");
        Ok(tx_hash)
    }

    /// Submit a signed permit from the connected wallet.
    ///
    /// Returns once the final transaction is accepted by the node. In
    /// [`PermitExecution::PermitAndTransfer`] mode the permit must confirm
    /// successfully before `transferFrom` is sent; a reverted permit aborts
    /// the flow. If the transfer could not be sent, the request fails with
    /// [`Recovery::ContinueTransfer`] and is finished by
    /// [`Self::resume_transfer`].
    #[instrument(skip_all, fields(request_id = %request.id(), ?mode))]
    pub async fn submit_permit(
        &self,
        request: &mut SignedPermit,
        mode: PermitExecution,
    ) -> Result<ExecutionReport, ExecutionError> {
        request.begin_submit()?;
        let params = *request.payload();
        let permit = params.permit_call(request.signature());

        let mut tx_hash = match self.send_call(params.token_address, &permit).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(Self::fail_submit(request, e)),
        };
        request.record_submitted(tx_hash)?;
        info!(%tx_hash, "permit submitted");

        if mode == PermitExecution::PermitAndTransfer {
            tx_hash = self.transfer_after_permit(request, tx_hash).await?;
        }

        Ok(self.report(request.id(), request.chain_id(), tx_hash, None))
    }

    /// Finish a permit-and-transfer whose transfer was never sent: wait for
    /// the permit again, then send `transferFrom`.
    ///
    /// Only a request that failed with [`Recovery::ContinueTransfer`] can be
    /// resumed. The permit is never sent again.
    #[instrument(skip_all, fields(request_id = %request.id()))]
    pub async fn resume_transfer(
        &self,
        request: &mut SignedPermit,
    ) -> Result<ExecutionReport, ExecutionError> {
        let permit_hash = request.resume_transfer()?;
        let tx_hash = self.transfer_after_permit(request, permit_hash).await?;
        Ok(self.report(request.id(), request.chain_id(), tx_hash, None))
    }

    /// Submit a signed macro call to the forwarder from the connected
    /// wallet.
    #[instrument(skip_all, fields(request_id = %request.id()))]
    pub async fn submit_macro(
        &self,
        request: &mut SignedMacro,
    ) -> Result<ExecutionReport, ExecutionError> {
        request.begin_submit()?;
        let payload = request.payload();
        let call = IOnly712MacroForwarder::runMacroCall {
            m: payload.macro_address,
            params: payload.params.clone(),
            signer: payload.signer,
            signature: Bytes::copy_from_slice(&request.signature().to_bytes()),
        };

        let tx_hash = match self.send_call(payload.forwarder, &call).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(Self::fail_submit(request, e)),
        };
        request.record_submitted(tx_hash)?;
        info!(%tx_hash, "macro submitted");

        Ok(self.report(request.id(), request.chain_id(), tx_hash, None))
    }

    /// Wait for a submitted request's transaction and record the outcome.
    ///
    /// A request whose receipt was previously unavailable is awaited again.
    /// A permit-and-transfer waiting on [`Recovery::ContinueTransfer`] is
    /// rejected; it has not sent its transfer yet.
    #[instrument(skip_all, fields(request_id = %request.id()))]
    pub async fn confirm<P>(
        &self,
        request: &mut SignedRequest<P>,
    ) -> Result<ExecutionReport, ExecutionError> {
        if matches!(
            request.state(),
            ExecutionState::Failed { recovery: Some(Recovery::AwaitReceipt), .. }
        ) {
            request.resume_pending()?;
        }
        let Some(tx_hash) = request.state().tx_hash().filter(|_| !request.state().is_terminal())
        else {
            return Err(InvalidTransition { from: request.state().name(), to: "Confirmed" }.into());
        };

        let block_number = match self.await_success(tx_hash).await {
            Ok(block_number) => block_number,
            Err(e) => return Err(Self::fail_submit(request, e)),
        };
        request.confirm(block_number)?;
        info!(%tx_hash, ?block_number, "confirmed");

        Ok(self.report(request.id(), request.chain_id(), tx_hash, block_number))
    }

    /// Submit and confirm a signed permit.
    pub async fn execute_permit(
        &self,
        request: &mut SignedPermit,
        mode: PermitExecution,
    ) -> Result<ExecutionReport, ExecutionError> {
        self.submit_permit(request, mode).await?;
        self.confirm(request).await
    }

    /// Submit and confirm a signed macro call.
    pub async fn execute_macro(
        &self,
        request: &mut SignedMacro,
    ) -> Result<ExecutionReport, ExecutionError> {
        self.submit_macro(request).await?;
        self.confirm(request).await
    }

    /// Send a signed macro call to the relayer.
    ///
    /// The returned hash is of the relayer's transaction, which is not yet
    /// confirmed.
    #[instrument(skip_all, fields(request_id = %request.id()))]
    pub async fn relay_macro(
        &self,
        request: &mut SignedMacro,
    ) -> Result<ExecutionReport, ExecutionError> {
        let relayer = self.relayer.as_ref().ok_or(ExecutionError::RelayNotConfigured)?;
        request.begin_relay()?;

        let payload = request.payload();
        let relay_request = RelayRequest::new(
            payload.macro_address,
            payload.params.clone(),
            payload.signer,
            request.signature(),
        );

        match relayer.relay(relay_request).await {
            Ok(tx_hash) => {
                request.relay_accepted(tx_hash)?;
                info!(%tx_hash, "relayed");
                Ok(self.report(request.id(), request.chain_id(), tx_hash, None))
            }
            Err(e) => {
                let error = ExecutionError::from(e);
                warn!(%error, "relay failed");
                request.relay_failed(error.recovery(), error.to_string())?;
                Err(error)
            }
        }
    }
}
