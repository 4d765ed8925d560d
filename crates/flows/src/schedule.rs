use crate::{ChainReader, NonceScope, NonceTracker, ReadError};
use alloy::{
    primitives::{aliases::U192, Address, Bytes, B256, U256},
    sol_types::Eip712Domain,
};
use clearsig_bindings::{IFlowScheduler712Macro, IOnly712MacroForwarder, ScheduleFlow};
use clearsig_constants::{
    CLEAR_SIGNING_NAME, CLEAR_SIGNING_VERSION, FLOW_SCHEDULER_NONCE_KEY, LANG_EN,
};
use clearsig_types::{
    FlowSchedulerDeployment, ScheduleFlowParams, ScheduleFlowSecurity, SecurityTemplate,
    TypedDataEnvelope,
};
use tracing::{debug, instrument, warn};

/// Errors building a flow schedule authorization.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ScheduleError {
    /// The forwarder nonce could not be read.
    #[error("failed to fetch forwarder nonce: {0}")]
    NonceUnavailable(#[source] ReadError),
    /// A newer nonce fetch started before this one finished.
    #[error("nonce fetch superseded by a newer request")]
    NonceSuperseded,
    /// The macro or forwarder failed to encode the action.
    #[error("{contract} failed to encode the action: {source}")]
    MacroEncodingFailed {
        /// The encoding contract.
        contract: Address,
        /// The failed read.
        #[source]
        source: ReadError,
    },
    /// The reader's chain id could not be read.
    #[error("failed to read chain id: {0}")]
    ChainId(#[source] ReadError),
    /// The reader is connected to a chain without this deployment.
    #[error("connected to chain {actual}, expected {expected}")]
    ChainMismatch {
        /// The deployment's chain.
        expected: u64,
        /// The reader's chain.
        actual: u64,
    },
}

/// The forwarder nonce key reserved for the flow scheduler macro.
pub const fn compute_nonce_key() -> U192 {
    FLOW_SCHEDULER_NONCE_KEY
}

/// The macro's rendering of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAction {
    /// Human-readable description, signed as part of the action.
    pub description: String,
    /// ABI-encoded action parameters.
    pub action_params: Bytes,
}

/// A flow schedule ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSchedule {
    envelope: TypedDataEnvelope<ScheduleFlow>,
    params: ScheduleFlowParams,
    security: ScheduleFlowSecurity,
    action: EncodedAction,
    run_macro_params: Bytes,
    deployment: FlowSchedulerDeployment,
}

impl PreparedSchedule {
    /// Get the typed data to sign.
    pub const fn envelope(&self) -> &TypedDataEnvelope<ScheduleFlow> {
        &self.envelope
    }

    /// Get the schedule parameters.
    pub const fn params(&self) -> &ScheduleFlowParams {
        &self.params
    }

    /// Get the security fields, including the nonce signed over.
    pub const fn security(&self) -> &ScheduleFlowSecurity {
        &self.security
    }

    /// Get the macro's description and action params.
    pub const fn action(&self) -> &EncodedAction {
        &self.action
    }

    /// Get the encoded parameters for `runMacro`.
    pub const fn run_macro_params(&self) -> &Bytes {
        &self.run_macro_params
    }

    /// Get the deployment.
    pub const fn deployment(&self) -> &FlowSchedulerDeployment {
        &self.deployment
    }
}

/// The `ClearSigning` domain for a forwarder.
pub fn clear_signing_domain(chain_id: u64, forwarder: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(CLEAR_SIGNING_NAME.into()),
        Some(CLEAR_SIGNING_VERSION.into()),
        Some(U256::from(chain_id)),
        Some(forwarder),
        None,
    )
}

/// Assemble the `ScheduleFlow` typed data. Performs no reads.
pub fn build_typed_data(
    params: &ScheduleFlowParams,
    security: &ScheduleFlowSecurity,
    description: String,
    chain_id: u64,
    forwarder: Address,
) -> TypedDataEnvelope<ScheduleFlow> {
    let message =
        ScheduleFlow { action: params.to_action(description), security: security.to_eip712() };
    TypedDataEnvelope::new(clear_signing_domain(chain_id, forwarder), message)
}

/// Builds flow schedule typed data against a forwarder deployment.
#[derive(Debug, Clone)]
pub struct FlowScheduleTypedDataBuilder<R> {
    reader: R,
    deployment: FlowSchedulerDeployment,
    lang: B256,
    nonces: NonceTracker,
}

impl<R> FlowScheduleTypedDataBuilder<R> {
    /// Create a builder rendering descriptions in English.
    pub fn new(reader: R, deployment: FlowSchedulerDeployment) -> Self {
        Self { reader, deployment, lang: LANG_EN, nonces: NonceTracker::new() }
    }

    /// Set the description language tag.
    pub const fn with_lang(mut self, lang: B256) -> Self {
        self.lang = lang;
        self
    }

    /// Share a nonce tracker with other builders.
    pub fn with_nonce_tracker(mut self, nonces: NonceTracker) -> Self {
        self.nonces = nonces;
        self
    }

    /// Get the reader.
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// Get the deployment.
    pub const fn deployment(&self) -> &FlowSchedulerDeployment {
        &self.deployment
    }

    /// Get the nonce tracker.
    pub const fn nonces(&self) -> &NonceTracker {
        &self.nonces
    }

    fn scope(&self, sender: Address) -> NonceScope {
        NonceScope {
            chain_id: self.deployment.chain_id(),
            forwarder: self.deployment.forwarder(),
            sender,
        }
    }
}

impl<R> FlowScheduleTypedDataBuilder<R>
where
    R: ChainReader + Sync,
{
    /// Read the forwarder's next nonce for `sender` under the flow
    /// scheduler key.
    #[instrument(skip(self), fields(forwarder = %self.deployment.forwarder()))]
    pub async fn fetch_next_nonce(&self, sender: Address) -> Result<U256, ScheduleError> {
        self.reader
            .read(
                self.deployment.forwarder(),
                IOnly712MacroForwarder::getNonceCall { sender, key: compute_nonce_key() },
            )
            .await
            .inspect_err(|e| warn!(%e, "failed to fetch nonce"))
            .map_err(ScheduleError::NonceUnavailable)
    }

    /// Fetch a nonce through the tracker. Fails with
    /// [`ScheduleError::NonceSuperseded`] if another fetch for this builder
    /// started in the meantime.
    pub async fn fetch_tracked_nonce(&self, sender: Address) -> Result<U256, ScheduleError> {
        let ticket = self.nonces.begin(self.scope(sender));
        let nonce = self.fetch_next_nonce(sender).await?;
        self.nonces.complete(ticket, nonce).ok_or(ScheduleError::NonceSuperseded)
    }

    /// Have the macro render the description and encode the action params.
    #[instrument(skip_all, fields(macro_address = %self.deployment.macro_address()))]
    pub async fn describe_and_encode_action(
        &self,
        params: &ScheduleFlowParams,
    ) -> Result<EncodedAction, ScheduleError> {
        let contract = self.deployment.macro_address();
        let ret = self
            .reader
            .read(
                contract,
                IFlowScheduler712Macro::encodeCreateFlowScheduleParamsCall {
                    lang: self.lang,
                    params: params.to_macro_params(),
                },
            )
            .await
            .inspect_err(|e| warn!(%e, "macro failed to encode action"))
            .map_err(|source| ScheduleError::MacroEncodingFailed { contract, source })?;

        debug!(struct_hash = %ret.structHash, description = %ret.description, "encoded action");
        Ok(EncodedAction { description: ret.description, action_params: ret.actionParams })
    }

    /// Have the forwarder encode the `runMacro` params.
    pub async fn encode_run_macro_params(
        &self,
        action_params: Bytes,
        security: &ScheduleFlowSecurity,
    ) -> Result<Bytes, ScheduleError> {
        let contract = self.deployment.forwarder();
        self.reader
            .read(
                contract,
                IOnly712MacroForwarder::encodeParamsCall {
                    actionParams: action_params,
                    security: security.to_forwarder(),
                },
            )
            .await
            .map_err(|source| ScheduleError::MacroEncodingFailed { contract, source })
    }

    /// Prepare a schedule for `sender` to sign.
    ///
    /// A fresh nonce is fetched on every call, so a re-signed schedule never
    /// reuses a nonce.
    #[instrument(skip_all, fields(%sender, chain_id = self.deployment.chain_id()))]
    pub async fn prepare(
        &self,
        sender: Address,
        params: ScheduleFlowParams,
        template: &SecurityTemplate,
    ) -> Result<PreparedSchedule, ScheduleError> {
        let expected = self.deployment.chain_id();
        let (action, nonce, actual) = futures_util::try_join!(
            self.describe_and_encode_action(&params),
            self.fetch_tracked_nonce(sender),
            async { self.reader.chain_id().await.map_err(ScheduleError::ChainId) },
        )?;
        if actual != expected {
            return Err(ScheduleError::ChainMismatch { expected, actual });
        }

        let security = template.with_nonce(nonce);
        let run_macro_params =
            self.encode_run_macro_params(action.action_params.clone(), &security).await?;

        let envelope = build_typed_data(
            &params,
            &security,
            action.description.clone(),
            expected,
            self.deployment.forwarder(),
        );
        debug!(digest = %envelope.signing_hash(), %nonce, "built flow schedule");

        Ok(PreparedSchedule {
            envelope,
            params,
            security,
            action,
            run_macro_params,
            deployment: self.deployment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::aliases::I96;
    use clearsig_constants::test_utils::{FORWARDER, RECEIVER, SUPER_TOKEN};

    fn params() -> ScheduleFlowParams {
        ScheduleFlowParams {
            super_token: SUPER_TOKEN,
            receiver: RECEIVER,
            start_date: 1_700_003_600,
            start_max_delay: 86_400,
            flow_rate: I96::try_from(11_574_074_074_074i64).unwrap(),
            start_amount: U256::ZERO,
            end_date: 1_700_604_800,
            user_data: Bytes::new(),
        }
    }

    #[test]
    fn nonce_key() {
        let key = U192::from_str_radix(
            "2995055424911519798788628137655321029873727805082771741933",
            10,
        )
        .unwrap();
        assert_eq!(compute_nonce_key(), key);
    }

    #[test]
    fn typed_data_is_pure() {
        let security = SecurityTemplate::default().with_nonce(U256::from(7));
        let a = build_typed_data(&params(), &security, "Schedule".into(), 11_155_420, FORWARDER);
        let b = build_typed_data(&params(), &security, "Schedule".into(), 11_155_420, FORWARDER);
        assert_eq!(a, b);
        assert_eq!(a.signing_hash(), b.signing_hash());

        assert_eq!(a.primary_type(), "ScheduleFlow");
        assert_eq!(a.domain().name.as_deref(), Some("ClearSigning"));
        assert_eq!(a.domain().version.as_deref(), Some("1"));
        assert_eq!(a.verifying_contract(), Some(FORWARDER));
        assert_eq!(a.message().security.nonce, U256::from(7));
        assert_eq!(a.message().action.description, "Schedule");
    }

    #[test]
    fn nonce_changes_digest() {
        let template = SecurityTemplate::default();
        let sign_with = |nonce: u64| {
            let security = template.with_nonce(U256::from(nonce));
            build_typed_data(&params(), &security, "d".into(), 1, FORWARDER)
        };
        let (a, b) = (sign_with(0), sign_with(1));
        assert_ne!(a.signing_hash(), b.signing_hash());
    }
}
