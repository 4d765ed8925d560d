use crate::{CapabilityError, ChainReader, Eip5267Report, ReadError, TokenCapabilityResolver};
use alloy::{
    primitives::{Address, U256},
    sol_types::Eip712Domain,
};
use clearsig_bindings::{IERC20Permit, Permit};
use clearsig_constants::{DomainOverrides, DEFAULT_PERMIT_VERSION, PERMIT_VALIDITY_SECS};
use clearsig_types::{
    AmountError, HumanAmount, PermitParameters, TokenMetadata, TypedDataEnvelope,
};
use std::borrow::Cow;
use tracing::{debug, instrument};

/// Errors building a permit authorization.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PermitError {
    /// Metadata or capability resolution failed.
    #[error(transparent)]
    Capability(CapabilityError),
    /// The token does not implement EIP-2612.
    #[error("token {0} does not support EIP-2612 permit")]
    PermitUnsupported(Address),
    /// The amount is not representable in the token's units.
    #[error(transparent)]
    Amount(#[from] AmountError),
    /// The owner's permit nonce could not be read.
    #[error("failed to read permit nonce: {0}")]
    NonceUnavailable(#[source] ReadError),
    /// The reader's chain id could not be read.
    #[error("failed to read chain id: {0}")]
    ChainId(#[source] ReadError),
    /// The reader is connected to a different chain.
    #[error("connected to chain {actual}, expected {expected}")]
    ChainMismatch {
        /// The requested chain.
        expected: u64,
        /// The reader's chain.
        actual: u64,
    },
}

impl From<CapabilityError> for PermitError {
    fn from(error: CapabilityError) -> Self {
        match error {
            CapabilityError::ChainId(source) => Self::ChainId(source),
            CapabilityError::ChainMismatch { expected, actual } => {
                Self::ChainMismatch { expected, actual }
            }
            other => Self::Capability(other),
        }
    }
}

/// Options for permit construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitOptions {
    /// Fixed deadline. If unset, the deadline is `now + validity`.
    pub deadline: Option<u64>,
    /// Seconds the permit stays valid when no deadline is fixed.
    pub validity: u64,
}

impl Default for PermitOptions {
    fn default() -> Self {
        Self { deadline: None, validity: PERMIT_VALIDITY_SECS }
    }
}

impl PermitOptions {
    /// Fix the deadline.
    pub const fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the validity window.
    pub const fn with_validity(mut self, validity: u64) -> Self {
        self.validity = validity;
        self
    }

    /// The deadline for a permit built at `now`.
    pub const fn deadline_at(&self, now: u64) -> u64 {
        match self.deadline {
            Some(deadline) => deadline,
            None => now.saturating_add(self.validity),
        }
    }
}

/// A permit ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPermit {
    envelope: TypedDataEnvelope<Permit>,
    params: PermitParameters,
    metadata: TokenMetadata,
}

impl PreparedPermit {
    /// Get the typed data to sign.
    pub const fn envelope(&self) -> &TypedDataEnvelope<Permit> {
        &self.envelope
    }

    /// Get the permit parameters.
    pub const fn params(&self) -> &PermitParameters {
        &self.params
    }

    /// Get the token metadata.
    pub const fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Decompose into envelope, parameters, and metadata.
    pub fn into_parts(self) -> (TypedDataEnvelope<Permit>, PermitParameters, TokenMetadata) {
        (self.envelope, self.params, self.metadata)
    }
}

/// Select the permit domain.
///
/// The version comes from a registered override, then the token's EIP-5267
/// domain, then `"1"`. The chain id comes from an override, then the
/// connected chain. The name comes from the EIP-5267 domain when it reports
/// one, then the token's `name()`.
pub fn permit_domain(
    token: Address,
    chain_id: u64,
    name: &str,
    overrides: &DomainOverrides,
    eip5267: Option<&Eip712Domain>,
) -> Eip712Domain {
    let entry = overrides.lookup(chain_id, token);

    let version = entry
        .and_then(|o| o.domain_version())
        .map(Cow::Borrowed)
        .or_else(|| eip5267.and_then(|d| d.version.clone()))
        .unwrap_or(Cow::Borrowed(DEFAULT_PERMIT_VERSION));
    let name = eip5267
        .and_then(|d| d.name.clone())
        .unwrap_or_else(|| Cow::Owned(name.to_owned()));
    let domain_chain_id = entry.and_then(|o| o.domain_chain_id()).unwrap_or(chain_id);

    Eip712Domain::new(
        Some(name),
        Some(version),
        Some(U256::from(domain_chain_id)),
        Some(token),
        None,
    )
}

/// Builds EIP-2612 permit typed data.
#[derive(Debug, Clone)]
pub struct PermitTypedDataBuilder<R> {
    resolver: TokenCapabilityResolver<R>,
    options: PermitOptions,
}

impl<R> PermitTypedDataBuilder<R> {
    /// Create a builder with default options.
    pub fn new(resolver: TokenCapabilityResolver<R>) -> Self {
        Self { resolver, options: PermitOptions::default() }
    }

    /// Set the options.
    pub const fn with_options(mut self, options: PermitOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the resolver.
    pub const fn resolver(&self) -> &TokenCapabilityResolver<R> {
        &self.resolver
    }

    /// Get the options.
    pub const fn options(&self) -> &PermitOptions {
        &self.options
    }
}

impl<R> PermitTypedDataBuilder<R>
where
    R: ChainReader + Sync,
{
    /// Build the permit typed data for `owner` approving `spender` to spend
    /// `amount` of `token`.
    ///
    /// Metadata with the connected chain id, the owner's nonce, and the
    /// EIP-5267 domain are read concurrently after permit support is
    /// confirmed.
    #[instrument(skip_all, fields(%token, %owner, %spender, chain_id = chain_id))]
    pub async fn build(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: &HumanAmount,
        chain_id: u64,
    ) -> Result<PreparedPermit, PermitError> {
        if amount.is_zero() {
            return Err(AmountError::Zero.into());
        }

        if !self.resolver.check_permit_support(token).await? {
            return Err(PermitError::PermitUnsupported(token));
        }

        let reader = self.resolver.reader();
        let (metadata, nonce, report) = futures_util::try_join!(
            async {
                self.resolver.resolve_metadata(token, chain_id).await.map_err(PermitError::from)
            },
            async {
                reader
                    .read(token, IERC20Permit::noncesCall { owner })
                    .await
                    .map_err(PermitError::NonceUnavailable)
            },
            async { Ok::<_, PermitError>(self.resolver.eip5267_report(token).await) },
        )?;

        let value = amount.to_units(metadata.decimals)?;
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let deadline = U256::from(self.options.deadline_at(now));

        let Eip5267Report { domain: reported, .. } = report;
        let domain = permit_domain(
            token,
            chain_id,
            &metadata.name,
            self.resolver.overrides(),
            reported.as_ref(),
        );
        let metadata = metadata.with_permit_support(true).with_eip5267(reported.is_some());

        let message = Permit { owner, spender, value, nonce, deadline };
        let envelope = TypedDataEnvelope::new(domain, message);
        debug!(digest = %envelope.signing_hash(), %nonce, %value, "built permit");

        let params =
            PermitParameters { owner, spender, value, deadline, token_address: token, chain_id };
        Ok(PreparedPermit { envelope, params, metadata })
    }
}
