use crate::{ChainReader, ReadError};
use alloy::{primitives::Address, sol_types::Eip712Domain};
use clearsig_bindings::{IERC20Permit, IERC5267};
use clearsig_constants::{DomainOverride, DomainOverrides};
use clearsig_types::TokenMetadata;
use tracing::{debug, instrument, warn};

/// Errors resolving what a token supports.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CapabilityError {
    /// A metadata read failed. The address may not be a token, or the chain
    /// may be unreachable.
    #[error("metadata unavailable for {token}: {source}")]
    MetadataUnavailable {
        /// The token.
        token: Address,
        /// The failed read.
        #[source]
        source: ReadError,
    },
    /// The reader's chain id could not be read.
    #[error("failed to read chain id: {0}")]
    ChainId(#[source] ReadError),
    /// The reader is connected to a different chain than the one metadata
    /// was requested for.
    #[error("connected to chain {actual}, expected {expected}")]
    ChainMismatch {
        /// The requested chain.
        expected: u64,
        /// The reader's chain.
        actual: u64,
    },
    /// A capability probe failed for a reason other than the call
    /// reverting, so support is unknown.
    #[error("could not determine {probe} support for {token}: {source}")]
    Indeterminate {
        /// The token.
        token: Address,
        /// The probed capability.
        probe: &'static str,
        /// The failed probe.
        #[source]
        source: ReadError,
    },
}

/// Result of a single capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    /// The call succeeded.
    Supported,
    /// The contract does not implement the call.
    Unsupported,
    /// Transport or node failure; support is unknown.
    Indeterminate,
}

impl ProbeOutcome {
    /// Classify a failed probe. Reverts, empty returns, and undecodable
    /// return data mean the function is absent. Anything else is
    /// indeterminate.
    pub const fn from_error(error: &ReadError) -> Self {
        match error {
            ReadError::Reverted(_) | ReadError::NoData | ReadError::Decode(_) => {
                Self::Unsupported
            }
            ReadError::Rpc(_) => Self::Indeterminate,
        }
    }

    /// Classify a failed EIP-5267 probe.
    ///
    /// Non-empty return data too short for the full domain tuple is treated
    /// as supported with no usable domain. Some tokens implement the
    /// selector with a truncated return. An empty return is unsupported.
    pub const fn from_eip5267_error(error: &ReadError) -> Self {
        if error.is_decode_range() {
            Self::Supported
        } else {
            Self::from_error(error)
        }
    }

    /// Classify a probe result.
    pub const fn classify<T>(result: &Result<T, ReadError>) -> Self {
        match result {
            Ok(_) => Self::Supported,
            Err(e) => Self::from_error(e),
        }
    }
}

/// Result of EIP-5267 domain introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip5267Report {
    /// Probe outcome.
    pub outcome: ProbeOutcome,
    /// The introspected domain, when it could be decoded.
    pub domain: Option<Eip712Domain>,
}

impl Eip5267Report {
    /// True if the token reported a usable domain.
    pub const fn has_domain(&self) -> bool {
        self.domain.is_some()
    }
}

/// Resolves token metadata and signing capabilities through a
/// [`ChainReader`].
#[derive(Debug, Clone)]
pub struct TokenCapabilityResolver<R> {
    reader: R,
    overrides: DomainOverrides,
}

impl<R> TokenCapabilityResolver<R> {
    /// Create a resolver using the known domain overrides.
    pub const fn new(reader: R) -> Self {
        Self { reader, overrides: DomainOverrides::known() }
    }

    /// Replace the domain overrides.
    pub fn with_overrides(mut self, overrides: DomainOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Get the reader.
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// Get the domain overrides.
    pub const fn overrides(&self) -> &DomainOverrides {
        &self.overrides
    }

    /// The domain override registered for `token` on `chain_id`, if any.
    pub fn domain_override(&self, chain_id: u64, token: Address) -> Option<&DomainOverride> {
        self.overrides.lookup(chain_id, token)
    }
}

impl<R> TokenCapabilityResolver<R>
where
    R: ChainReader + Sync,
{
    /// Read name, symbol, and decimals concurrently, along with the reader's
    /// chain id. Any failure fails the whole resolution, as does a reader
    /// connected to a chain other than `chain_id`.
    #[instrument(skip_all, fields(%token, chain_id = chain_id))]
    pub async fn resolve_metadata(
        &self,
        token: Address,
        chain_id: u64,
    ) -> Result<TokenMetadata, CapabilityError> {
        let unavailable = |source| CapabilityError::MetadataUnavailable { token, source };

        let (name, symbol, decimals, actual) = futures_util::try_join!(
            async { self.reader.read(token, IERC20Permit::nameCall {}).await.map_err(unavailable) },
            async {
                self.reader.read(token, IERC20Permit::symbolCall {}).await.map_err(unavailable)
            },
            async {
                self.reader.read(token, IERC20Permit::decimalsCall {}).await.map_err(unavailable)
            },
            async { self.reader.chain_id().await.map_err(CapabilityError::ChainId) },
        )
        .inspect_err(|e| warn!(%e, "failed to resolve token metadata"))?;

        if actual != chain_id {
            warn!(actual, "reader is on another chain");
            return Err(CapabilityError::ChainMismatch { expected: chain_id, actual });
        }

        debug!(%name, %symbol, decimals, "resolved token metadata");
        Ok(TokenMetadata::new(name, symbol, decimals))
    }

    /// Probe EIP-2612 support.
    ///
    /// Tries `nonces(0x0)` and falls back to `DOMAIN_SEPARATOR()`. Returns
    /// `false` only if both are definitively absent.
    #[instrument(skip_all, fields(%token))]
    pub async fn check_permit_support(&self, token: Address) -> Result<bool, CapabilityError> {
        let nonces_err = match self
            .reader
            .read(token, IERC20Permit::noncesCall { owner: Address::ZERO })
            .await
        {
            Ok(_) => return Ok(true),
            Err(e) => e,
        };
        let separator_err =
            match self.reader.read(token, IERC20Permit::DOMAIN_SEPARATORCall {}).await {
                Ok(_) => return Ok(true),
                Err(e) => e,
            };

        match (ProbeOutcome::from_error(&nonces_err), ProbeOutcome::from_error(&separator_err)) {
            (ProbeOutcome::Unsupported, ProbeOutcome::Unsupported) => {
                debug!("token does not implement permit");
                Ok(false)
            }
            (ProbeOutcome::Unsupported, _) => Err(CapabilityError::Indeterminate {
                token,
                probe: "EIP-2612",
                source: separator_err,
            }),
            _ => Err(CapabilityError::Indeterminate {
                token,
                probe: "EIP-2612",
                source: nonces_err,
            }),
        }
    }

    /// Introspect the token's EIP-712 domain. Never fails; transport errors
    /// are reported as [`ProbeOutcome::Indeterminate`].
    #[instrument(skip_all, fields(%token))]
    pub async fn eip5267_report(&self, token: Address) -> Eip5267Report {
        let result = self.reader.read(token, IERC5267::eip712DomainCall {}).await;
        let (outcome, domain) = match result {
            Ok(ret) => (ProbeOutcome::Supported, Some(ret.to_domain())),
            Err(e) => {
                let outcome = ProbeOutcome::from_eip5267_error(&e);
                debug!(%e, ?outcome, "no EIP-5267 domain");
                (outcome, None)
            }
        };
        Eip5267Report { outcome, domain }
    }

    /// Probe EIP-5267 support.
    pub async fn check_eip5267(&self, token: Address) -> Result<bool, CapabilityError> {
        let Err(e) = self.reader.read(token, IERC5267::eip712DomainCall {}).await else {
            return Ok(true);
        };
        match ProbeOutcome::from_eip5267_error(&e) {
            ProbeOutcome::Supported => Ok(true),
            ProbeOutcome::Unsupported => Ok(false),
            ProbeOutcome::Indeterminate => {
                Err(CapabilityError::Indeterminate { token, probe: "EIP-5267", source: e })
            }
        }
    }
}
