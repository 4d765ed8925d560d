use alloy::primitives::{Address, Bytes, TxHash};
use clearsig_types::SignatureParts;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Body of `POST /relay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// The macro the forwarder should run.
    #[serde(rename = "macro")]
    pub macro_address: Address,
    /// ABI-encoded `(actionParams, security)`.
    pub params: Bytes,
    /// The account that signed.
    pub signer: Address,
    /// The 65-byte signature.
    pub signature: Bytes,
}

impl RelayRequest {
    /// Create a new relay request.
    pub fn new(
        macro_address: Address,
        params: Bytes,
        signer: Address,
        signature: &SignatureParts,
    ) -> Self {
        Self {
            macro_address,
            params,
            signer,
            signature: Bytes::copy_from_slice(&signature.to_bytes()),
        }
    }
}

/// Status value of a relayer failure report.
const FAILED: &str = "failed";

/// A 2xx relayer response.
///
/// A body whose `status` is `"failed"` is a failure report even when it also
/// carries a `txHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelayResponse {
    /// The relayer submitted a transaction. Not yet confirmed.
    Accepted {
        /// Hash of the submitted transaction.
        #[serde(rename = "txHash")]
        tx_hash: TxHash,
    },
    /// The relayer reported a failure.
    Failed {
        /// `"failed"` for a failure report.
        status: String,
        /// The relayer's error message.
        #[serde(default)]
        error: String,
    },
}

#[derive(Deserialize)]
struct RawRelayResponse {
    #[serde(rename = "txHash")]
    tx_hash: Option<TxHash>,
    status: Option<String>,
    error: Option<String>,
}

impl<'de> Deserialize<'de> for RelayResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let RawRelayResponse { tx_hash, status, error } =
            RawRelayResponse::deserialize(deserializer)?;
        let error = error.unwrap_or_default();
        match (status, tx_hash) {
            (Some(status), _) if status == FAILED => Ok(Self::Failed { status, error }),
            (_, Some(tx_hash)) => Ok(Self::Accepted { tx_hash }),
            (Some(status), None) => Ok(Self::Failed { status, error }),
            (None, None) => Err(de::Error::custom("expected `txHash` or `status`")),
        }
    }
}

impl RelayResponse {
    /// Interpret the response: a tx hash, or the relayer's error message.
    pub fn into_result(self) -> Result<TxHash, String> {
        match self {
            Self::Accepted { tx_hash } => Ok(tx_hash),
            Self::Failed { error, .. } => Err(error),
        }
    }

    /// Get the tx hash, if the relayer accepted the call.
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Accepted { tx_hash } => Some(*tx_hash),
            Self::Failed { .. } => None,
        }
    }

    /// True if this is a failure report.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { status, .. } if status == FAILED)
    }
}

/// Body of a non-2xx relayer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RelayErrorBody {
    pub(crate) error: String,
}
