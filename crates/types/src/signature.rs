use alloy::primitives::{Signature, B256};
use std::{fmt, str::FromStr};

/// Length of a raw ECDSA signature: `r ‖ s ‖ v`.
const SIGNATURE_LEN: usize = 65;

/// Errors from decoding a signature string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The signature is not 65 bytes long.
    #[error("malformed signature: expected 65 bytes, got {0}")]
    MalformedSignature(usize),
    /// The signature is not valid hex.
    #[error("malformed signature: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// The bytes do not form a valid secp256k1 signature.
    #[error("malformed signature: {0}")]
    InvalidComponents(String),
}

/// A 65-byte ECDSA signature split into its components.
///
/// The layout is fixed: bytes `[0, 32)` are `r`, `[32, 64)` are `s`, and
/// byte `64` is `v`. `v` is carried as-is; no normalization between the
/// `0/1` and `27/28` conventions is applied, so [`SignatureParts::join`]
/// reproduces its input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SignatureParts {
    /// First 32 bytes.
    pub r: B256,
    /// Second 32 bytes.
    pub s: B256,
    /// Recovery byte.
    pub v: u8,
}

impl SignatureParts {
    /// Create from components.
    pub const fn new(r: B256, s: B256, v: u8) -> Self {
        Self { r, s, v }
    }

    /// Split a hex signature string, with or without a `0x` prefix.
    pub fn split(signature: &str) -> Result<Self, SignatureError> {
        let hex_str = signature.strip_prefix("0x").unwrap_or(signature);
        let bytes = hex::decode(hex_str)?;
        Self::from_slice(&bytes)
    }

    /// Split a raw 65-byte signature.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let bytes: &[u8; SIGNATURE_LEN] =
            bytes.try_into().map_err(|_| SignatureError::MalformedSignature(bytes.len()))?;
        Ok(Self::from_array(bytes))
    }

    /// Split a raw 65-byte signature.
    pub fn from_array(bytes: &[u8; SIGNATURE_LEN]) -> Self {
        Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    /// Recompose the raw 65 bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    /// Join into the canonical `0x`-prefixed, lowercase, 130-hex-char form.
    pub fn join(&self) -> String {
        hex::encode_prefixed(self.to_bytes())
    }

    /// Parse into an alloy [`Signature`]. Accepts `v` in either the `0/1`
    /// or `27/28` convention.
    pub fn to_signature(&self) -> Result<Signature, SignatureError> {
        Signature::from_raw(&self.to_bytes())
            .map_err(|e| SignatureError::InvalidComponents(e.to_string()))
    }
}

impl From<Signature> for SignatureParts {
    fn from(signature: Signature) -> Self {
        Self::from_array(&signature.as_bytes())
    }
}

impl From<&Signature> for SignatureParts {
    fn from(signature: &Signature) -> Self {
        Self::from_array(&signature.as_bytes())
    }
}

impl FromStr for SignatureParts {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::split(s)
    }
}

impl fmt::Display for SignatureParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}
