use alloy::{
    dyn_abi::TypedData,
    primitives::{Address, B256},
    sol_types::{Eip712Domain, SolStruct},
};
use serde::Serialize;
use std::borrow::Cow;

/// The exact domain and message that a signer hashes and signs.
///
/// The field order and numeric encoding of `T` are fixed by its
/// [`SolStruct`] definition, so the envelope's signing hash is fully
/// determined by `domain` and `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDataEnvelope<T> {
    domain: Eip712Domain,
    message: T,
}

impl<T> TypedDataEnvelope<T> {
    /// Create a new envelope.
    pub const fn new(domain: Eip712Domain, message: T) -> Self {
        Self { domain, message }
    }

    /// Get the domain.
    pub const fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Get the message.
    pub const fn message(&self) -> &T {
        &self.message
    }

    /// Decompose into domain and message.
    pub fn into_parts(self) -> (Eip712Domain, T) {
        (self.domain, self.message)
    }

    /// Get the domain's chain id.
    pub fn chain_id(&self) -> Option<u64> {
        self.domain.chain_id.map(|id| id.saturating_to())
    }

    /// Get the domain's verifying contract.
    pub const fn verifying_contract(&self) -> Option<Address> {
        self.domain.verifying_contract
    }
}

impl<T: SolStruct> TypedDataEnvelope<T> {
    /// Name of the primary type.
    pub fn primary_type(&self) -> &'static str {
        T::NAME
    }

    /// The EIP-712 `encodeType` string of the primary type, including
    /// referenced structs.
    pub fn encode_type(&self) -> Cow<'static, str> {
        T::eip712_encode_type()
    }

    /// The EIP-712 digest: `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`.
    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain)
    }

    /// Render as `eth_signTypedData_v4` typed data.
    pub fn to_typed_data(&self) -> TypedData
    where
        T: Serialize,
    {
        TypedData::from_struct(&self.message, Some(self.domain.clone()))
    }
}
