use alloy::{
    primitives::{Address, Bytes, TxHash},
    sol_types::SolCall,
    transports::TransportError,
};
use clearsig_relay::{RelayError, RelayRequest};
use core::future::Future;

/// Errors from a read-only contract call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReadError {
    /// The call reverted, with the revert data if the node returned it.
    #[error("call reverted")]
    Reverted(Bytes),
    /// The call returned no data where outputs were expected. The address
    /// has no code, or its fallback accepted the call.
    #[error("call returned no data")]
    NoData,
    /// The call returned data that does not decode as the expected outputs.
    #[error("failed to decode return data: {0}")]
    Decode(#[from] alloy::sol_types::Error),
    /// The node could not be reached or returned a non-revert error.
    #[error("rpc error: {0}")]
    Rpc(#[source] Box<dyn core::error::Error + Send + Sync>),
}

impl ReadError {
    /// Wrap a transport-level error.
    pub fn rpc<E: core::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Rpc(Box::new(error))
    }

    /// Classify a JSON-RPC error. Execution errors (code 3, or a message
    /// mentioning a revert) become [`ReadError::Reverted`].
    pub fn from_rpc(error: TransportError) -> Self {
        if let Some(payload) = error.as_error_resp() {
            if payload.code == 3 || payload.message.to_lowercase().contains("revert") {
                let data = payload.as_revert_data().unwrap_or_default();
                return Self::Reverted(data);
            }
        }
        Self::rpc(error)
    }

    /// True if the call reverted.
    pub const fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted(_))
    }

    /// True if non-empty return data was shorter than the expected outputs.
    pub const fn is_decode_range(&self) -> bool {
        matches!(self, Self::Decode(alloy::sol_types::Error::Overrun))
    }
}

/// Read-only contract calls against one chain.
pub trait ChainReader {
    /// The chain the reader is currently connected to.
    fn chain_id(&self) -> impl Future<Output = Result<u64, ReadError>> + Send;

    /// Execute an `eth_call` and return the raw output.
    fn call_raw(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, ReadError>> + Send;

    /// Execute a typed call and decode its return value.
    fn read<C>(
        &self,
        to: Address,
        call: C,
    ) -> impl Future<Output = Result<C::Return, ReadError>> + Send
    where
        Self: Sync,
        C: SolCall + Send,
    {
        async move {
            let output = self.call_raw(to, call.abi_encode().into()).await?;
            C::abi_decode_returns(&output).map_err(|e| {
                if output.is_empty() {
                    ReadError::NoData
                } else {
                    e.into()
                }
            })
        }
    }
}

/// Inclusion status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Confirmation {
    /// The transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// False if the transaction reverted.
    pub success: bool,
}

/// State-changing calls sent from the connected wallet.
pub trait Writer {
    /// The error type returned by write operations.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Sign and broadcast a call, returning its hash as soon as the node
    /// accepts it.
    fn send(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<TxHash, Self::Error>> + Send;

    /// Wait until the transaction is included.
    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Confirmation, Self::Error>> + Send;
}

/// Submits signed macro calls through a third party.
pub trait Relayer {
    /// Relay a signed call. Returns the hash of the submitted transaction.
    fn relay(
        &self,
        request: RelayRequest,
    ) -> impl Future<Output = Result<TxHash, RelayError>> + Send;
}
