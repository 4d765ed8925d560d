//! A scriptable [`ChainReader`].
use alloy::{
    primitives::{Address, Bytes},
    sol_types::{abi::TokenSeq, SolCall, SolType, SolValue},
};
use clearsig_flows::{ChainReader, ReadError};
use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

/// A node-level error produced by the mock.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct MockRpcError(pub String);

/// The scripted outcome of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Return this data.
    Return(Bytes),
    /// Revert with this data.
    Revert(Bytes),
    /// Fail at the transport level.
    Rpc(String),
}

impl MockResponse {
    /// Return a single ABI-encoded value.
    pub fn value<T: SolValue>(value: &T) -> Self {
        Self::Return(value.abi_encode().into())
    }

    /// Return several ABI-encoded values.
    pub fn params<T>(values: &T) -> Self
    where
        T: SolValue,
        for<'a> <T::SolType as SolType>::Token<'a>: TokenSeq<'a>,
    {
        Self::Return(values.abi_encode_params().into())
    }

    /// Revert with no data.
    pub fn revert() -> Self {
        Self::Revert(Bytes::new())
    }

    /// Fail with a transport error.
    pub fn rpc(message: &str) -> Self {
        Self::Rpc(message.to_string())
    }

    fn into_result(self) -> Result<Bytes, ReadError> {
        match self {
            Self::Return(data) => Ok(data),
            Self::Revert(data) => Err(ReadError::Reverted(data)),
            Self::Rpc(message) => Err(ReadError::rpc(MockRpcError(message))),
        }
    }
}

type Responder = Arc<dyn Fn(&[u8]) -> MockResponse + Send + Sync>;

#[derive(Default)]
struct ReaderState {
    chain_id: Option<u64>,
    exact: HashMap<(Address, Bytes), MockResponse>,
    selectors: HashMap<(Address, [u8; 4]), Responder>,
    delays: HashMap<(Address, [u8; 4]), VecDeque<Duration>>,
    calls: Vec<(Address, Bytes)>,
}

/// A [`ChainReader`] answering from scripted responses.
///
/// A call is answered by an exact `(to, input)` match first, then by a
/// `(to, selector)` responder. Unscripted calls revert with no data, as a
/// call to a missing function would.
#[derive(Clone, Default)]
pub struct MockChainReader {
    state: Arc<Mutex<ReaderState>>,
}

impl fmt::Debug for MockChainReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("MockChainReader")
            .field("chain_id", &state.chain_id)
            .field("calls", &state.calls.len())
            .finish_non_exhaustive()
    }
}

impl MockChainReader {
    /// Create a reader connected to `chain_id`.
    pub fn new(chain_id: u64) -> Self {
        let reader = Self::default();
        reader.set_chain_id(chain_id);
        reader
    }

    /// Switch chains.
    pub fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().chain_id = Some(chain_id);
    }

    /// Make chain id reads fail.
    pub fn disconnect(&self) {
        self.state.lock().unwrap().chain_id = None;
    }

    /// Answer exactly this call.
    pub fn on_call<C: SolCall>(&self, to: Address, call: &C, response: MockResponse) -> &Self {
        self.state.lock().unwrap().exact.insert((to, call.abi_encode().into()), response);
        self
    }

    /// Answer every call of `C` to `to`.
    pub fn on<C: SolCall>(&self, to: Address, response: MockResponse) -> &Self {
        self.respond_with(to, C::SELECTOR, move |_| response.clone())
    }

    /// Answer every call with this selector using `f`, which receives the
    /// full calldata.
    pub fn respond_with<F>(&self, to: Address, selector: [u8; 4], f: F) -> &Self
    where
        F: Fn(&[u8]) -> MockResponse + Send + Sync + 'static,
    {
        self.state.lock().unwrap().selectors.insert((to, selector), Arc::new(f));
        self
    }

    /// Delay the next call of `C` to `to`.
    pub fn delay_next<C: SolCall>(&self, to: Address, delay: Duration) -> &Self {
        self.state
            .lock()
            .unwrap()
            .delays
            .entry((to, C::SELECTOR))
            .or_default()
            .push_back(delay);
        self
    }

    /// All calls made, in order.
    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls of `C` made to `to`, decoded.
    pub fn calls_of<C: SolCall>(&self, to: Address) -> Vec<C> {
        self.calls()
            .into_iter()
            .filter(|(addr, input)| *addr == to && input.starts_with(&C::SELECTOR))
            .map(|(_, input)| C::abi_decode(&input).unwrap())
            .collect()
    }
}

impl ChainReader for MockChainReader {
    async fn chain_id(&self) -> Result<u64, ReadError> {
        self.state
            .lock()
            .unwrap()
            .chain_id
            .ok_or_else(|| ReadError::rpc(MockRpcError("disconnected".into())))
    }

    async fn call_raw(&self, to: Address, input: Bytes) -> Result<Bytes, ReadError> {
        let selector: [u8; 4] = input.get(..4).and_then(|s| s.try_into().ok()).unwrap_or_default();
        let (delay, exact, responder) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((to, input.clone()));
            let delay =
                state.delays.get_mut(&(to, selector)).and_then(|delays| delays.pop_front());
            let exact = state.exact.get(&(to, input.clone())).cloned();
            let responder = state.selectors.get(&(to, selector)).cloned();
            (delay, exact, responder)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        exact
            .or_else(|| responder.map(|f| f(&input[..])))
            .unwrap_or_else(MockResponse::revert)
            .into_result()
    }
}
