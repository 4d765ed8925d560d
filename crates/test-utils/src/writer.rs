//! A recording [`Writer`].
use alloy::{
    primitives::{keccak256, Address, Bytes, TxHash},
    sol_types::SolCall,
};
use clearsig_flows::{Confirmation, Writer};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

/// A write failure produced by the mock.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct MockWriteError(pub String);

/// A transaction sent through [`MockWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTx {
    /// The target.
    pub to: Address,
    /// The calldata.
    pub input: Bytes,
    /// The assigned hash.
    pub tx_hash: TxHash,
}

impl SentTx {
    /// Decode the calldata as `C`.
    pub fn decode<C: SolCall>(&self) -> C {
        C::abi_decode(&self.input).unwrap()
    }
}

#[derive(Debug, Default)]
struct WriterState {
    sent: Vec<SentTx>,
    receipts: HashMap<TxHash, Confirmation>,
    reverting: HashSet<[u8; 4]>,
    rejecting: HashSet<[u8; 4]>,
    reject_sends: Option<String>,
    withhold_receipts: bool,
    block: u64,
}

/// A [`Writer`] that records sent transactions and includes each in its
/// own block.
#[derive(Debug, Clone, Default)]
pub struct MockWriter {
    state: Arc<Mutex<WriterState>>,
}

impl MockWriter {
    /// Create a new mock writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every send with `message`, or accept again with `None`.
    pub fn reject_sends(&self, message: Option<&str>) {
        self.state.lock().unwrap().reject_sends = message.map(Into::into);
    }

    /// Reject sends of `C`, or accept them again.
    pub fn reject_calls<C: SolCall>(&self, reject: bool) {
        let mut state = self.state.lock().unwrap();
        if reject {
            state.rejecting.insert(C::SELECTOR);
        } else {
            state.rejecting.remove(&C::SELECTOR);
        }
    }

    /// Include calls of `C` as reverted.
    pub fn revert_calls<C: SolCall>(&self) {
        self.state.lock().unwrap().reverting.insert(C::SELECTOR);
    }

    /// Make receipt waits fail.
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state.lock().unwrap().withhold_receipts = withhold;
    }

    /// All sent transactions, in order.
    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }
}

impl Writer for MockWriter {
    type Error = MockWriteError;

    async fn send(&self, to: Address, input: Bytes) -> Result<TxHash, Self::Error> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.reject_sends {
            return Err(MockWriteError(message.clone()));
        }
        if input.get(..4).is_some_and(|s| state.rejecting.contains(s)) {
            return Err(MockWriteError("replacement transaction underpriced".into()));
        }

        state.block += 1;
        let block = state.block;
        let tx_hash = keccak256([to.as_slice(), &input[..], &block.to_be_bytes()[..]].concat());
        let success = input.get(..4).map_or(true, |s| !state.reverting.contains(s));

        let confirmation = Confirmation { tx_hash, block_number: Some(block), success };
        state.receipts.insert(tx_hash, confirmation);
        state.sent.push(SentTx { to, input, tx_hash });
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Confirmation, Self::Error> {
        let state = self.state.lock().unwrap();
        if state.withhold_receipts {
            return Err(MockWriteError("timed out waiting for receipt".into()));
        }
        state
            .receipts
            .get(&tx_hash)
            .copied()
            .ok_or_else(|| MockWriteError(format!("unknown transaction {tx_hash}")))
    }
}
