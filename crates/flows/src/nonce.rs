use alloy::primitives::{Address, U256};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Identifies the nonce stream a fetch reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonceScope {
    /// Chain the forwarder is deployed on.
    pub chain_id: u64,
    /// The forwarder holding the nonce.
    pub forwarder: Address,
    /// The signer whose nonce is read.
    pub sender: Address,
}

/// Handle for one in-flight nonce fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a ticket must be completed for its nonce to be recorded"]
pub struct NonceTicket {
    generation: u64,
    scope: NonceScope,
}

impl NonceTicket {
    /// Get the scope the fetch was started for.
    pub const fn scope(&self) -> NonceScope {
        self.scope
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    generation: u64,
    latest: Option<(NonceScope, U256)>,
}

/// Tracks forwarder nonce fetches so that only the most recently started
/// fetch is accepted.
///
/// Every fetch calls [`NonceTracker::begin`] first. A fetch that completes
/// after a newer one has begun is discarded, whichever finishes first.
#[derive(Debug, Clone, Default)]
pub struct NonceTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl NonceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding any fetch already in flight.
    pub fn begin(&self, scope: NonceScope) -> NonceTicket {
        let mut state = self.state.lock();
        state.generation += 1;
        if state.latest.is_some_and(|(s, _)| s != scope) {
            state.latest = None;
        }
        NonceTicket { generation: state.generation, scope }
    }

    /// Record the result of a fetch. Returns `None` if the fetch was
    /// superseded.
    pub fn complete(&self, ticket: NonceTicket, nonce: U256) -> Option<U256> {
        let mut state = self.state.lock();
        if ticket.generation != state.generation {
            debug!(
                generation = ticket.generation,
                current = state.generation,
                %nonce,
                "discarding superseded nonce"
            );
            return None;
        }
        state.latest = Some((ticket.scope, nonce));
        Some(nonce)
    }

    /// The last accepted nonce for `scope`.
    pub fn latest(&self, scope: &NonceScope) -> Option<U256> {
        self.state.lock().latest.filter(|(s, _)| s == scope).map(|(_, n)| n)
    }

    /// Forget the last accepted nonce. Called once a nonce has been signed
    /// over.
    pub fn invalidate(&self) {
        self.state.lock().latest = None;
    }
}
