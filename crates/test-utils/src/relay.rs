//! A scripted [`Relayer`].
use alloy::primitives::{keccak256, TxHash};
use clearsig_flows::Relayer;
use clearsig_relay::{RelayError, RelayRequest};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// A scripted relayer reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayReply {
    /// Accept with this transaction hash.
    Accept(TxHash),
    /// Answer `{"status": "failed", "error": ..}`.
    Reject(String),
    /// Answer with a non-2xx status.
    Http(u16, String),
}

/// A [`Relayer`] that records requests and answers from a queue of
/// replies. With the queue empty, requests are accepted with a hash derived
/// from the params.
#[derive(Debug, Clone, Default)]
pub struct MockRelayer {
    replies: Arc<Mutex<VecDeque<RelayReply>>>,
    requests: Arc<Mutex<Vec<RelayRequest>>>,
}

impl MockRelayer {
    /// Create a new mock relayer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn reply(&self, reply: RelayReply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// All received requests.
    pub fn requests(&self) -> Vec<RelayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Relayer for MockRelayer {
    async fn relay(&self, request: RelayRequest) -> Result<TxHash, RelayError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RelayReply::Accept(keccak256(&request.params)));
        self.requests.lock().unwrap().push(request);

        match reply {
            RelayReply::Accept(tx_hash) => Ok(tx_hash),
            RelayReply::Reject(message) => Err(RelayError::Rejected(message)),
            RelayReply::Http(status, message) => Err(RelayError::Http { status, message }),
        }
    }
}
