use crate::Relayer;
use alloy::primitives::TxHash;
use clearsig_relay::{RelayClient, RelayError, RelayRequest};

impl Relayer for RelayClient {
    async fn relay(&self, request: RelayRequest) -> Result<TxHash, RelayError> {
        RelayClient::relay(self, &request).await
    }
}
