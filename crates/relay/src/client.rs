use crate::{
    types::{RelayErrorBody, RelayRequest, RelayResponse},
    RelayError, Result,
};
use alloy::primitives::TxHash;
use tracing::{debug, instrument, warn};

/// The relay endpoint, joined onto the base URL.
const RELAY: &str = "relay";

/// Relayer HTTP client.
/// Forwards signed macro calls to a relayer's `POST /relay` endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    /// The base URL of the relayer. Paths are joined onto it, so a base
    /// with a path component should end with `/`.
    url: reqwest::Url,
    /// The reqwest client used to send requests.
    client: reqwest::Client,
}

impl RelayClient {
    /// Create a new client with the given URL and client.
    pub const fn new_with_client(url: reqwest::Url, client: reqwest::Client) -> Self {
        Self { url, client }
    }

    /// Instantiate a new client with the given URL and a new reqwest client.
    pub fn new(url: reqwest::Url) -> Self {
        Self { url, client: reqwest::Client::new() }
    }

    /// Create a new client given a string URL.
    pub fn new_from_string(url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(url)?;
        Ok(Self::new(url))
    }

    /// Get the base URL.
    pub const fn url(&self) -> &reqwest::Url {
        &self.url
    }

    /// Get the client used to send requests
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn post_inner(&self, request: &RelayRequest) -> Result<RelayResponse> {
        // Append the path to the URL.
        let url = self
            .url
            .join(RELAY)
            .inspect_err(|e| warn!(%e, "Failed to join URL. Not relaying call."))?;

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .inspect_err(|e| warn!(%e, "Failed to reach relayer"))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<RelayErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %message, "Relayer returned an error status");
            return Err(RelayError::Http { status: status.as_u16(), message });
        }

        serde_json::from_str(&body)
            .inspect_err(|e| warn!(%e, "Failed to parse response from relayer"))
            .map_err(|_| RelayError::MalformedResponse(body))
    }

    /// Relay a signed macro call.
    ///
    /// Returns the hash of the transaction the relayer submitted. The
    /// transaction is not yet confirmed.
    #[instrument(skip_all, fields(signer = %request.signer, macro_address = %request.macro_address))]
    pub async fn relay(&self, request: &RelayRequest) -> Result<TxHash> {
        let response = self.post_inner(request).await?;
        match response {
            RelayResponse::Accepted { tx_hash } => {
                debug!(%tx_hash, "Relayer accepted call");
                Ok(tx_hash)
            }
            failed if failed.is_failed() => {
                let error = failed.into_result().err().unwrap_or_default();
                warn!(%error, "Relayer rejected call");
                Err(RelayError::Rejected(error))
            }
            other => Err(RelayError::MalformedResponse(format!("{other:?}"))),
        }
    }
}
