/// Result type for [`RelayClient`] operations.
///
/// [`RelayClient`]: crate::client::RelayClient
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors returned by the [`RelayClient`].
///
/// [`RelayClient`]: crate::client::RelayClient
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    /// The relayer reported that the call failed.
    #[error("relayer rejected the call: {0}")]
    Rejected(String),

    /// The relayer answered with a non-2xx status.
    #[error("relayer returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the body, or the raw body.
        message: String,
    },

    /// A 2xx response that is neither a tx hash nor a failure report.
    #[error("unrecognized relayer response: {0}")]
    MalformedResponse(String),

    /// An error occurred while parsing the URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// An error occurred while contacting the relayer.
    #[error("error contacting relayer: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RelayError {
    /// True for failures that happened before the relayer accepted or
    /// rejected the call. Retrying these with the same signature is safe.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::MalformedResponse(_) | Self::Transport(_))
    }
}
