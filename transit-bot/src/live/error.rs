//! Live data adapter error types.

/// Errors from the live data HTTP adapter.
///
/// These never reach the user: the adapter folds every variant into
/// [`Live::Unavailable`](super::Live::Unavailable) after logging it.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream did not answer in time
    #[error("request timed out")]
    Timeout,

    /// Rate limited by the provider
    #[error("rate limited by provider")]
    RateLimited,

    /// Provider returned an error status or an error document
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Body did not match the expected shape
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Client could not be configured
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LiveError {
    /// Classify a transport error, separating timeouts.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LiveError::Timeout
        } else {
            LiveError::Http(err)
        }
    }
}
