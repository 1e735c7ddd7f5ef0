//! Catalog loading error types.

use crate::domain::Mode;

/// Errors that can occur while fetching or caching a catalog feed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check TRANSIT_API_KEY")]
    Unauthorized,

    /// Provider returned an error status
    #[error("API error {status} for {mode}: {message}")]
    Api {
        mode: Mode,
        status: u16,
        message: String,
    },

    /// Feed body did not match the provider's shape
    #[error("JSON parse error for {mode}: {message}")]
    Json { mode: Mode, message: String },

    /// Feed parsed but yielded no usable stop
    #[error("feed for {0} has no usable stops")]
    Empty(Mode),

    /// Client could not be configured
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Cache operation failed
    #[error("cache error: {message}")]
    Cache { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CatalogError::Api {
            mode: Mode::Metro,
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.to_string(), "API error 503 for metro: down");

        let err = CatalogError::Empty(Mode::BusUrban);
        assert_eq!(err.to_string(), "feed for emt has no usable stops");
    }
}
