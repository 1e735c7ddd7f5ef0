//! Catalog feed HTTP client.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::domain::Mode;

use super::error::CatalogError;
use super::feeds::parse_feed;
use super::raw::RawStop;

/// Default base URL for the feed mirror.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8081/catalog";

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Optional API key for x-apikey header authentication
    pub api_key: Option<String>,
    /// Base URL; feeds live at `{base_url}/{mode}.json`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CatalogClientConfig {
    /// Create a new config with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for the per-mode stop feeds.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new catalog client.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| CatalogError::Config("invalid API key format".to_string()))?;
            headers.insert(HeaderName::from_static("x-apikey"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Feed URL for a mode.
    pub fn feed_url(&self, mode: Mode) -> String {
        format!("{}/{}.json", self.base_url, mode.code())
    }

    /// Fetch and normalize one mode's feed.
    pub async fn fetch(&self, mode: Mode) -> Result<Vec<RawStop>, CatalogError> {
        let response = self.http.get(self.feed_url(mode)).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CatalogError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                mode,
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_feed(mode, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = CatalogClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn feed_url_per_mode() {
        let client =
            CatalogClient::new(CatalogClientConfig::new("http://localhost:9000/feeds/")).unwrap();
        assert_eq!(
            client.feed_url(Mode::CommuterRail),
            "http://localhost:9000/feeds/cerc.json"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let client = CatalogClient::new(
            CatalogClientConfig::new("http://127.0.0.1:1").with_timeout(2),
        )
        .unwrap();
        let err = client.fetch(Mode::Metro).await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
