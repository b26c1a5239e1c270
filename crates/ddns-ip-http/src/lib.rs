// # HTTP IP Source
//
// This crate provides the external IP source for the DDNS updater.
//
// ## Architecture
//
// Fetches the current IP from a plain-text "what is my IP" service
// (checkip.amazonaws.com by default). The whole response body, trimmed, is
// the answer.
//
// One request per call, bounded by a timeout. No caching and no retry: the
// scheduler's next tick is the retry.

use ddns_core::config::DdnsConfig;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::time::Duration;

/// Default HTTP timeout for IP lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source with the default timeout
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://checkip.amazonaws.com")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from the updater configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        Self::with_timeout(
            config.endpoints.ip_url.clone(),
            config.engine.http_timeout(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        tracing::debug!("Fetching external IP address from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Error getting external IP: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "Error getting external IP: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        let ip = body.trim();
        if ip.is_empty() {
            return Err(Error::network("Error getting external IP: empty response"));
        }

        tracing::debug!("External IP retrieved: {}", ip);
        Ok(ip.to_string())
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
