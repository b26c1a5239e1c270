// # DNS-over-HTTPS Lookup
//
// This crate reads the IP an A record currently resolves to, through a
// public DNS-over-HTTPS resolver speaking the JSON API
// (`application/dns-json`, as served by 1.1.1.1 and dns.google).
//
// ## Why not the provider API?
//
// The answer is only used to skip writes that would change nothing. A
// public resolver needs no credentials, and a stale answer costs at most one
// redundant write.
//
// ## API Reference
//
// ```http
// GET /dns-query?name=home.example.com&type=A
// Accept: application/dns-json
// ```
//
// ```json
// { "Status": 0, "Answer": [ { "name": "home.example.com", "type": 1, "TTL": 300, "data": "203.0.113.7" } ] }
// ```

use ddns_core::config::DdnsConfig;
use ddns_core::traits::PublishedIpLookup;
use ddns_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default HTTP timeout for DoH queries
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Media type of the DoH JSON API
const DNS_JSON: &str = "application/dns-json";

/// DoH JSON response (only the fields we read)
#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    data: String,
}

/// Published IP lookup over DNS-over-HTTPS
#[derive(Debug, Clone)]
pub struct DohLookup {
    /// Resolver endpoint, e.g. "https://1.1.1.1/dns-query"
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl DohLookup {
    /// Create a new lookup against `url` with the default timeout
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
            config.endpoints.doh_url.clone(),
            config.engine.http_timeout(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query the resolver, surfacing every failure
    ///
    /// `Ok(None)` means the resolver answered with no A record.
    pub async fn query(&self, record_name: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("name", record_name), ("type", "A")])
            .header(reqwest::header::ACCEPT, DNS_JSON)
            .send()
            .await
            .map_err(|e| Error::network(format!("DoH request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "DoH resolver returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::network(format!("Failed to read DoH response: {}", e)))?;

        let parsed: DohResponse = serde_json::from_slice(&body)?;

        Ok(parsed.answer.into_iter().next().map(|answer| answer.data))
    }
}

#[async_trait::async_trait]
impl PublishedIpLookup for DohLookup {
    async fn published_ip(&self, record_name: &str) -> Option<String> {
        tracing::debug!("Querying {} for {}", self.url, record_name);

        match self.query(record_name).await {
            Ok(Some(ip)) => {
                tracing::debug!("DoH resolver returned: {}", ip);
                Some(ip)
            }
            Ok(None) => {
                tracing::debug!("No DNS record found for {}", record_name);
                None
            }
            Err(e) => {
                tracing::warn!("Could not query DNS via DoH resolver: {}", e);
                None
            }
        }
    }
}
