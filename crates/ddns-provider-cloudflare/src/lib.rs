// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 client for the DDNS updater.
//
// ## Implementation Status
//
// - ✅ One HTTP request per trait method
// - ✅ Full error propagation (the scheduler's next tick is the retry)
// - ✅ HTTP timeout configured (10 seconds by default)
// - ✅ Specific error messages for HTTP status codes (401, 403, 404, 409, 429, 5xx)
// - ✅ `success: false` envelopes reported with the API's own error list
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic
// - ❌ NO caching of zone or record IDs
// - ❌ NO record creation (the A record must already exist)
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Provider MUST fail fast if the email or key is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...&status=active`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
//
// Authentication uses the legacy global API key: `X-Auth-Email` and
// `X-Auth-Key` headers on every request.

use async_trait::async_trait;
use ddns_core::config::{DdnsConfig, DEFAULT_API_BASE};
use ddns_core::traits::{DnsProvider, RecordId, UpdateResult, ZoneId};
use ddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider name used in errors and logs
const PROVIDER: &str = "cloudflare";

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// TTL value Cloudflare interprets as "automatic"
const AUTOMATIC_TTL: u32 = 1;

/// Response envelope shared by every v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

/// Entry of the envelope's `errors` array
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

fn render_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
}

/// Body of a full record replace
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record lookup)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct CloudflareProvider {
    /// Account email (`X-Auth-Email`)
    auth_email: String,

    /// Global API key (`X-Auth-Key`)
    /// ⚠️ NEVER log this value
    auth_key: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip the PUT
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("auth_email", &self.auth_email)
            .field("auth_key", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider against the public API
    ///
    /// # Parameters
    ///
    /// - `auth_email`: Cloudflare account email
    /// - `auth_key`: Cloudflare global API key
    /// - `dry_run`: If true, perform GET requests but skip the PUT
    pub fn new(
        auth_email: impl Into<String>,
        auth_key: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        Self::with_options(
            auth_email,
            auth_key,
            DEFAULT_API_BASE,
            DEFAULT_HTTP_TIMEOUT,
            dry_run,
        )
    }

    /// Create a provider with an explicit API base URL and timeout
    pub fn with_options(
        auth_email: impl Into<String>,
        auth_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let auth_email = auth_email.into();
        let auth_key = auth_key.into();

        if auth_email.is_empty() || auth_key.is_empty() {
            return Err(Error::config(
                "Cloudflare auth email and key cannot be empty",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            auth_email,
            auth_key,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    /// Create from the updater configuration
    pub fn from_config(config: &DdnsConfig, dry_run: bool) -> Result<Self> {
        if dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Self::with_options(
            config.auth_email.clone(),
            config.auth_key.clone(),
            config.endpoints.api_base.clone(),
            config.engine.http_timeout(),
            dry_run,
        )
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Start a request with the auth headers attached
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_base, path))
            .header("X-Auth-Email", &self.auth_email)
            .header("X-Auth-Key", &self.auth_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and unwrap the v4 envelope
    ///
    /// Transport failures become [`Error::Network`]; everything the API
    /// itself reports becomes [`Error::Provider`].
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("{}: HTTP request failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("{}: failed to read response: {}", action, e)))?;

        if !status.is_success() {
            return Err(status_error(status, &body, action));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER, format!("{}: failed to parse response: {}", action, e))
        })?;

        if !envelope.success {
            return Err(Error::provider(
                PROVIDER,
                format!(
                    "{}: Cloudflare API returned error: {}",
                    action,
                    render_errors(&envelope.errors)
                ),
            ));
        }

        envelope.result.ok_or_else(|| {
            Error::provider(PROVIDER, format!("{}: response has no result", action))
        })
    }
}

/// Map a non-success HTTP status to a provider error
fn status_error(status: reqwest::StatusCode, body: &str, action: &str) -> Error {
    let details = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .map(|envelope| render_errors(&envelope.errors))
        .unwrap_or_else(|_| body.to_string());

    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API key or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("Not found. Status: {} - {}", status, details),
        409 => format!(
            "Conflict: Record is being updated by another process. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!(
            "Cloudflare server error (transient): {} - {}",
            status, details
        ),
        _ => format!("Request failed: {} - {}", status, details),
    };

    Error::provider(PROVIDER, format!("{}: {}", action, message))
}

/// Cloudflare returns names without the trailing root dot
fn without_root_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com&status=active
    /// ```
    async fn resolve_zone_id(&self, zone: &str) -> Result<ZoneId> {
        let zone = without_root_dot(zone);
        tracing::debug!("Fetching zone ID for {}", zone);

        let request = self
            .request(reqwest::Method::GET, "/zones")
            .query(&[("name", zone), ("status", "active")]);
        let zones: Vec<Zone> = self.send(request, "Zone lookup").await?;

        let zone_id = zones
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(zone))
            .map(|z| z.id)
            .ok_or_else(|| Error::provider(PROVIDER, format!("Zone '{}' not found", zone)))?;

        tracing::debug!("Zone ID for {}: {}", zone, zone_id);
        Ok(zone_id)
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com
    /// ```
    async fn resolve_record_id(&self, zone_id: &str, record_name: &str) -> Result<RecordId> {
        let record_name = without_root_dot(record_name);
        tracing::debug!("Fetching DNS record ID for {}", record_name);

        let request = self
            .request(
                reqwest::Method::GET,
                &format!("/zones/{}/dns_records", zone_id),
            )
            .query(&[("type", "A"), ("name", record_name)]);
        let records: Vec<DnsRecord> = self.send(request, "Record lookup").await?;

        let record_id = records
            .into_iter()
            .find(|r| r.record_type == "A" && r.name.eq_ignore_ascii_case(record_name))
            .map(|r| r.id)
            .ok_or_else(|| {
                Error::provider(
                    PROVIDER,
                    format!("DNS record '{}' not found", record_name),
                )
            })?;

        tracing::debug!("DNS record ID for {}: {}", record_name, record_id);
        Ok(record_id)
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1, "proxied": false }
    /// ```
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record_name: &str,
        new_ip: &str,
    ) -> Result<UpdateResult> {
        let record_name = without_root_dot(record_name);
        let payload = RecordPayload {
            record_type: "A",
            name: record_name,
            content: new_ip,
            ttl: AUTOMATIC_TTL,
            proxied: false,
        };
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);

        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} [mode: {}]",
            record_name,
            new_ip,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {}{} with payload: {}",
                self.api_base,
                path,
                serde_json::to_string(&payload)?
            );
            return Ok(UpdateResult {
                id: record_id.to_string(),
                name: record_name.to_string(),
                content: new_ip.to_string(),
                ttl: AUTOMATIC_TTL,
                proxied: false,
            });
        }

        let request = self.request(reqwest::Method::PUT, &path).json(&payload);
        let result: UpdateResult = self.send(request, "Record update").await?;

        tracing::debug!("DNS record updated successfully: {:?}", result);
        Ok(result)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
