//! Configuration types for the DDNS updater
//!
//! The configuration is loaded once at startup from a JSON file and is
//! read-only afterwards. It is handed to the components that need it at
//! construction time.
//!
//! ```json
//! {
//!   "zone": "example.com",
//!   "dnsrecord": "home.example.com",
//!   "cloudflare_auth_email": "admin@example.com",
//!   "cloudflare_auth_key": "0123456789abcdef",
//!   "engine": { "interval_secs": 60, "http_timeout_secs": 10 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default public IP discovery endpoint (plain-text body)
pub const DEFAULT_IP_URL: &str = "https://checkip.amazonaws.com";

/// Default DNS-over-HTTPS JSON endpoint
pub const DEFAULT_DOH_URL: &str = "https://1.1.1.1/dns-query";

/// Default Cloudflare API v4 base URL
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Main DDNS configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Zone (domain) that owns the record, e.g. "example.com"
    #[serde(default)]
    pub zone: String,

    /// Fully-qualified record name to keep updated
    #[serde(rename = "dnsrecord", default)]
    pub record_name: String,

    /// Provider account email
    #[serde(rename = "cloudflare_auth_email", default)]
    pub auth_email: String,

    /// Provider API key
    /// ⚠️ NEVER log this value
    #[serde(rename = "cloudflare_auth_key", default)]
    pub auth_key: String,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Optional endpoint overrides
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("zone", &self.zone)
            .field("record_name", &self.record_name)
            .field("auth_email", &self.auth_email)
            .field("auth_key", &"<REDACTED>")
            .field("engine", &self.engine)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration with default engine and endpoint settings
    pub fn new(
        zone: impl Into<String>,
        record_name: impl Into<String>,
        auth_email: impl Into<String>,
        auth_key: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            record_name: record_name.into(),
            auth_email: auth_email.into(),
            auth_key: auth_key.into(),
            engine: EngineConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }

    /// Load and validate the configuration file at `path`
    ///
    /// A missing file, invalid JSON, or a missing required field is a
    /// [`Error::Config`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::config(format!(
                "Configuration file '{}' not found",
                path.display()
            )));
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json_str(&raw)?;
        tracing::debug!("Configuration loaded successfully from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut config: DdnsConfig = serde_json::from_str(raw)
            .map_err(|e| Error::config(format!("Invalid JSON in configuration file: {}", e)))?;
        config.normalize_names();
        config.validate()?;
        Ok(config)
    }

    /// Store `zone` and `dnsrecord` in the form the provider API returns
    ///
    /// Surrounding whitespace and a single root dot (`example.com.`) are
    /// removed; Cloudflare reports names without the trailing dot.
    pub fn normalize_names(&mut self) {
        for name in [&mut self.zone, &mut self.record_name] {
            let trimmed = name.trim();
            let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
            if trimmed.len() != name.len() {
                *name = trimmed.to_string();
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("zone", &self.zone),
            ("dnsrecord", &self.record_name),
            ("cloudflare_auth_email", &self.auth_email),
            ("cloudflare_auth_key", &self.auth_key),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Missing required fields in config: {}",
                missing.join(", ")
            )));
        }

        self.engine.validate()?;
        self.endpoints.validate()?;

        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Period between reconciliation cycles (in seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Timeout applied to every HTTP call (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::config("engine.interval_secs must be > 0"));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::config("engine.http_timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// External endpoints used by the updater
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// "What is my IP" endpoint
    #[serde(default = "default_ip_url")]
    pub ip_url: String,

    /// DNS-over-HTTPS JSON endpoint
    #[serde(default = "default_doh_url")]
    pub doh_url: String,

    /// Provider management API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl EndpointConfig {
    /// Validate the endpoint configuration
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("endpoints.ip_url", &self.ip_url),
            ("endpoints.doh_url", &self.doh_url),
            ("endpoints.api_base", &self.api_base),
        ] {
            if url.is_empty() {
                return Err(Error::config(format!("{} cannot be empty", key)));
            }
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(Error::config(format!(
                    "{} must use HTTP or HTTPS scheme. Got: {}",
                    key, url
                )));
            }
        }
        Ok(())
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            ip_url: default_ip_url(),
            doh_url: default_doh_url(),
            api_base: default_api_base(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_ip_url() -> String {
    DEFAULT_IP_URL.to_string()
}

fn default_doh_url() -> String {
    DEFAULT_DOH_URL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "zone": "example.com",
        "dnsrecord": "home.example.com",
        "cloudflare_auth_email": "admin@example.com",
        "cloudflare_auth_key": "secret_key_12345"
    }"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = DdnsConfig::from_json_str(SAMPLE).unwrap();

        assert_eq!(config.zone, "example.com");
        assert_eq!(config.record_name, "home.example.com");
        assert_eq!(config.auth_email, "admin@example.com");
        assert_eq!(config.auth_key, "secret_key_12345");
        assert_eq!(config.engine.interval(), Duration::from_secs(60));
        assert_eq!(config.engine.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.endpoints, EndpointConfig::default());
    }

    #[test]
    fn test_trailing_root_dot_is_stripped() {
        let config = DdnsConfig::from_json_str(
            r#"{
                "zone": "example.com.",
                "dnsrecord": " home.example.com. ",
                "cloudflare_auth_email": "admin@example.com",
                "cloudflare_auth_key": "key"
            }"#,
        )
        .unwrap();

        assert_eq!(config.zone, "example.com");
        assert_eq!(config.record_name, "home.example.com");
    }

    #[test]
    fn test_root_only_name_is_missing() {
        let err = DdnsConfig::from_json_str(
            r#"{
                "zone": ".",
                "dnsrecord": "home.example.com",
                "cloudflare_auth_email": "admin@example.com",
                "cloudflare_auth_key": "key"
            }"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("zone"));
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let err = DdnsConfig::from_json_str(r#"{ "zone": "example.com" }"#).unwrap_err();

        assert!(err.is_fatal());
        let msg = err.to_string();
        assert!(msg.contains("dnsrecord"), "{msg}");
        assert!(msg.contains("cloudflare_auth_email"), "{msg}");
        assert!(msg.contains("cloudflare_auth_key"), "{msg}");
        assert!(!msg.contains("zone,"), "{msg}");
    }

    #[test]
    fn test_blank_field_is_rejected() {
        let config = DdnsConfig::new("example.com", "  ", "admin@example.com", "key");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = DdnsConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = DdnsConfig::new("example.com", "home.example.com", "a@b.c", "key");
        config.engine.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_scheme_validated() {
        let mut config = DdnsConfig::new("example.com", "home.example.com", "a@b.c", "key");
        config.endpoints.doh_url = "ftp://1.1.1.1/dns-query".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoints.doh_url"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = DdnsConfig::load(file.path()).unwrap();
        assert_eq!(config.record_name, "home.example.com");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DdnsConfig::load(dir.path().join("config.json")).unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let config = DdnsConfig::from_json_str(SAMPLE).unwrap();
        let debug_str = format!("{:?}", config);

        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
