// # DNS Provider Trait
//
// Defines the interface for changing DNS records via a provider's
// management API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zone_id = provider.resolve_zone_id("example.com").await?;
//     let record_id = provider.resolve_record_id(&zone_id, "home.example.com").await?;
//     provider
//         .update_record(&zone_id, &record_id, "home.example.com", "203.0.113.7")
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider-assigned zone identifier
pub type ZoneId = String;

/// Provider-assigned record identifier
pub type RecordId = String;

/// The record as the provider reports it after a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// The record ID
    pub id: RecordId,
    /// The record name
    pub name: String,
    /// The record content (the IP address)
    pub content: String,
    /// Time-to-live (1 means "automatic")
    pub ttl: u32,
    /// Whether traffic is routed through the provider's proxy
    #[serde(default)]
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// Each method is a single API call. Credentials are bound when the
/// provider is constructed and attached to every request.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads
/// - ❌ Implement retry logic or backoff
/// - ❌ Cache zone or record IDs beyond a single call
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
///
/// IDs are re-resolved every time an update is needed: a record that was
/// deleted and recreated out-of-band gets a new ID, and a cached one would
/// point at nothing.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve an active zone by exact name
    ///
    /// # Returns
    ///
    /// - `Ok(ZoneId)`: The zone's ID
    /// - `Err(Error::Provider)`: No zone matched, or the API reported failure
    /// - `Err(Error::Network)`: Transport failure or timeout
    async fn resolve_zone_id(&self, zone: &str) -> Result<ZoneId, crate::Error>;

    /// Resolve an A record by exact name within a zone
    ///
    /// # Returns
    ///
    /// - `Ok(RecordId)`: The record's ID
    /// - `Err(Error::Provider)`: No record matched, or the API reported failure
    /// - `Err(Error::Network)`: Transport failure or timeout
    async fn resolve_record_id(
        &self,
        zone_id: &str,
        record_name: &str,
    ) -> Result<RecordId, crate::Error>;

    /// Replace the record's content with `new_ip`
    ///
    /// The write is a full replace: type A, TTL 1 (automatic), not proxied.
    /// Writing the same IP twice is harmless.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record_name: &str,
        new_ip: &str,
    ) -> Result<UpdateResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
