// # Published IP Lookup Trait
//
// Defines the interface for reading the IP a record currently resolves to,
// through a public resolver rather than the provider's management API.
//
// ## Implementations
//
// - DNS-over-HTTPS JSON API: `ddns-dns-doh` crate

use async_trait::async_trait;

/// Trait for looking up the currently published IP of an A record
///
/// The answer is advisory. It only lets the reconciler skip a write when the
/// record is already correct, so a lookup never fails: a miss, a transport
/// error and a malformed answer all come back as `None`, and the
/// implementation logs the reason itself.
///
/// A public resolver may lag behind the provider. A stale answer at worst
/// causes one redundant write, which the provider treats as a no-op.
#[async_trait]
pub trait PublishedIpLookup: Send + Sync {
    /// Get the IP the record currently resolves to
    ///
    /// # Parameters
    ///
    /// - `record_name`: The fully-qualified DNS record name
    ///
    /// # Returns
    ///
    /// - `Some(String)`: The data field of the first answer
    /// - `None`: No answer, or the lookup failed
    async fn published_ip(&self, record_name: &str) -> Option<String>;
}
