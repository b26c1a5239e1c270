// # IP Source Trait
//
// Defines the interface for discovering the machine's current public IP.
//
// ## Implementations
//
// - HTTP "what is my IP" endpoint: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     // Get current IP
//     let current_ip = source.current().await?;
//     println!("external IP: {current_ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// An IP source answers one question: what is the public IPv4 address of
/// this machine right now. The value is returned as a dotted-decimal string;
/// the reconciler only compares it for equality and passes it through.
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Perform one HTTP request per call, bounded by a timeout
/// - ✅ Trim and sanity-check the response body
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (the next scheduled cycle is the retry)
/// - ❌ Cache the answer between calls (every cycle must see a fresh value)
/// - ❌ Decide whether DNS needs updating (owned by `Reconciler`)
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current external IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current IP, trimmed
    /// - `Err(Error::Network)`: Transport failure, timeout, or non-success status
    async fn current(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
