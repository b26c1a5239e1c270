//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current external IP
//! - [`PublishedIpLookup`]: Read the IP a record currently resolves to
//! - [`DnsProvider`]: Resolve IDs and write records via a provider API

pub mod ip_source;
pub mod published_ip;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use published_ip::PublishedIpLookup;
pub use dns_provider::{DnsProvider, RecordId, UpdateResult, ZoneId};
