//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles count their calls on shared atomics so a test can hand a boxed
//! copy to the reconciler and keep another copy for assertions.

#![allow(dead_code)]

use ddns_core::config::DdnsConfig;
use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, PublishedIpLookup, UpdateResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ZONE: &str = "example.com";
pub const RECORD: &str = "home.example.com";
pub const ZONE_ID: &str = "zone-123";
pub const RECORD_ID: &str = "record-456";

/// The record's content as the outside world sees it
///
/// Shared between the lookup double and the provider double so that a write
/// becomes visible to the next lookup.
pub type PublishedRecord = Arc<Mutex<Option<String>>>;

pub fn published(ip: Option<&str>) -> PublishedRecord {
    Arc::new(Mutex::new(ip.map(str::to_string)))
}

/// An IpSource that returns a scripted answer
pub struct ScriptedIpSource {
    /// Answer to return; `None` means fail with a network error
    answer: Arc<Mutex<Option<String>>>,
    /// Simulated latency per call
    delay: Duration,
    /// Call counter for current()
    call_count: Arc<AtomicUsize>,
    /// Paused-clock instants at which current() was entered
    call_times: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

impl ScriptedIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            answer: Arc::new(Mutex::new(Some(ip.to_string()))),
            delay: Duration::ZERO,
            call_count: Arc::new(AtomicUsize::new(0)),
            call_times: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An IP source whose every call fails
    pub fn failing() -> Self {
        let source = Self::new("");
        *source.answer.lock().unwrap() = None;
        source
    }

    /// Make every call take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change the answer for subsequent calls
    pub fn set_ip(&self, ip: &str) {
        *self.answer.lock().unwrap() = Some(ip.to_string());
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.call_times.lock().unwrap().clone()
    }

    /// Create a new ScriptedIpSource that shares state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            answer: Arc::clone(&other.answer),
            delay: other.delay,
            call_count: Arc::clone(&other.call_count),
            call_times: Arc::clone(&other.call_times),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.call_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let answer = self.answer.lock().unwrap().clone();
        answer.ok_or_else(|| Error::network("Request failed: connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A PublishedIpLookup that reads the shared published record
pub struct MockLookup {
    record: PublishedRecord,
    call_count: Arc<AtomicUsize>,
}

impl MockLookup {
    pub fn new(record: &PublishedRecord) -> Self {
        Self {
            record: Arc::clone(record),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times published_ip() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new MockLookup that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            record: Arc::clone(&other.record),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl PublishedIpLookup for MockLookup {
    async fn published_ip(&self, _record_name: &str) -> Option<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.record.lock().unwrap().clone()
    }
}

/// Which provider call the mock should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Zone,
    Record,
    Update,
}

/// A mock DnsProvider that tracks calls and writes into the published record
pub struct MockDnsProvider {
    record: PublishedRecord,
    fail_at: FailAt,
    zone_calls: Arc<AtomicUsize>,
    record_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    /// Content of every update call, in order
    written: Arc<Mutex<Vec<String>>>,
}

impl MockDnsProvider {
    pub fn new(record: &PublishedRecord) -> Self {
        Self {
            record: Arc::clone(record),
            fail_at: FailAt::Nothing,
            zone_calls: Arc::new(AtomicUsize::new(0)),
            record_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    pub fn zone_call_count(&self) -> usize {
        self.zone_calls.load(Ordering::SeqCst)
    }

    pub fn record_call_count(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Get the content of every update call
    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }

    /// Create a new MockDnsProvider that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            record: Arc::clone(&other.record),
            fail_at: other.fail_at,
            zone_calls: Arc::clone(&other.zone_calls),
            record_calls: Arc::clone(&other.record_calls),
            update_calls: Arc::clone(&other.update_calls),
            written: Arc::clone(&other.written),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone_id(&self, zone: &str) -> Result<String> {
        self.zone_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Zone {
            return Err(Error::provider("mock", format!("Zone '{}' not found", zone)));
        }
        Ok(ZONE_ID.to_string())
    }

    async fn resolve_record_id(&self, _zone_id: &str, record_name: &str) -> Result<String> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Record {
            return Err(Error::provider(
                "mock",
                format!("DNS record '{}' not found", record_name),
            ));
        }
        Ok(RECORD_ID.to_string())
    }

    async fn update_record(
        &self,
        _zone_id: &str,
        record_id: &str,
        record_name: &str,
        new_ip: &str,
    ) -> Result<UpdateResult> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.written.lock().unwrap().push(new_ip.to_string());
        if self.fail_at == FailAt::Update {
            return Err(Error::network("operation timed out"));
        }

        *self.record.lock().unwrap() = Some(new_ip.to_string());
        Ok(UpdateResult {
            id: record_id.to_string(),
            name: record_name.to_string(),
            content: new_ip.to_string(),
            ttl: 1,
            proxied: false,
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config() -> DdnsConfig {
    DdnsConfig::new(ZONE, RECORD, "admin@example.com", "test-key")
}
