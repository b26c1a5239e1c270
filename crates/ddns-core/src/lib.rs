// # ddns-core
//
// Core library for the DDNS updater.
//
// ## Architecture Overview
//
// This library provides the decision logic for dynamic DNS updates:
// - **IpSource**: Trait for discovering the current external IP
// - **PublishedIpLookup**: Trait for reading the currently published IP
// - **DnsProvider**: Trait for resolving IDs and writing records via a provider API
// - **Reconciler**: One compare-and-update cycle
// - **Scheduler**: Runs the Reconciler now and then on a fixed period
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic is separate from HTTP implementations
// 2. **No Local State**: The provider's record is the source of truth, re-read every cycle
// 3. **Failure Isolation**: A failed cycle is logged and absorbed; the next tick retries
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod scheduler;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource, PublishedIpLookup};
pub use engine::{CycleOutcome, CycleStage, Reconciler};
pub use scheduler::Scheduler;
pub use config::{DdnsConfig, EndpointConfig, EngineConfig};
pub use error::{Error, ErrorKind, Result};
