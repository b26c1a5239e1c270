//! Reconciliation engine
//!
//! The Reconciler runs one compare-and-update cycle:
//! - Fetch the current external IP via IpSource
//! - Fetch the currently published IP via PublishedIpLookup
//! - If they differ (or the published IP is unknown), resolve the zone,
//!   resolve the record, and write the new IP via DnsProvider
//!
//! ## Architecture
//!
//! ```text
//!                            ┌──────────────┐
//!                            │  Reconciler  │
//!                            └──────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         │                           │                           │
//!         ▼                           ▼                           ▼
//! ┌─────────────┐         ┌───────────────────┐         ┌─────────────┐
//! │  IpSource   │         │ PublishedIpLookup │         │ DnsProvider │
//! │  (current)  │         │    (advisory)     │         │ zone→record │
//! └─────────────┘         └───────────────────┘         │   →update   │
//!                                                       └─────────────┘
//! ```
//!
//! ## States
//!
//! A cycle is either IN_SYNC (published == external, nothing to do) or
//! DIVERGENT (run the three provider calls in order). Any failure aborts the
//! rest of the cycle. Nothing is carried over to the next cycle, which
//! re-evaluates from scratch.

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource, PublishedIpLookup, UpdateResult};
use tracing::{debug, error, info, warn};

/// Step of a cycle at which it was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    /// Fetching the external IP
    ExternalIp,
    /// Resolving the zone ID
    Zone,
    /// Resolving the record ID
    Record,
    /// Writing the record
    Update,
}

impl std::fmt::Display for CycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CycleStage::ExternalIp => "external IP lookup",
            CycleStage::Zone => "zone lookup",
            CycleStage::Record => "record lookup",
            CycleStage::Update => "record update",
        };
        f.write_str(name)
    }
}

/// How a reconciliation cycle ended
///
/// This is a report, not an error channel: failures have already been
/// logged by the time a caller sees `Aborted`.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Published IP already matches the external IP
    InSync {
        ip: String,
    },

    /// Record was rewritten
    Updated {
        previous_ip: Option<String>,
        new_ip: String,
        result: UpdateResult,
    },

    /// Cycle stopped early
    Aborted {
        stage: CycleStage,
        error: Error,
    },
}

impl CycleOutcome {
    /// Whether the cycle ran to the end without aborting
    ///
    /// `Updated` counts as success even when a dry-run provider skipped the
    /// write.
    pub fn is_success(&self) -> bool {
        !matches!(self, CycleOutcome::Aborted { .. })
    }
}

/// Core reconciliation logic
///
/// Holds its collaborators and the names of the zone and record to keep in
/// sync. Nothing else survives between calls to [`Reconciler::reconcile`].
pub struct Reconciler {
    /// Source of the current external IP
    ip_source: Box<dyn IpSource>,

    /// Advisory lookup of the published IP
    lookup: Box<dyn PublishedIpLookup>,

    /// DNS provider for writing the record
    provider: Box<dyn DnsProvider>,

    /// Zone that owns the record
    zone: String,

    /// Record to keep updated
    record_name: String,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `lookup`: Published IP lookup implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: DDNS configuration (validated here)
    pub fn new(
        ip_source: Box<dyn IpSource>,
        lookup: Box<dyn PublishedIpLookup>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            lookup,
            provider,
            zone: config.zone.clone(),
            record_name: config.record_name.clone(),
        })
    }

    /// The record this reconciler keeps updated
    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// Run one reconciliation cycle
    ///
    /// Never fails: every error is logged here and reported as
    /// [`CycleOutcome::Aborted`].
    pub async fn reconcile(&self) -> CycleOutcome {
        info!("Starting DNS update check for {}", self.record_name);

        let current_ip = match self.ip_source.current().await {
            Ok(ip) => ip,
            Err(e) => {
                return self.abort(CycleStage::ExternalIp, e);
            }
        };
        info!("Current IP is {}", current_ip);

        let published_ip = self.lookup.published_ip(&self.record_name).await;
        info!(
            "Published IP is {}",
            published_ip.as_deref().unwrap_or("unknown")
        );

        if published_ip.as_deref() == Some(current_ip.as_str()) {
            info!(
                result = "success",
                "{} is currently set to {}; no changes needed", self.record_name, current_ip
            );
            return CycleOutcome::InSync { ip: current_ip };
        }

        warn!(
            "DNS record needs updating from {} to {}",
            published_ip.as_deref().unwrap_or("unknown"),
            current_ip
        );

        match self.apply(&current_ip).await {
            Ok(result) => {
                info!(
                    result = "success",
                    "Successfully updated {} to {}", self.record_name, current_ip
                );
                debug!("Provider response: {:?}", result);
                CycleOutcome::Updated {
                    previous_ip: published_ip,
                    new_ip: current_ip,
                    result,
                }
            }
            Err((stage, e)) => self.abort(stage, e),
        }
    }

    /// Run the provider sequence: zone → record → write
    async fn apply(
        &self,
        new_ip: &str,
    ) -> std::result::Result<UpdateResult, (CycleStage, Error)> {
        let zone_id = self
            .provider
            .resolve_zone_id(&self.zone)
            .await
            .map_err(|e| (CycleStage::Zone, e))?;
        info!("Zone ID for {} is {}", self.zone, zone_id);

        let record_id = self
            .provider
            .resolve_record_id(&zone_id, &self.record_name)
            .await
            .map_err(|e| (CycleStage::Record, e))?;
        info!("DNS record ID for {} is {}", self.record_name, record_id);

        self.provider
            .update_record(&zone_id, &record_id, &self.record_name, new_ip)
            .await
            .map_err(|e| (CycleStage::Update, e))
    }

    fn abort(&self, stage: CycleStage, error: Error) -> CycleOutcome {
        error!(
            kind = ?error.kind(),
            "DNS update cycle for {} aborted during {}: {}",
            self.record_name,
            stage,
            error
        );
        CycleOutcome::Aborted { stage, error }
    }
}
