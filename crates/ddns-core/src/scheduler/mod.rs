//! Fixed-period scheduler
//!
//! Runs the reconciler once immediately, then once per period, until a
//! shutdown future resolves.
//!
//! Cycles never overlap. The scheduler awaits each cycle before it waits for
//! the next tick, and a cycle that overruns the period delays the following
//! tick instead of queueing a burst of catch-up cycles.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::Reconciler;
use crate::error::{Error, Result};

/// Periodic driver for a [`Reconciler`]
pub struct Scheduler {
    reconciler: Reconciler,
    period: Duration,
}

impl Scheduler {
    /// Create a scheduler that runs `reconciler` every `period`
    pub fn new(reconciler: Reconciler, period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::config("Scheduler period must be > 0"));
        }
        Ok(Self { reconciler, period })
    }

    /// Create a scheduler using the configured interval
    pub fn from_config(reconciler: Reconciler, engine: &EngineConfig) -> Result<Self> {
        Self::new(reconciler, engine.interval())
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until `shutdown` resolves
    ///
    /// Shutdown is honoured while waiting for a tick and during a cycle; an
    /// in-flight cycle is dropped rather than finished.
    ///
    /// # Returns
    ///
    /// The number of cycles that ran to completion.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "DNS update scheduler started for {}, running checks every {:?}",
            self.reconciler.record_name(),
            self.period
        );

        let mut completed = 0usize;
        loop {
            // First tick completes immediately
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    debug!("Shutdown requested during a cycle, abandoning it");
                    break;
                }
                outcome = self.reconciler.reconcile() => {
                    completed += 1;
                    debug!("Cycle {} finished: success={}", completed, outcome.is_success());
                }
            }
        }

        info!("Scheduler stopped after {} cycle(s)", completed);
        completed
    }
}
