//! Scheduler loop: run a cycle, log its outcome, sleep, repeat.
//!
//! No cycle error ever leaves the loop. Connection and fetch failures are
//! logged and the next cycle retries from scratch; a panic inside a cycle is
//! caught here and logged the same way.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use crate::client::Connector;
use crate::engine::{CycleError, CycleReport, DemotionEngine};
use crate::logging::panic_message;

pub struct Monitor<C> {
    engine: DemotionEngine,
    connector: C,
    interval: Duration,
}

impl<C: Connector> Monitor<C> {
    pub fn new(engine: DemotionEngine, connector: C, interval: Duration) -> Self {
        Self {
            engine,
            connector,
            interval,
        }
    }

    pub fn engine(&self) -> &DemotionEngine {
        &self.engine
    }

    /// Log the effective settings once at startup.
    pub fn log_startup(&self) {
        let policy = self.engine.policy();
        let filter = self.engine.filter();
        tracing::info!("qBittorrent queue manager started");
        tracing::info!("client: {}", self.connector.describe());
        tracing::info!("minimum speed threshold: {} KB/s", policy.min_speed_kbps);
        tracing::info!(
            "check interval: {:.0} minutes",
            self.interval.as_secs_f64() / 60.0
        );
        tracing::info!(
            "slow threshold: {} seconds",
            policy.slow_window(self.interval).as_secs()
        );
        tracing::info!(
            "active states monitored: {}",
            filter.active().collect::<Vec<_>>().join(", ")
        );
        tracing::info!(
            "excluded states: {}",
            filter.excluded().collect::<Vec<_>>().join(", ")
        );
    }

    /// Run a single cycle, converting a panic into [`CycleError::Panicked`].
    pub fn run_once(&mut self) -> Result<CycleReport, CycleError> {
        let engine = &mut self.engine;
        let connector = &self.connector;
        panic::catch_unwind(AssertUnwindSafe(|| engine.run_cycle(connector)))
            .unwrap_or_else(|payload| Err(CycleError::Panicked(panic_message(&*payload))))
    }

    /// Loop until `max_cycles` cycles have run (forever when `None`).
    ///
    /// Sleeps `interval` between cycles, never after the last one. Returns the
    /// number of cycles run; `Some(0)` runs none.
    pub fn run(&mut self, max_cycles: Option<u64>) -> u64 {
        if max_cycles == Some(0) {
            return 0;
        }
        let mut cycles = 0u64;
        loop {
            tracing::debug!("starting check cycle");
            match self.run_once() {
                Ok(report) => log_report(&report),
                Err(e) => log_failure(&e),
            }
            cycles += 1;
            if max_cycles.is_some_and(|max| cycles >= max) {
                return cycles;
            }
            thread::sleep(self.interval);
        }
    }
}

fn log_report(report: &CycleReport) {
    tracing::info!(
        seen = report.seen,
        evaluated = report.evaluated,
        slow = report.slow,
        demoted = report.demoted.len(),
        failed = report.failed.len(),
        dropped = report.dropped,
        "check cycle complete"
    );
}

fn log_failure(e: &CycleError) {
    match e.client_error().map(|c| c.kind()) {
        Some(kind) if kind.is_transient() => {
            tracing::warn!(error = %e, kind = ?kind, "check cycle aborted, will retry")
        }
        Some(kind) => tracing::error!(error = %e, kind = ?kind, "check cycle aborted"),
        None => tracing::error!(error = %e, "check cycle aborted"),
    }
}
