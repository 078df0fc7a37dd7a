// src/tasks/mod.rs

//! Polling loop: runs checklist cycles one after another until stopped.

use std::time::{Duration, Instant};

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::db::{CycleStore, Identifier};
use crate::error::CycleError;
use crate::services::AnalysisService;

pub mod cycle;
pub mod metrics;

pub use cycle::{CycleReport, ItemOutcome, execute_cycle, process_item};
use metrics::CycleMetrics;

/// Drives cycles against a store, strictly one at a time.
pub struct CycleRunner<S: CycleStore> {
    store: S,
    tables: Vec<Identifier>,
    analysis: AnalysisService,
    interval: Duration,
    metrics: CycleMetrics,
}

impl<S: CycleStore> CycleRunner<S> {
    pub fn new(
        store: S,
        tables: Vec<Identifier>,
        analysis: AnalysisService,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            tables,
            analysis,
            interval,
            metrics: CycleMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &CycleMetrics {
        &self.metrics
    }

    /// One cycle inside one transaction.
    ///
    /// Step failures are absorbed into the report. Only failing to open the
    /// transaction or to commit it fails the cycle, and in the latter case
    /// every write of the cycle is discarded.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        info!("Starting checklist check cycle");
        let started = Instant::now();

        let mut scope = match self.store.begin_cycle().await {
            Ok(scope) => scope,
            Err(e) => {
                self.metrics.record_failure(started.elapsed());
                return Err(CycleError::Startup(e));
            }
        };

        let report = execute_cycle(&mut scope, &self.tables, &self.analysis).await;

        if let Err(e) = self.store.commit_cycle(scope).await {
            self.metrics.record_failure(started.elapsed());
            return Err(CycleError::Aborted(e));
        }

        let duration = started.elapsed();
        self.metrics.record_cycle(&report, duration);
        info!("Cycle finished in {:?}", duration);
        Ok(report)
    }

    /// Poll until `shutdown` fires. A stop request interrupts the wait
    /// between cycles, never a running cycle.
    pub async fn run_forever(&mut self, shutdown: CancellationToken) {
        info!(
            "Polling {} table(s) every {} seconds",
            self.tables.len(),
            self.interval.as_secs()
        );

        loop {
            if let Err(e) = self.run_cycle().await {
                error!("Check cycle failed: {}", e);
            }
            self.metrics.report();

            if shutdown.is_cancelled() {
                break;
            }

            info!("Waiting {} seconds until next check", self.interval.as_secs());
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = time::sleep(self.interval) => {}
            }
        }

        info!("Stop requested, shutting down");
        self.close().await;
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
