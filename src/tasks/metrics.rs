// src/tasks/metrics.rs

//! Counters accumulated across polling cycles

use std::time::Duration;

use tracing::info;

use super::cycle::CycleReport;

#[derive(Debug, Default)]
pub struct CycleMetrics {
    cycles: usize,
    failed_cycles: usize,
    outcomes: CycleReport,
    /// Sum over all cycles; every cycle contributes exactly one duration
    total_duration: Duration,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&mut self, report: &CycleReport, duration: Duration) {
        self.cycles += 1;
        self.outcomes.total += report.total;
        self.outcomes.unchanged += report.unchanged;
        self.outcomes.processed += report.processed;
        self.outcomes.no_data += report.no_data;
        self.outcomes.analysis_failed += report.analysis_failed;
        self.outcomes.write_failed += report.write_failed;
        self.total_duration = self.total_duration.saturating_add(duration);
    }

    pub fn record_failure(&mut self, duration: Duration) {
        self.cycles += 1;
        self.failed_cycles += 1;
        self.total_duration = self.total_duration.saturating_add(duration);
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn failed_cycles(&self) -> usize {
        self.failed_cycles
    }

    pub fn outcomes(&self) -> &CycleReport {
        &self.outcomes
    }

    pub fn average_duration(&self) -> Option<Duration> {
        if self.cycles == 0 {
            return None;
        }
        let cycles = u32::try_from(self.cycles).unwrap_or(u32::MAX);
        Some(self.total_duration / cycles)
    }

    pub fn report(&self) {
        info!(
            "Cycles: {} ({} failed), items: {}, avg duration: {:?}",
            self.cycles,
            self.failed_cycles,
            self.outcomes,
            self.average_duration().unwrap_or_default()
        );
    }
}
