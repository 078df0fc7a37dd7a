// src/tasks/cycle.rs

//! One polling cycle: scan every table for pending acts, then take each act
//! through fingerprint check, collection, analysis and write-back.

use std::fmt;

use tracing::{info, warn};

use crate::checklist::{
    ChecklistDataCollector, ChecklistScanner, FingerprintTracker, PendingWork,
};
use crate::db::{ChecklistGateway, Identifier};
use crate::services::{AnalysisService, ResultWriter};

/// Terminal state of one pending act within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Stored fingerprint matches the checklist; nothing was written.
    Unchanged,
    /// Analysis written (fingerprint stored on a best-effort basis).
    Processed,
    NoData,
    AnalysisFailed,
    /// Analysis could not be written; the fingerprint was left untouched.
    WriteFailed,
}

impl ItemOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Unchanged | Self::Processed)
    }
}

/// Per-cycle tally of item outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub total: usize,
    pub unchanged: usize,
    pub processed: usize,
    pub no_data: usize,
    pub analysis_failed: usize,
    pub write_failed: usize,
}

impl CycleReport {
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.total += 1;
        match outcome {
            ItemOutcome::Unchanged => self.unchanged += 1,
            ItemOutcome::Processed => self.processed += 1,
            ItemOutcome::NoData => self.no_data += 1,
            ItemOutcome::AnalysisFailed => self.analysis_failed += 1,
            ItemOutcome::WriteFailed => self.write_failed += 1,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.processed + self.unchanged
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} succeeded (processed: {}, unchanged: {}, no data: {}, analysis failed: {}, write failed: {})",
            self.succeeded(),
            self.total,
            self.processed,
            self.unchanged,
            self.no_data,
            self.analysis_failed,
            self.write_failed
        )
    }
}

/// Scan all tables and process every pending act, in scan order.
pub async fn execute_cycle<G>(
    gateway: &mut G,
    tables: &[Identifier],
    analysis: &AnalysisService,
) -> CycleReport
where
    G: ChecklistGateway + ?Sized,
{
    let pending = ChecklistScanner::find_pending(gateway, tables).await;
    let mut report = CycleReport::default();

    if pending.is_empty() {
        info!("No checklists to process");
        return report;
    }

    info!("Found {} checklists to process", pending.len());

    for work in &pending {
        let outcome = process_item(gateway, analysis, work).await;
        report.record(outcome);
    }

    info!("Cycle result: {}", report);
    report
}

pub async fn process_item<G>(
    gateway: &mut G,
    analysis: &AnalysisService,
    work: &PendingWork,
) -> ItemOutcome
where
    G: ChecklistGateway + ?Sized,
{
    info!("Processing {}", work);

    let current = FingerprintTracker::current(gateway, work).await;
    let stored = FingerprintTracker::fetch_stored(gateway, work.act_id).await;

    if let Some(fingerprint) = &current {
        if fingerprint.matches(stored.as_deref()) {
            info!(checklist_id = work.checklist_id, "Checklist unchanged, skipping");
            return ItemOutcome::Unchanged;
        }
    }

    if stored.is_some() {
        info!(
            checklist_id = work.checklist_id,
            "Checklist changed since last analysis, reanalysing"
        );
    }

    let Some(items) = ChecklistDataCollector::collect(gateway, work).await else {
        return ItemOutcome::NoData;
    };

    let Ok(text) = analysis.analyze(&items).await else {
        warn!(checklist_id = work.checklist_id, "No analysis obtained, act left unreviewed");
        return ItemOutcome::AnalysisFailed;
    };

    if ResultWriter::write(gateway, work.act_id, &text).await.is_err() {
        return ItemOutcome::WriteFailed;
    }

    // Without a current fingerprint the stored one is cleared; either way a
    // missing or unsaved fingerprint only costs a reanalysis next cycle.
    FingerprintTracker::persist(gateway, work.act_id, current.as_ref()).await;

    info!(checklist_id = work.checklist_id, "Checklist processed");
    ItemOutcome::Processed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_successes_as_processed_plus_unchanged() {
        let mut report = CycleReport::default();
        for outcome in [
            ItemOutcome::Processed,
            ItemOutcome::Unchanged,
            ItemOutcome::Unchanged,
            ItemOutcome::NoData,
            ItemOutcome::AnalysisFailed,
            ItemOutcome::WriteFailed,
        ] {
            report.record(outcome);
        }

        assert_eq!(report.total, 6);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.no_data, 1);
        assert_eq!(report.analysis_failed, 1);
        assert_eq!(report.write_failed, 1);
        assert!(report.to_string().starts_with("3/6 succeeded"));
    }

    #[test]
    fn only_processed_and_unchanged_are_successes() {
        assert!(ItemOutcome::Processed.is_success());
        assert!(ItemOutcome::Unchanged.is_success());
        assert!(!ItemOutcome::NoData.is_success());
        assert!(!ItemOutcome::AnalysisFailed.is_success());
        assert!(!ItemOutcome::WriteFailed.is_success());
    }
}
