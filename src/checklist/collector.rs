// src/checklist/collector.rs

use tracing::{error, info, warn};

use crate::checklist::{ChecklistItem, PendingWork};
use crate::db::ChecklistGateway;

pub struct ChecklistDataCollector;

impl ChecklistDataCollector {
    /// Items of the checklist ordered by characteristic code.
    ///
    /// `None` when the checklist has no items or the query fails; the caller
    /// skips that checklist for this cycle.
    pub async fn collect<G>(gateway: &mut G, work: &PendingWork) -> Option<Vec<ChecklistItem>>
    where
        G: ChecklistGateway + ?Sized,
    {
        match gateway.checklist_items(&work.table, work.checklist_id).await {
            Ok(items) if items.is_empty() => {
                warn!(
                    checklist_id = work.checklist_id,
                    table = %work.table,
                    "No data for checklist"
                );
                None
            }
            Ok(mut items) => {
                items.sort_by_key(|item| item.code);
                info!(
                    checklist_id = work.checklist_id,
                    "Collected {} records", items.len()
                );
                Some(items)
            }
            Err(e) => {
                error!(
                    checklist_id = work.checklist_id,
                    table = %work.table,
                    "Failed to collect checklist data: {}", e
                );
                None
            }
        }
    }
}
