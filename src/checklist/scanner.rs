// src/checklist/scanner.rs

use tracing::{debug, error, info};

use crate::checklist::PendingWork;
use crate::db::{ChecklistGateway, Identifier};

/// Finds acts awaiting review across all configured checklist tables.
pub struct ChecklistScanner;

impl ChecklistScanner {
    /// A table whose query fails is logged and contributes nothing; the
    /// remaining tables are still scanned.
    pub async fn find_pending<G>(gateway: &mut G, tables: &[Identifier]) -> Vec<PendingWork>
    where
        G: ChecklistGateway + ?Sized,
    {
        let mut pending = Vec::new();

        for table in tables {
            match gateway.pending_acts(table).await {
                Ok(found) => {
                    if found.is_empty() {
                        debug!(%table, "No pending acts");
                    } else {
                        info!(%table, "Found {} pending acts", found.len());
                    }
                    pending.extend(found);
                }
                Err(e) => {
                    error!(%table, "Failed to scan checklist table: {}", e);
                }
            }
        }

        pending
    }
}
