// src/services/writer.rs
use chrono::Local;
use tracing::{error, info};

use crate::db::ChecklistGateway;
use crate::error::{AnalyzerError, Result};

/// Persists a generated analysis onto its act.
pub struct ResultWriter;

impl ResultWriter {
    /// Writes text, timestamp and reviewed flag as one update of the act row.
    /// Zero updated rows counts as a failure.
    pub async fn write<G>(gateway: &mut G, act_id: i64, analysis: &str) -> Result<()>
    where
        G: ChecklistGateway + ?Sized,
    {
        let analysed_at = Local::now().naive_local();

        match gateway.write_analysis(act_id, analysis, analysed_at).await {
            Ok(0) => {
                error!(act_id, "Act not updated: row not found");
                Err(AnalyzerError::ActNotFound(act_id))
            }
            Ok(_) => {
                info!(act_id, "Act updated");
                Ok(())
            }
            Err(e) => {
                error!(act_id, "Failed to update act: {}", e);
                Err(e)
            }
        }
    }
}
