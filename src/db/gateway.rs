// src/db/gateway.rs
// Read/write surface of the checklist store as seen by one polling cycle

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::checklist::{ChecklistItem, PendingWork, ScoredItem};
use crate::db::schema::Identifier;
use crate::error::Result;

/// Everything a cycle reads from or writes to the store.
///
/// All calls made through one gateway value share the cycle's transaction.
/// A failing call must leave the gateway usable for the next call.
#[async_trait]
pub trait ChecklistGateway: Send {
    /// Acts of `table` that reference a checklist and are flagged for review.
    async fn pending_acts(&mut self, table: &Identifier) -> Result<Vec<PendingWork>>;

    /// (code, grade) pairs of a checklist ordered by code.
    async fn scored_items(&mut self, table: &Identifier, checklist_id: i64)
        -> Result<Vec<ScoredItem>>;

    /// Items joined to their localized category names, ordered by code.
    async fn checklist_items(
        &mut self,
        table: &Identifier,
        checklist_id: i64,
    ) -> Result<Vec<ChecklistItem>>;

    async fn stored_fingerprint(&mut self, act_id: i64) -> Result<Option<String>>;

    /// `None` clears the stored fingerprint. Returns the number of act rows
    /// updated.
    async fn store_fingerprint(&mut self, act_id: i64, fingerprint: Option<&str>)
        -> Result<u64>;

    /// Sets analysis text, timestamp and the reviewed flag in one statement.
    /// Returns the number of act rows updated.
    async fn write_analysis(
        &mut self,
        act_id: i64,
        analysis: &str,
        analysed_at: NaiveDateTime,
    ) -> Result<u64>;
}

/// Source of per-cycle gateways.
///
/// A cycle begins a scope, runs every step through it, then commits. A
/// scope dropped without commit discards its writes.
#[async_trait]
pub trait CycleStore: Send + Sync {
    type Scope: ChecklistGateway;

    async fn begin_cycle(&self) -> Result<Self::Scope>;

    async fn commit_cycle(&self, scope: Self::Scope) -> Result<()>;

    /// Release connections once polling stops.
    async fn close(&self) {}
}
