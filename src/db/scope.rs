// src/db/scope.rs

//! The transaction owned by one polling cycle.
//!
//! Every gateway call runs inside its own SAVEPOINT: PostgreSQL refuses all
//! further statements in a transaction after one fails, so a failed step is
//! rolled back to its savepoint and the rest of the cycle carries on. The
//! outer transaction is committed by [`CycleScope::commit`]; dropping the
//! scope without committing rolls everything back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, warn};

use crate::checklist::{ChecklistItem, PendingWork, ScoredItem};
use crate::db::gateway::ChecklistGateway;
use crate::db::schema::{Identifier, SchemaSql};
use crate::error::Result;

pub struct CycleScope {
    tx: Transaction<'static, Postgres>,
    sql: Arc<SchemaSql>,
}

impl CycleScope {
    pub(crate) fn new(tx: Transaction<'static, Postgres>, sql: Arc<SchemaSql>) -> Self {
        Self { tx, sql }
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        debug!("Cycle transaction committed");
        Ok(())
    }

    async fn savepoint(&mut self) -> Result<Transaction<'_, Postgres>> {
        Ok(sqlx::Connection::begin(&mut *self.tx).await?)
    }
}

/// Release the savepoint on success, roll back to it on failure.
async fn settle<T>(
    savepoint: Transaction<'_, Postgres>,
    outcome: std::result::Result<T, sqlx::Error>,
) -> Result<T> {
    match outcome {
        Ok(value) => {
            savepoint.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = savepoint.rollback().await {
                warn!("Failed to roll back to savepoint: {}", rollback);
            }
            Err(e.into())
        }
    }
}

fn scored_item(row: &PgRow) -> Result<ScoredItem> {
    Ok(ScoredItem {
        code: row.try_get("charcode")?,
        grade: row.try_get("grade")?,
    })
}

fn checklist_item(row: &PgRow) -> Result<ChecklistItem> {
    Ok(ChecklistItem {
        category: row.try_get("category_name")?,
        code: row.try_get("charcode")?,
        grade: row.try_get("grade")?,
    })
}

#[async_trait]
impl ChecklistGateway for CycleScope {
    async fn pending_acts(&mut self, table: &Identifier) -> Result<Vec<PendingWork>> {
        let query = self.sql.pending_acts(table);
        let mut sp = self.savepoint().await?;
        let outcome = sqlx::query(&query).fetch_all(&mut *sp).await;
        let rows = settle(sp, outcome).await?;

        rows.iter()
            .map(|row| {
                Ok(PendingWork {
                    table: table.clone(),
                    checklist_id: row.try_get("checklist_code")?,
                    act_id: row.try_get("akt_code")?,
                })
            })
            .collect()
    }

    async fn scored_items(
        &mut self,
        table: &Identifier,
        checklist_id: i64,
    ) -> Result<Vec<ScoredItem>> {
        let query = self.sql.scored_items(table);
        let mut sp = self.savepoint().await?;
        let outcome = sqlx::query(&query)
            .bind(checklist_id)
            .fetch_all(&mut *sp)
            .await;
        let rows = settle(sp, outcome).await?;

        rows.iter().map(scored_item).collect()
    }

    async fn checklist_items(
        &mut self,
        table: &Identifier,
        checklist_id: i64,
    ) -> Result<Vec<ChecklistItem>> {
        let query = self.sql.checklist_items(table);
        let lang_id = self.sql.lang_id();
        let mut sp = self.savepoint().await?;
        let outcome = sqlx::query(&query)
            .bind(checklist_id)
            .bind(lang_id)
            .fetch_all(&mut *sp)
            .await;
        let rows = settle(sp, outcome).await?;

        rows.iter().map(checklist_item).collect()
    }

    async fn stored_fingerprint(&mut self, act_id: i64) -> Result<Option<String>> {
        let query = self.sql.stored_fingerprint();
        let mut sp = self.savepoint().await?;
        let outcome = sqlx::query(&query)
            .bind(act_id)
            .fetch_optional(&mut *sp)
            .await;
        let row = settle(sp, outcome).await?;

        let stored = match row {
            Some(row) => row.try_get::<Option<String>, _>("aichecksum")?,
            None => None,
        };
        Ok(stored.filter(|s| !s.is_empty()))
    }

    async fn store_fingerprint(
        &mut self,
        act_id: i64,
        fingerprint: Option<&str>,
    ) -> Result<u64> {
        let query = self.sql.store_fingerprint();
        let mut sp = self.savepoint().await?;
        let outcome = sqlx::query(&query)
            .bind(fingerprint)
            .bind(act_id)
            .execute(&mut *sp)
            .await;

        Ok(settle(sp, outcome).await?.rows_affected())
    }

    async fn write_analysis(
        &mut self,
        act_id: i64,
        analysis: &str,
        analysed_at: NaiveDateTime,
    ) -> Result<u64> {
        let query = self.sql.write_analysis();
        let mut sp = self.savepoint().await?;
        let outcome = sqlx::query(&query)
            .bind(analysis)
            .bind(analysed_at)
            .bind(act_id)
            .execute(&mut *sp)
            .await;

        Ok(settle(sp, outcome).await?.rows_affected())
    }
}
