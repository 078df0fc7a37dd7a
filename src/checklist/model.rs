// src/checklist/model.rs

use std::fmt;

use crate::db::schema::Identifier;

/// One scored characteristic of a checklist with its localized category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub category: String,
    pub code: i64,
    pub grade: i32,
}

impl ChecklistItem {
    pub fn new(category: impl Into<String>, code: i64, grade: i32) -> Self {
        Self {
            category: category.into(),
            code,
            grade,
        }
    }

    pub fn scored(&self) -> ScoredItem {
        ScoredItem {
            code: self.code,
            grade: self.grade,
        }
    }
}

/// The (code, grade) pair a fingerprint is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredItem {
    pub code: i64,
    pub grade: i32,
}

impl ScoredItem {
    pub fn new(code: i64, grade: i32) -> Self {
        Self { code, grade }
    }
}

/// An act awaiting review, found by the scanner and consumed within one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWork {
    pub table: Identifier,
    pub checklist_id: i64,
    pub act_id: i64,
}

impl fmt::Display for PendingWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checklist {} ({}), act {}",
            self.checklist_id, self.table, self.act_id
        )
    }
}
