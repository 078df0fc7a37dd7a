// src/checklist/mod.rs

//! Checklist records and the read-side steps of a cycle: scanning for
//! pending acts, collecting items, and fingerprinting.

pub mod collector;
pub mod fingerprint;
pub mod model;
pub mod scanner;

pub use collector::ChecklistDataCollector;
pub use fingerprint::{Fingerprint, FingerprintTracker};
pub use model::{ChecklistItem, PendingWork, ScoredItem};
pub use scanner::ChecklistScanner;
