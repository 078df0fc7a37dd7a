// src/lib.rs

pub mod checklist;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod services;
pub mod tasks;

pub use error::{AnalyzerError, CycleError, Result};
