// src/error.rs
// Error types shared by the store gateway, the analysis client and the cycle runner

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("invalid identifier '{0}': expected lowercase [a-z0-9_]+")]
    InvalidIdentifier(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    PromptFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("act {0} not found")]
    ActNotFound(i64),

    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis service returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("analysis service returned no text")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Failure of a whole polling cycle.
///
/// `Startup` means nothing was read or written yet (the store could not be
/// opened); `Aborted` means the cycle got past that point and its
/// transaction was rolled back.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("cycle could not start: {0}")]
    Startup(#[source] AnalyzerError),

    #[error("cycle aborted: {0}")]
    Aborted(#[source] AnalyzerError),
}

impl CycleError {
    pub fn started_work(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}
