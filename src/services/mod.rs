// src/services/mod.rs
// Write-side steps of a cycle: LLM analysis and persisting its result

pub mod analysis;
pub mod writer;

pub use analysis::AnalysisService;
pub use writer::ResultWriter;
