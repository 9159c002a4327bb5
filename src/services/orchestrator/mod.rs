//! Analysis Orchestration
//!
//! Runs one analysis at a time: validates the file, drives progress, calls the
//! fallback chain and appends the result to history.

mod analysis;

pub use analysis::{content_seed, AnalysisOrchestrator, AnalysisOutcome};
