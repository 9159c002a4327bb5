//! DeepTrust Core
//!
//! Shared data shapes for the DeepTrust workspace: the analysis result model,
//! the score-to-risk policy, history entries, and core error types. This crate
//! has no dependency on providers, storage, or rendering.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `media` - Media kinds, sensitivity, and submitted files
//! - `result` - `AnalysisResult`, `Signal`, `RiskLevel`, `ResultTier`, `classify`
//! - `history` - Immutable ledger entries

pub mod error;
pub mod history;
pub mod media;
pub mod result;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Media ──────────────────────────────────────────────────────────────
pub use media::{mime_type_for, MediaFile, MediaType, Sensitivity};

// ── Results ────────────────────────────────────────────────────────────
pub use result::{
    classify, AnalysisResult, ResultTier, RiskLevel, Signal, HIGH_RISK_THRESHOLD,
    MAX_SCORE, MEDIUM_RISK_THRESHOLD, STRONG_SIGNAL_THRESHOLD,
};

// ── History ────────────────────────────────────────────────────────────
pub use history::{HistoryEntry, HistoryStatus};
