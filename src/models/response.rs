//! Response Types
//!
//! Serializable views returned by the command layer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use deeptrust_core::{AnalysisResult, MediaType, ResultTier, RiskLevel, Signal};

use crate::services::fallback::{AttemptOutcome, FallbackAttempt};
use crate::services::orchestrator::AnalysisOutcome;

/// Generic command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T, crate::utils::error::AppError>> for CommandResponse<T> {
    fn from(result: Result<T, crate::utils::error::AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Summary of a finished analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub entry_id: Uuid,
    pub filename: String,
    pub media_type: MediaType,
    pub tier: ResultTier,
    /// False when the result came from the synthetic fallback
    pub real_analysis: bool,
    pub score: u8,
    pub risk_level: RiskLevel,
    pub signals: Vec<Signal>,
    pub attempts: Vec<FallbackAttempt>,
    /// Files written by `--report`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<PathBuf>,
}

impl AnalysisReport {
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        let result: &AnalysisResult = &outcome.result;
        Self {
            entry_id: outcome.entry.id(),
            filename: outcome.entry.filename().to_string(),
            media_type: outcome.entry.media_type(),
            tier: result.tier(),
            real_analysis: result.tier().is_real_analysis(),
            score: result.score(),
            risk_level: result.risk_level(),
            signals: result.signals().to_vec(),
            attempts: outcome.log.attempts.clone(),
            exports: Vec::new(),
        }
    }

    pub fn with_exports(mut self, exports: Vec<PathBuf>) -> Self {
        self.exports = exports;
        self
    }

    /// Attempts whose result was discarded for contradicting its own score
    pub fn rejected_attempts(&self) -> impl Iterator<Item = &FallbackAttempt> {
        self.attempts
            .iter()
            .filter(|a| a.outcome == AttemptOutcome::Rejected)
    }
}
