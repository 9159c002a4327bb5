//! History Entry Model
//!
//! One immutable row of the analysis ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::media::MediaType;
use crate::result::{AnalysisResult, RiskLevel};

/// Terminal status recorded for an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Completed,
    Failed,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStatus::Completed => "completed",
            HistoryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "completed" => Ok(HistoryStatus::Completed),
            "failed" => Ok(HistoryStatus::Failed),
            other => Err(CoreError::parse(format!("unknown history status: {}", other))),
        }
    }
}

/// A recorded analysis.
///
/// Entries are immutable: fields are private and only readable, and the
/// ledger never rewrites or removes one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    id: Uuid,
    media_type: MediaType,
    filename: String,
    created_at: DateTime<Utc>,
    status: HistoryStatus,
    result: Option<AnalysisResult>,
}

impl HistoryEntry {
    /// Record a completed analysis, stamped with the current time.
    pub fn completed(
        media_type: MediaType,
        filename: impl Into<String>,
        result: AnalysisResult,
    ) -> Self {
        Self::restore(
            Uuid::new_v4(),
            media_type,
            filename,
            Utc::now(),
            HistoryStatus::Completed,
            Some(result),
        )
    }

    /// Record a failed analysis, stamped with the current time.
    pub fn failed(media_type: MediaType, filename: impl Into<String>) -> Self {
        Self::restore(
            Uuid::new_v4(),
            media_type,
            filename,
            Utc::now(),
            HistoryStatus::Failed,
            None,
        )
    }

    /// Rebuild an entry from persisted fields.
    pub fn restore(
        id: Uuid,
        media_type: MediaType,
        filename: impl Into<String>,
        created_at: DateTime<Utc>,
        status: HistoryStatus,
        result: Option<AnalysisResult>,
    ) -> Self {
        Self {
            id,
            media_type,
            filename: filename.into(),
            created_at,
            status,
            result,
        }
    }

    /// Same entry with a different creation timestamp (imports and fixtures).
    pub fn dated(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> HistoryStatus {
        self.status
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.result.as_ref().map(|r| r.risk_level())
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level() == Some(RiskLevel::High)
    }
}
