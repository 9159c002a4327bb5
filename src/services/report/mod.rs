//! Report Generation
//!
//! Renders one stored analysis into two artifacts: a paginated PDF document
//! and a canonical JSON snapshot. Both renderers are pure functions of
//! (result, metadata) and borrow the result for the duration of the call.

mod document;
mod export;
mod pdf;
mod snapshot;

use chrono::{DateTime, Utc};
use thiserror::Error;

use deeptrust_core::{AnalysisResult, HistoryEntry, MediaType};

use crate::utils::error::{AppError, AppResult};

pub use document::{layout_document, render_document, DocumentLayout, FontFace, Page, TextLine};
pub use export::{
    document_filename, snapshot_filename, DirectorySink, ExportArtifact, ExportSink,
    JSON_CONTENT_TYPE, PDF_CONTENT_TYPE, PRODUCT_SLUG,
};
pub use snapshot::{parse_snapshot, render_snapshot, AnalysisSnapshot, SNAPSHOT_VERSION};

/// Errors raised while rendering a report
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Malformed signal at index {index}: {reason}")]
    MalformedSignal { index: usize, reason: String },

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Context printed alongside a result
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub filename: String,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
}

impl ReportMetadata {
    pub fn new(filename: impl Into<String>, media_type: MediaType, created_at: DateTime<Utc>) -> Self {
        Self {
            filename: filename.into(),
            media_type,
            created_at,
        }
    }

    pub fn from_entry(entry: &HistoryEntry) -> Self {
        Self::new(entry.filename(), entry.media_type(), entry.created_at())
    }
}

/// Builds export artifacts for history entries
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    /// PDF report for a completed entry
    pub fn document(&self, entry: &HistoryEntry, epoch_millis: i64) -> AppResult<ExportArtifact> {
        let result = Self::result_of(entry)?;
        let bytes = render_document(result, &ReportMetadata::from_entry(entry))?;
        Ok(ExportArtifact::pdf(
            document_filename(entry.media_type(), epoch_millis),
            bytes,
        ))
    }

    /// JSON snapshot for a completed entry
    pub fn snapshot(&self, entry: &HistoryEntry, epoch_millis: i64) -> AppResult<ExportArtifact> {
        let result = Self::result_of(entry)?;
        let bytes = render_snapshot(result, &ReportMetadata::from_entry(entry))?;
        Ok(ExportArtifact::json(
            snapshot_filename(entry.media_type(), epoch_millis),
            bytes,
        ))
    }

    fn result_of(entry: &HistoryEntry) -> AppResult<&AnalysisResult> {
        entry.result().ok_or_else(|| {
            AppError::validation(format!(
                "history entry {} has no result to export",
                entry.id()
            ))
        })
    }
}
