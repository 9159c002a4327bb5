//! Export Commands
//!
//! Render stored analyses to PDF and JSON files.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::ValueEnum;
use serde::Serialize;
use uuid::Uuid;

use deeptrust_core::HistoryEntry;

use crate::models::response::CommandResponse;
use crate::services::report::{DirectorySink, ExportSink, ReportGenerator};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Which artifacts to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn both() -> Vec<ExportFormat> {
        vec![ExportFormat::Pdf, ExportFormat::Json]
    }
}

/// Render and deliver the requested artifacts for one entry
pub fn write_artifacts(
    reports: &ReportGenerator,
    sink: &dyn ExportSink,
    entry: &HistoryEntry,
    formats: &[ExportFormat],
) -> AppResult<Vec<PathBuf>> {
    let epoch_millis = Utc::now().timestamp_millis();
    formats
        .iter()
        .map(|format| {
            let artifact = match format {
                ExportFormat::Pdf => reports.document(entry, epoch_millis)?,
                ExportFormat::Json => reports.snapshot(entry, epoch_millis)?,
            };
            sink.deliver(&artifact)
        })
        .collect()
}

fn parse_entry_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id.trim())
        .map_err(|e| AppError::validation(format!("invalid entry id '{}': {}", id, e)))
}

async fn run_export(
    state: &AppState,
    id: &str,
    out_dir: Option<&Path>,
    formats: &[ExportFormat],
) -> AppResult<Vec<PathBuf>> {
    let entry = state.history().get(parse_entry_id(id)?)?;
    let sink = match out_dir {
        Some(dir) => DirectorySink::new(dir),
        None => state.export_sink().await?,
    };
    write_artifacts(&state.reports(), &sink, &entry, formats)
}

/// Export a history entry by id
pub async fn export_report(
    state: &AppState,
    id: &str,
    out_dir: Option<&Path>,
    formats: &[ExportFormat],
) -> CommandResponse<Vec<PathBuf>> {
    run_export(state, id, out_dir, formats).await.into()
}
