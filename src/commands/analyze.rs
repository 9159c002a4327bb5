//! Analysis Commands
//!
//! Submit a file from disk to the orchestrator.

use std::path::Path;

use deeptrust_core::{MediaFile, MediaType, Sensitivity};

use crate::models::response::{AnalysisReport, CommandResponse};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

use super::export::{write_artifacts, ExportFormat};

/// Read a file and wrap it for submission
pub async fn load_media(path: &Path) -> AppResult<MediaFile> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("not a file path: {}", path.display())))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    Ok(MediaFile::new(filename, bytes))
}

async fn run_analysis(
    state: &AppState,
    path: &Path,
    media_type: MediaType,
    sensitivity: Option<Sensitivity>,
    formats: &[ExportFormat],
) -> AppResult<AnalysisReport> {
    let file = load_media(path).await?;
    let sensitivity = match sensitivity {
        Some(sensitivity) => sensitivity,
        None => state.get_config().await.sensitivity,
    };
    let orchestrator = state.orchestrator().await;
    let outcome = orchestrator.analyze(file, media_type, sensitivity).await?;

    let report = AnalysisReport::from_outcome(&outcome);
    if formats.is_empty() {
        return Ok(report);
    }

    let sink = state.export_sink().await?;
    let exports = write_artifacts(&state.reports(), &sink, &outcome.entry, formats)?;
    Ok(report.with_exports(exports))
}

/// Analyze a file, optionally writing report artifacts for the new entry.
///
/// Without an explicit sensitivity the configured default is used.
pub async fn analyze_file(
    state: &AppState,
    path: &Path,
    media_type: MediaType,
    sensitivity: Option<Sensitivity>,
    formats: &[ExportFormat],
) -> CommandResponse<AnalysisReport> {
    run_analysis(state, path, media_type, sensitivity, formats)
        .await
        .into()
}
