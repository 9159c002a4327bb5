//! Report Export Integration Tests
//!
//! Snapshot round trips, empty signal lists and files written through the
//! export command.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use deeptrust::commands::{write_artifacts, ExportFormat};
use deeptrust::services::fallback::FallbackChain;
use deeptrust::services::history::HistoryStore;
use deeptrust::services::orchestrator::AnalysisOrchestrator;
use deeptrust::services::report::{
    layout_document, parse_snapshot, render_document, render_snapshot, DirectorySink,
    ReportGenerator, ReportMetadata,
};
use deeptrust_core::{AnalysisResult, MediaType, ResultTier, RiskLevel, Sensitivity, Signal};
use deeptrust_providers::SyntheticGenerator;

use super::support::sample_file;

fn metadata() -> ReportMetadata {
    ReportMetadata::new(
        "suspect.mp4",
        MediaType::Video,
        Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap(),
    )
}

fn face_swap() -> AnalysisResult {
    AnalysisResult::new(
        85,
        RiskLevel::High,
        vec![Signal::new(
            "face-swap",
            0.92,
            "Facial boundary blending inconsistent with head pose.",
        )],
        ResultTier::Primary,
    )
    .unwrap()
}

#[test]
fn test_snapshot_round_trip_reconstructs_result() {
    let result = face_swap();
    let bytes = render_snapshot(&result, &metadata()).unwrap();

    let snapshot = parse_snapshot(&bytes).unwrap();

    assert_eq!(snapshot.result, result);
    assert_eq!(snapshot.filename, "suspect.mp4");
    assert_eq!(snapshot.media_type, MediaType::Video);
    assert_eq!(snapshot.created_at, metadata().created_at);
}

#[test]
fn test_rendering_is_idempotent() {
    let result = face_swap();
    let meta = metadata();

    assert_eq!(
        render_snapshot(&result, &meta).unwrap(),
        render_snapshot(&result, &meta).unwrap()
    );
    assert_eq!(
        render_document(&result, &meta).unwrap(),
        render_document(&result, &meta).unwrap()
    );
}

#[test]
fn test_snapshot_with_contradicting_risk_is_refused() {
    let tampered = String::from_utf8(render_snapshot(&face_swap(), &metadata()).unwrap())
        .unwrap()
        .replace("\"high\"", "\"low\"");

    assert!(parse_snapshot(tampered.as_bytes()).is_err());
}

#[test]
fn test_empty_signal_list_renders_both_artifacts() {
    let result = AnalysisResult::without_signals(15, ResultTier::Secondary);
    let meta = metadata();

    let pdf = render_document(&result, &meta).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(layout_document(&result, &meta)
        .unwrap()
        .text()
        .any(|line| line == "Risk Level: LOW"));

    let snapshot = parse_snapshot(&render_snapshot(&result, &meta).unwrap()).unwrap();
    assert!(snapshot.result.signals().is_empty());
}

#[tokio::test]
async fn test_export_after_analysis_writes_files() {
    let orchestrator = AnalysisOrchestrator::new(
        FallbackChain::new(Arc::new(SyntheticGenerator::new())),
        HistoryStore::in_memory(),
    );
    let outcome = orchestrator
        .analyze(sample_file(MediaType::Image), MediaType::Image, Sensitivity::Medium)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());
    let paths = write_artifacts(
        &ReportGenerator::new(),
        &sink,
        &outcome.entry,
        &ExportFormat::both(),
    )
    .unwrap();

    assert_eq!(paths.len(), 2);
    let pdf_name = paths[0].file_name().unwrap().to_str().unwrap();
    assert!(pdf_name.starts_with("deeptrust_report_image_"));
    assert!(std::fs::read(&paths[0]).unwrap().starts_with(b"%PDF-"));

    let snapshot = parse_snapshot(&std::fs::read(&paths[1]).unwrap()).unwrap();
    assert_eq!(snapshot.result, outcome.result);
    assert_eq!(snapshot.filename, "portrait.png");
}
