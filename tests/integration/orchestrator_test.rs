//! Orchestrator Integration Tests
//!
//! Full runs through chain, progress and history, including the
//! rejection of overlapping submissions.

use std::sync::Arc;
use std::time::Duration;

use deeptrust::services::fallback::{ChainSettings, FallbackChain};
use deeptrust::services::history::{HistoryStore, MediaFilter};
use deeptrust::services::orchestrator::AnalysisOrchestrator;
use deeptrust::services::progress::{AnalysisPhase, ProgressSimulator};
use deeptrust::storage::SqliteHistory;
use deeptrust::AppError;
use deeptrust_core::{HistoryStatus, MediaFile, MediaType, ResultTier, Sensitivity};
use deeptrust_providers::{ResultGenerator, SyntheticGenerator};

use super::support::{sample_file, CountingGenerator, GatedProvider, Script, ScriptedProvider};

fn live() -> ChainSettings {
    ChainSettings {
        demo_mode: false,
        attempt_timeout: Duration::from_secs(30),
    }
}

#[tokio::test]
async fn test_auth_failure_with_unconfigured_secondary_records_fallback() {
    let primary = ScriptedProvider::primary(Script::AuthFailure);
    let secondary = ScriptedProvider::unconfigured(ResultTier::Secondary);
    let chain = FallbackChain::new(Arc::new(SyntheticGenerator::new()))
        .with_primary(primary.clone())
        .with_secondary(secondary.clone())
        .with_settings(live());
    let orchestrator =
        AnalysisOrchestrator::new(chain, HistoryStore::in_memory()).with_seeded_fallback(false);

    let outcome = orchestrator
        .analyze(sample_file(MediaType::Audio), MediaType::Audio, Sensitivity::Medium)
        .await
        .unwrap();

    let canonical = SyntheticGenerator::new().generate(MediaType::Audio, None);
    assert_eq!(outcome.result, canonical);
    assert_eq!(outcome.tier(), ResultTier::Fallback);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);

    let entries = orchestrator.history().list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status(), HistoryStatus::Completed);
    assert_eq!(entries[0].media_type(), MediaType::Audio);
    assert_eq!(entries[0].result(), Some(&canonical));
}

#[tokio::test]
async fn test_seeded_fallback_is_stable_per_content() {
    let orchestrator = AnalysisOrchestrator::new(
        FallbackChain::new(Arc::new(SyntheticGenerator::new())),
        HistoryStore::in_memory(),
    );

    let first = orchestrator
        .analyze(MediaFile::new("a.jpg", vec![1, 2, 3]), MediaType::Image, Sensitivity::Low)
        .await
        .unwrap();
    let again = orchestrator
        .analyze(MediaFile::new("b.jpg", vec![1, 2, 3]), MediaType::Image, Sensitivity::Low)
        .await
        .unwrap();

    assert_eq!(first.result, again.result);
    assert_ne!(first.entry.id(), again.entry.id());
    assert_eq!(orchestrator.history().count_total(&MediaFilter::all()).unwrap(), 2);
}

#[tokio::test]
async fn test_overlapping_submission_is_rejected() {
    let gated = GatedProvider::new();
    let generator = CountingGenerator::new();
    let chain = FallbackChain::new(generator.clone())
        .with_primary(gated.clone())
        .with_settings(live());
    let orchestrator = Arc::new(AnalysisOrchestrator::new(chain, HistoryStore::in_memory()));

    let running = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .analyze(sample_file(MediaType::Video), MediaType::Video, Sensitivity::Medium)
                .await
        })
    };
    gated.started.notified().await;
    assert_eq!(orchestrator.state(), AnalysisPhase::Running);

    let err = orchestrator
        .analyze(sample_file(MediaType::Image), MediaType::Image, Sensitivity::Medium)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Busy(_)));
    assert_eq!(orchestrator.state(), AnalysisPhase::Running);

    gated.release.notify_one();
    let outcome = running.await.unwrap().unwrap();

    assert_eq!(outcome.tier(), ResultTier::Primary);
    assert_eq!(generator.calls(), 0);
    assert_eq!(orchestrator.state(), AnalysisPhase::Completed);
    assert_eq!(orchestrator.history().list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let primary = ScriptedProvider::primary(Script::Hang(Duration::from_millis(60)));
    let chain = FallbackChain::new(Arc::new(SyntheticGenerator::new()))
        .with_primary(primary)
        .with_settings(live());
    let orchestrator = Arc::new(
        AnalysisOrchestrator::new(chain, HistoryStore::in_memory())
            .with_simulator(ProgressSimulator::new(Duration::from_millis(5), 5, 90)),
    );
    let mut updates = orchestrator.subscribe();

    let run = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .analyze(sample_file(MediaType::Image), MediaType::Image, Sensitivity::Medium)
                .await
        })
    };

    let mut seen = Vec::new();
    while updates.changed().await.is_ok() {
        let state = *updates.borrow_and_update();
        seen.push(state);
        if state.phase == AnalysisPhase::Completed {
            break;
        }
    }
    run.await.unwrap().unwrap();

    let percents: Vec<u8> = seen
        .iter()
        .filter(|s| s.phase.is_active() || s.phase == AnalysisPhase::Completed)
        .map(|s| s.percent)
        .collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{:?}", percents);
    assert_eq!(percents.last(), Some(&100));
    assert_eq!(percents.iter().filter(|p| **p == 100).count(), 1);
    assert!(percents[..percents.len() - 1].iter().all(|p| *p <= 90));
}

#[tokio::test]
async fn test_runs_persist_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");

    {
        let store = HistoryStore::new(Arc::new(SqliteHistory::open(&db_path).unwrap()));
        let orchestrator =
            AnalysisOrchestrator::new(FallbackChain::new(Arc::new(SyntheticGenerator::new())), store);
        orchestrator
            .analyze(sample_file(MediaType::Video), MediaType::Video, Sensitivity::High)
            .await
            .unwrap();
    }

    let reopened = HistoryStore::new(Arc::new(SqliteHistory::open(&db_path).unwrap()));
    let entries = reopened.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].filename(), "interview.mp4");
    assert_eq!(entries[0].result().unwrap().tier(), ResultTier::Fallback);
}
