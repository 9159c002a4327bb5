//! Fallback Chain Integration Tests
//!
//! Tier ordering, skip rules, integrity rejection and per-attempt timeouts.

use std::sync::Arc;
use std::time::Duration;

use deeptrust::services::fallback::{AttemptOutcome, ChainSettings, FallbackChain};
use deeptrust_core::{MediaType, ResultTier, RiskLevel, Sensitivity};
use deeptrust_providers::{AnalysisProvider, ResultGenerator, SyntheticGenerator};

use super::support::{sample_file, CountingGenerator, Script, ScriptedProvider};

fn live() -> ChainSettings {
    ChainSettings {
        demo_mode: false,
        attempt_timeout: Duration::from_secs(5),
    }
}

// ============================================================================
// Tier selection
// ============================================================================

#[tokio::test]
async fn test_primary_success_short_circuits() {
    let primary = ScriptedProvider::primary(Script::Succeed(82));
    let secondary = ScriptedProvider::secondary(Script::Succeed(10));
    let generator = CountingGenerator::new();
    let chain = FallbackChain::new(generator.clone())
        .with_primary(primary.clone())
        .with_secondary(secondary.clone())
        .with_settings(live());

    let outcome = chain
        .run(&sample_file(MediaType::Video), MediaType::Video, Sensitivity::High, None)
        .await;

    assert_eq!(outcome.tier(), ResultTier::Primary);
    assert_eq!(outcome.result.score(), 82);
    assert_eq!(outcome.result.risk_level(), RiskLevel::High);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_primary_failure_falls_to_secondary_with_sensitivity() {
    let primary = ScriptedProvider::primary(Script::NetworkFailure);
    let secondary = ScriptedProvider::secondary(Script::Succeed(45));
    let generator = CountingGenerator::new();
    let chain = FallbackChain::new(generator.clone())
        .with_primary(primary.clone())
        .with_secondary(secondary.clone())
        .with_settings(live());

    let outcome = chain
        .run(&sample_file(MediaType::Image), MediaType::Image, Sensitivity::Low, None)
        .await;

    assert_eq!(outcome.tier(), ResultTier::Secondary);
    assert_eq!(outcome.result.risk_level(), RiskLevel::Medium);
    assert_eq!(secondary.last_sensitivity(), Some(Sensitivity::Low));
    assert_eq!(generator.calls(), 0);

    let primary_attempt = outcome.log.attempt_for(ResultTier::Primary).unwrap();
    assert_eq!(primary_attempt.outcome, AttemptOutcome::Failed);
    assert_eq!(primary_attempt.failure_kind.as_deref(), Some("network"));
}

#[tokio::test]
async fn test_demo_mode_never_calls_primary() {
    let primary = ScriptedProvider::primary(Script::Succeed(90));
    let generator = CountingGenerator::new();
    let chain = FallbackChain::new(generator.clone())
        .with_primary(primary.clone())
        .with_secondary(ScriptedProvider::unconfigured(ResultTier::Secondary));

    let outcome = chain
        .run(&sample_file(MediaType::Audio), MediaType::Audio, Sensitivity::Medium, Some(7))
        .await;

    assert_eq!(primary.calls(), 0);
    assert_eq!(outcome.tier(), ResultTier::Fallback);
    assert_eq!(generator.calls(), 1);
    assert_eq!(
        outcome.log.attempt_for(ResultTier::Primary).unwrap().outcome,
        AttemptOutcome::Skipped
    );
}

#[tokio::test]
async fn test_unconfigured_secondary_is_not_called() {
    let secondary = ScriptedProvider::unconfigured(ResultTier::Secondary);
    let generator = CountingGenerator::new();
    let chain = FallbackChain::new(generator.clone())
        .with_primary(ScriptedProvider::primary(Script::AuthFailure))
        .with_secondary(secondary.clone())
        .with_settings(live());

    let outcome = chain
        .run(&sample_file(MediaType::Image), MediaType::Image, Sensitivity::Medium, None)
        .await;

    assert_eq!(secondary.calls(), 0);
    assert_eq!(generator.calls(), 1);
    assert_eq!(outcome.tier(), ResultTier::Fallback);
    assert_eq!(
        outcome.result,
        SyntheticGenerator::new().generate(MediaType::Image, None)
    );
    assert_eq!(
        outcome.log.attempt_for(ResultTier::Secondary).unwrap().outcome,
        AttemptOutcome::Skipped
    );
}

#[tokio::test]
async fn test_secondary_slot_labels_result_secondary() {
    let provider = ScriptedProvider::new(ResultTier::Primary, true, Script::Succeed(50));
    let chain = FallbackChain::new(CountingGenerator::new())
        .with_secondary(provider.clone())
        .with_settings(live());

    let outcome = chain
        .run(&sample_file(MediaType::Image), MediaType::Image, Sensitivity::Medium, None)
        .await;

    assert_eq!(provider.calls(), 1);
    assert_eq!(outcome.tier(), ResultTier::Secondary);
    assert_eq!(outcome.result.score(), 50);
    assert_eq!(
        outcome.log.attempt_for(ResultTier::Secondary).unwrap().outcome,
        AttemptOutcome::Succeeded
    );
}

// ============================================================================
// Integrity and timeouts
// ============================================================================

#[tokio::test]
async fn test_contradicting_result_is_rejected_and_chain_continues() {
    let primary = ScriptedProvider::primary(Script::Contradict {
        score: 85,
        reported: RiskLevel::Low,
    });
    let secondary = ScriptedProvider::secondary(Script::Succeed(20));
    let chain = FallbackChain::new(CountingGenerator::new())
        .with_primary(primary)
        .with_secondary(secondary)
        .with_settings(live());

    let outcome = chain
        .run(&sample_file(MediaType::Video), MediaType::Video, Sensitivity::Medium, None)
        .await;

    assert_eq!(outcome.tier(), ResultTier::Secondary);
    assert_eq!(outcome.log.integrity_violations(), 1);
    assert_eq!(
        outcome.log.attempt_for(ResultTier::Primary).unwrap().outcome,
        AttemptOutcome::Rejected
    );
}

#[tokio::test(start_paused = true)]
async fn test_hanging_provider_times_out() {
    let primary = ScriptedProvider::primary(Script::Hang(Duration::from_secs(600)));
    let generator = CountingGenerator::new();
    let chain = FallbackChain::new(generator.clone())
        .with_primary(primary.clone())
        .with_settings(ChainSettings {
            demo_mode: false,
            attempt_timeout: Duration::from_secs(2),
        });

    let outcome = chain
        .run(&sample_file(MediaType::Image), MediaType::Image, Sensitivity::Medium, None)
        .await;

    assert_eq!(primary.calls(), 1);
    assert_eq!(outcome.tier(), ResultTier::Fallback);
    assert_eq!(
        outcome
            .log
            .attempt_for(ResultTier::Primary)
            .unwrap()
            .failure_kind
            .as_deref(),
        Some("timeout")
    );
}

// ============================================================================
// Totality
// ============================================================================

#[derive(Clone, Copy, Debug)]
enum Availability {
    Absent,
    Unconfigured,
    Failing,
    Working,
}

const AVAILABILITIES: [Availability; 4] = [
    Availability::Absent,
    Availability::Unconfigured,
    Availability::Failing,
    Availability::Working,
];

fn provider(tier: ResultTier, availability: Availability) -> Option<Arc<dyn AnalysisProvider>> {
    let provider: Arc<dyn AnalysisProvider> = match availability {
        Availability::Absent => return None,
        Availability::Unconfigured => ScriptedProvider::unconfigured(tier),
        Availability::Failing => ScriptedProvider::new(tier, true, Script::NetworkFailure),
        Availability::Working => ScriptedProvider::new(tier, true, Script::Succeed(66)),
    };
    Some(provider)
}

#[tokio::test]
async fn test_every_availability_combination_yields_a_result() {
    for demo_mode in [true, false] {
        for primary in AVAILABILITIES {
            for secondary in AVAILABILITIES {
                let mut chain = FallbackChain::new(CountingGenerator::new()).with_settings(
                    ChainSettings {
                        demo_mode,
                        attempt_timeout: Duration::from_secs(5),
                    },
                );
                if let Some(p) = provider(ResultTier::Primary, primary) {
                    chain = chain.with_primary(p);
                }
                if let Some(s) = provider(ResultTier::Secondary, secondary) {
                    chain = chain.with_secondary(s);
                }

                let outcome = chain
                    .run(&sample_file(MediaType::Audio), MediaType::Audio, Sensitivity::Medium, Some(1))
                    .await;

                let expected = if !demo_mode && matches!(primary, Availability::Working) {
                    ResultTier::Primary
                } else if matches!(secondary, Availability::Working) {
                    ResultTier::Secondary
                } else {
                    ResultTier::Fallback
                };
                assert_eq!(
                    outcome.tier(),
                    expected,
                    "demo={} primary={:?} secondary={:?}",
                    demo_mode,
                    primary,
                    secondary
                );
                assert!(outcome.result.score() <= 100);
            }
        }
    }
}
