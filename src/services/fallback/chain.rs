//! Analysis Fallback Chain
//!
//! Tries the primary provider, then the secondary provider, then the
//! synthetic generator. Provider failures are recorded and logged but never
//! returned to the caller: `run` always yields a result, tagged with the tier
//! that produced it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use deeptrust_core::{AnalysisResult, MediaFile, MediaType, ResultTier, Sensitivity};
use deeptrust_providers::{
    AnalysisProvider, AnalysisRequest, ProviderError, ProviderResult, ResultGenerator,
};

/// Default per-attempt budget.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// What happened to one tier during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Precondition not met; the provider was never called
    Skipped,
    /// The provider was called and failed
    Failed,
    /// The provider returned a result that broke the risk policy
    Rejected,
    /// The tier produced the final result
    Succeeded,
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptOutcome::Skipped => write!(f, "skipped"),
            AttemptOutcome::Failed => write!(f, "failed"),
            AttemptOutcome::Rejected => write!(f, "rejected"),
            AttemptOutcome::Succeeded => write!(f, "succeeded"),
        }
    }
}

/// Record of a single tier in the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackAttempt {
    /// Tier that was considered
    pub tier: ResultTier,
    /// Provider name (or "synthetic")
    pub provider: String,
    pub outcome: AttemptOutcome,
    /// Short failure label (`ProviderError::kind`)
    pub failure_kind: Option<String>,
    /// Skip reason or error message
    pub detail: Option<String>,
    /// Duration of the attempt in milliseconds
    pub duration_ms: u64,
}

impl FallbackAttempt {
    fn skipped(tier: ResultTier, provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tier,
            provider: provider.into(),
            outcome: AttemptOutcome::Skipped,
            failure_kind: None,
            detail: Some(reason.into()),
            duration_ms: 0,
        }
    }

    fn failure(tier: ResultTier, provider: &str, err: &ProviderError, duration_ms: u64) -> Self {
        let outcome = if err.is_integrity_violation() {
            AttemptOutcome::Rejected
        } else {
            AttemptOutcome::Failed
        };
        Self {
            tier,
            provider: provider.to_string(),
            outcome,
            failure_kind: Some(err.kind().to_string()),
            detail: Some(err.to_string()),
            duration_ms,
        }
    }

    fn success(tier: ResultTier, provider: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            tier,
            provider: provider.into(),
            outcome: AttemptOutcome::Succeeded,
            failure_kind: None,
            detail: None,
            duration_ms,
        }
    }
}

/// Log of every tier considered during one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackExecutionLog {
    pub attempts: Vec<FallbackAttempt>,
    /// Total time spent in provider calls, in milliseconds
    pub total_duration_ms: u64,
}

impl FallbackExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attempt(&mut self, attempt: FallbackAttempt) {
        self.total_duration_ms += attempt.duration_ms;
        self.attempts.push(attempt);
    }

    /// Number of providers that were called and failed
    pub fn failed_attempts_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, AttemptOutcome::Failed | AttemptOutcome::Rejected))
            .count()
    }

    /// Number of results rejected for breaking the risk policy
    pub fn integrity_violations(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome == AttemptOutcome::Rejected)
            .count()
    }

    pub fn attempt_for(&self, tier: ResultTier) -> Option<&FallbackAttempt> {
        self.attempts.iter().find(|a| a.tier == tier)
    }
}

/// Result of one chain run
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub result: AnalysisResult,
    pub log: FallbackExecutionLog,
}

impl ChainOutcome {
    pub fn tier(&self) -> ResultTier {
        self.result.tier()
    }
}

/// Chain behaviour knobs
#[derive(Debug, Clone, Copy)]
pub struct ChainSettings {
    /// Demo mode never calls the primary provider
    pub demo_mode: bool,
    /// Budget for each provider call
    pub attempt_timeout: Duration,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            demo_mode: true,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

/// Analysis Fallback Chain
///
/// Attempts run sequentially; at most one provider call is outstanding.
#[derive(Clone)]
pub struct FallbackChain {
    primary: Option<Arc<dyn AnalysisProvider>>,
    secondary: Option<Arc<dyn AnalysisProvider>>,
    generator: Arc<dyn ResultGenerator>,
    settings: ChainSettings,
}

impl FallbackChain {
    /// Create a chain with only the synthetic tier
    pub fn new(generator: Arc<dyn ResultGenerator>) -> Self {
        Self {
            primary: None,
            secondary: None,
            generator,
            settings: ChainSettings::default(),
        }
    }

    pub fn with_primary(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.primary = Some(provider);
        self
    }

    pub fn with_secondary(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.secondary = Some(provider);
        self
    }

    pub fn with_settings(mut self, settings: ChainSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> ChainSettings {
        self.settings
    }

    /// Whether the primary tier will be attempted on the next run
    pub fn primary_enabled(&self) -> bool {
        !self.settings.demo_mode && self.primary.as_ref().is_some_and(|p| p.is_configured())
    }

    /// Run the chain. Never fails.
    pub async fn run(
        &self,
        file: &MediaFile,
        media_type: MediaType,
        sensitivity: Sensitivity,
        seed: Option<u64>,
    ) -> ChainOutcome {
        let request = AnalysisRequest::new(file, media_type, sensitivity);
        let mut log = FallbackExecutionLog::new();

        // Primary tier
        match &self.primary {
            None => {
                log.add_attempt(FallbackAttempt::skipped(
                    ResultTier::Primary,
                    "none",
                    "no primary provider",
                ));
            }
            Some(_) if self.settings.demo_mode => {
                debug!(tier = %ResultTier::Primary, "demo mode active, skipping tier");
                log.add_attempt(FallbackAttempt::skipped(
                    ResultTier::Primary,
                    self.provider_name(&self.primary),
                    "demo mode",
                ));
            }
            Some(provider) if !provider.is_configured() => {
                debug!(
                    tier = %ResultTier::Primary,
                    provider = provider.name(),
                    "credential not configured, skipping tier"
                );
                log.add_attempt(FallbackAttempt::skipped(
                    ResultTier::Primary,
                    provider.name(),
                    "credential not configured",
                ));
            }
            Some(provider) => {
                if let Some(result) = self
                    .attempt(ResultTier::Primary, provider.as_ref(), request, &mut log)
                    .await
                {
                    return ChainOutcome { result, log };
                }
            }
        }

        // Secondary tier
        match &self.secondary {
            Some(provider) if provider.is_configured() => {
                if let Some(result) = self
                    .attempt(ResultTier::Secondary, provider.as_ref(), request, &mut log)
                    .await
                {
                    return ChainOutcome { result, log };
                }
            }
            Some(provider) => {
                debug!(
                    tier = %ResultTier::Secondary,
                    provider = provider.name(),
                    "provider not configured, skipping tier"
                );
                log.add_attempt(FallbackAttempt::skipped(
                    ResultTier::Secondary,
                    provider.name(),
                    "provider not configured",
                ));
            }
            None => {
                log.add_attempt(FallbackAttempt::skipped(
                    ResultTier::Secondary,
                    "none",
                    "no secondary provider",
                ));
            }
        }

        // Synthetic tier
        let result = self.generator.generate(media_type, seed);
        warn!(
            media_type = %media_type,
            score = result.score(),
            failed_attempts = log.failed_attempts_count(),
            "no provider produced a result, returning synthetic fallback"
        );
        log.add_attempt(FallbackAttempt::success(ResultTier::Fallback, "synthetic", 0));
        ChainOutcome { result, log }
    }

    fn provider_name(&self, provider: &Option<Arc<dyn AnalysisProvider>>) -> &'static str {
        provider.as_ref().map(|p| p.name()).unwrap_or("none")
    }

    /// One bounded provider call for the step `tier`. Failures are logged and
    /// recorded, never returned.
    ///
    /// The returned result always carries `tier`, whatever the provider stamped.
    async fn attempt(
        &self,
        tier: ResultTier,
        provider: &dyn AnalysisProvider,
        request: AnalysisRequest<'_>,
        log: &mut FallbackExecutionLog,
    ) -> Option<AnalysisResult> {
        let name = provider.name();
        info!(tier = %tier, provider = name, media_type = %request.media_type, "attempting analysis");

        let started = Instant::now();
        let outcome = self.call_with_timeout(provider, request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                if result.tier() != tier {
                    warn!(
                        tier = %tier,
                        provider = name,
                        reported_tier = %result.tier(),
                        "provider labelled its result with another tier, relabelling"
                    );
                }
                let result = result.with_tier(tier);
                info!(
                    tier = %tier,
                    provider = name,
                    score = result.score(),
                    risk_level = %result.risk_level(),
                    elapsed_ms,
                    "provider succeeded"
                );
                log.add_attempt(FallbackAttempt::success(tier, name, elapsed_ms));
                Some(result)
            }
            Err(err) if err.is_integrity_violation() => {
                error!(
                    tier = %tier,
                    provider = name,
                    error = %err,
                    elapsed_ms,
                    "provider result rejected: risk level contradicts score"
                );
                log.add_attempt(FallbackAttempt::failure(tier, name, &err, elapsed_ms));
                None
            }
            Err(err) => {
                warn!(
                    tier = %tier,
                    provider = name,
                    kind = err.kind(),
                    error = %err,
                    elapsed_ms,
                    "provider failed, falling through"
                );
                log.add_attempt(FallbackAttempt::failure(tier, name, &err, elapsed_ms));
                None
            }
        }
    }

    async fn call_with_timeout(
        &self,
        provider: &dyn AnalysisProvider,
        request: AnalysisRequest<'_>,
    ) -> ProviderResult<AnalysisResult> {
        let budget = self.settings.attempt_timeout;
        match tokio::time::timeout(budget, provider.analyze(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                seconds: budget.as_secs(),
            }),
        }
    }
}
