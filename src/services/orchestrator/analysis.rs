//! Analysis Orchestrator
//!
//! Drives one analysis run end to end:
//! `idle -> submitted -> running -> completed`, with `failed` as a transient
//! state that immediately returns to `idle`.
//!
//! One run at a time per instance: a submission while another run is active
//! is rejected with [`AppError::Busy`] and the active run is unaffected.

use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{error, info};

use deeptrust_core::{AnalysisResult, CoreError, HistoryEntry, MediaFile, MediaType, ResultTier, Sensitivity};
use deeptrust_providers::{
    BackendConfig, DetectionBackendProvider, GeminiConfig, GeminiProvider, SyntheticGenerator,
};

use crate::models::settings::AppConfig;
use crate::services::fallback::{ChainSettings, FallbackChain, FallbackExecutionLog};
use crate::services::history::HistoryStore;
use crate::services::progress::{AnalysisPhase, ProgressSimulator, ProgressState, ProgressTracker};
use crate::utils::error::{AppError, AppResult};

/// Seed for the synthetic tier: first 8 bytes of the SHA-256 of the content.
pub fn content_seed(bytes: &[u8]) -> u64 {
    let digest = Sha256::digest(bytes);
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed)
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The ledger entry that was appended
    pub entry: HistoryEntry,
    pub result: AnalysisResult,
    /// Per-tier attempt log
    pub log: FallbackExecutionLog,
}

impl AnalysisOutcome {
    pub fn tier(&self) -> ResultTier {
        self.result.tier()
    }

    /// Provider results rejected for contradicting the risk policy
    pub fn integrity_violations(&self) -> usize {
        self.log.integrity_violations()
    }
}

/// Orchestrates provider selection, progress and history for one run at a time
pub struct AnalysisOrchestrator {
    chain: FallbackChain,
    history: HistoryStore,
    tracker: Arc<ProgressTracker>,
    simulator: Option<ProgressSimulator>,
    seeded_fallback: bool,
    run_lock: tokio::sync::Mutex<()>,
    last_outcome: Mutex<Option<AnalysisOutcome>>,
}

impl AnalysisOrchestrator {
    pub fn new(chain: FallbackChain, history: HistoryStore) -> Self {
        Self {
            chain,
            history,
            tracker: Arc::new(ProgressTracker::new()),
            simulator: None,
            seeded_fallback: true,
            run_lock: tokio::sync::Mutex::new(()),
            last_outcome: Mutex::new(None),
        }
    }

    /// Build the production chain from configuration
    pub fn from_config(config: &AppConfig, history: HistoryStore) -> AppResult<Self> {
        let primary = GeminiProvider::new(GeminiConfig {
            credential: config.primary_credential(),
            model: config.primary.model.clone(),
            base_url: config.primary.base_url.clone(),
            proxy_url: config.proxy_url.clone(),
        })
        .map_err(|e| AppError::config(format!("primary provider: {}", e)))?;

        let secondary = DetectionBackendProvider::new(BackendConfig {
            credential: config.secondary_credential(),
            base_url: config.secondary.base_url.clone(),
            proxy_url: config.proxy_url.clone(),
        })
        .map_err(|e| AppError::config(format!("secondary provider: {}", e)))?;

        let chain = FallbackChain::new(Arc::new(SyntheticGenerator::new()))
            .with_primary(Arc::new(primary))
            .with_secondary(Arc::new(secondary))
            .with_settings(ChainSettings {
                demo_mode: config.demo_mode,
                attempt_timeout: config.provider_timeout(),
            });

        Ok(Self::new(chain, history).with_simulator(ProgressSimulator::from_settings(&config.progress)))
    }

    /// Enable the cosmetic progress ticker
    pub fn with_simulator(mut self, simulator: ProgressSimulator) -> Self {
        self.simulator = Some(simulator);
        self
    }

    /// When false the synthetic tier returns its canonical per-media result
    pub fn with_seeded_fallback(mut self, seeded: bool) -> Self {
        self.seeded_fallback = seeded;
        self
    }

    pub fn state(&self) -> AnalysisPhase {
        self.tracker.current().phase
    }

    pub fn progress(&self) -> ProgressState {
        self.tracker.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tracker.subscribe()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Outcome of the most recent completed run, cleared when a new run starts
    pub fn last_outcome(&self) -> Option<AnalysisOutcome> {
        self.last_outcome.lock().ok().and_then(|guard| guard.clone())
    }

    fn set_last_outcome(&self, outcome: Option<AnalysisOutcome>) {
        if let Ok(mut guard) = self.last_outcome.lock() {
            *guard = outcome;
        }
    }

    /// Analyze one file.
    ///
    /// Input validation happens before any state change. Provider failures
    /// never surface here; the only errors are validation, `Busy` and
    /// history persistence.
    pub async fn analyze(
        &self,
        file: MediaFile,
        media_type: MediaType,
        sensitivity: Sensitivity,
    ) -> AppResult<AnalysisOutcome> {
        file.validate_for(media_type).map_err(|e| match e {
            CoreError::Validation(msg) => AppError::Validation(msg),
            other => AppError::validation(other.to_string()),
        })?;

        let _run = self
            .run_lock
            .try_lock()
            .map_err(|_| AppError::busy("an analysis is already running"))?;

        // idle -> submitted
        self.set_last_outcome(None);
        self.tracker.begin();
        info!(
            filename = %file.filename,
            media_type = %media_type,
            sensitivity = %sensitivity,
            bytes = file.len(),
            "analysis submitted"
        );

        // submitted -> running
        self.tracker.running();
        let ticker = self.simulator.map(|s| s.start(self.tracker.clone()));
        let seed = self.seeded_fallback.then(|| content_seed(&file.bytes));
        let chain_outcome = self.chain.run(&file, media_type, sensitivity, seed).await;
        drop(ticker);

        let entry = HistoryEntry::completed(
            media_type,
            file.filename.clone(),
            chain_outcome.result.clone(),
        );
        if let Err(err) = self.history.append(&entry) {
            error!(error = %err, entry_id = %entry.id(), "failed to record analysis in history");
            self.tracker.fail();
            self.tracker.idle();
            return Err(err);
        }

        // running -> completed
        self.tracker.complete();
        info!(
            entry_id = %entry.id(),
            tier = %chain_outcome.tier(),
            score = chain_outcome.result.score(),
            risk_level = %chain_outcome.result.risk_level(),
            "analysis completed"
        );

        let outcome = AnalysisOutcome {
            entry,
            result: chain_outcome.result,
            log: chain_outcome.log,
        };
        self.set_last_outcome(Some(outcome.clone()));
        Ok(outcome)
    }
}
