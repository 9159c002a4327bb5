//! Application State
//!
//! Holds the configuration, the history ledger and the orchestrator built
//! from them. Configuration changes rebuild the orchestrator.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::settings::{AppConfig, HistoryBackend, SettingsUpdate};
use crate::services::history::HistoryStore;
use crate::services::orchestrator::AnalysisOrchestrator;
use crate::services::report::{DirectorySink, ReportGenerator};
use crate::storage::{ConfigService, SqliteHistory};
use crate::utils::error::AppResult;
use crate::utils::paths::exports_dir;

/// Open the history backend selected in config
pub fn open_history(backend: HistoryBackend) -> AppResult<HistoryStore> {
    match backend {
        HistoryBackend::Sqlite => Ok(HistoryStore::new(Arc::new(SqliteHistory::new()?))),
        HistoryBackend::Memory => Ok(HistoryStore::in_memory()),
    }
}

/// Application state shared by all commands
pub struct AppState {
    /// Configuration service for app settings
    config: RwLock<ConfigService>,
    /// Analysis ledger; outlives any single orchestrator
    history: HistoryStore,
    /// Orchestrator built from the current config
    orchestrator: RwLock<Arc<AnalysisOrchestrator>>,
    reports: ReportGenerator,
}

impl AppState {
    /// Load config from ~/.deeptrust and open the configured history backend
    pub fn initialize() -> AppResult<Self> {
        let config = ConfigService::new()?;
        let history = open_history(config.get_config().history_backend)?;
        Self::from_parts(config, history)
    }

    /// Assemble state from an existing config service and ledger
    pub fn from_parts(config: ConfigService, history: HistoryStore) -> AppResult<Self> {
        let orchestrator = AnalysisOrchestrator::from_config(config.get_config(), history.clone())?;
        Ok(Self {
            config: RwLock::new(config),
            history,
            orchestrator: RwLock::new(Arc::new(orchestrator)),
            reports: ReportGenerator::new(),
        })
    }

    /// Get the current configuration
    pub async fn get_config(&self) -> AppConfig {
        self.config.read().await.get_config().clone()
    }

    /// Apply and persist a partial update, then rebuild the orchestrator
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let updated = self.config.write().await.update_config(update)?;
        let rebuilt = AnalysisOrchestrator::from_config(&updated, self.history.clone())?;
        *self.orchestrator.write().await = Arc::new(rebuilt);
        tracing::info!(demo_mode = updated.demo_mode, "configuration updated");
        Ok(updated)
    }

    pub async fn orchestrator(&self) -> Arc<AnalysisOrchestrator> {
        self.orchestrator.read().await.clone()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn reports(&self) -> ReportGenerator {
        self.reports
    }

    /// Sink for exports: the configured directory or ~/.deeptrust/exports
    pub async fn export_sink(&self) -> AppResult<DirectorySink> {
        let configured = self.config.read().await.get_config().export_dir.clone();
        let dir = match configured {
            Some(dir) => dir,
            None => exports_dir()?,
        };
        Ok(DirectorySink::new(dir))
    }
}
