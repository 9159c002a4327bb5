//! In-memory history persistence.

use std::sync::RwLock;

use deeptrust_core::HistoryEntry;

use crate::services::history::store::HistoryPersistence;
use crate::utils::error::{AppError, AppResult};

/// Ledger held in process memory; lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryPersistence for InMemoryHistory {
    fn append(&self, entry: &HistoryEntry) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::internal("history lock poisoned"))?;
        if entries.iter().any(|e| e.id() == entry.id()) {
            return Err(AppError::validation(format!(
                "history entry {} already exists",
                entry.id()
            )));
        }
        entries.push(entry.clone());
        Ok(())
    }

    fn list(&self) -> AppResult<Vec<HistoryEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::internal("history lock poisoned"))?;
        Ok(entries.clone())
    }
}
