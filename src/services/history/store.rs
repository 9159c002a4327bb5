//! History Store
//!
//! Append-only ledger of analyses plus read-only aggregates. Aggregates are
//! computed from the full ledger on every read; there are no counters to
//! keep in sync.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, TimeZone};
use serde::Serialize;
use uuid::Uuid;

use deeptrust_core::{HistoryEntry, MediaType};

use crate::services::history::memory::InMemoryHistory;
use crate::utils::error::{AppError, AppResult};

/// Durable storage behind the ledger.
///
/// `append` must be atomic; `list` returns entries in append order.
pub trait HistoryPersistence: Send + Sync {
    fn append(&self, entry: &HistoryEntry) -> AppResult<()>;

    fn list(&self) -> AppResult<Vec<HistoryEntry>>;
}

/// Which media types an aggregate covers. Empty means all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilter {
    types: Vec<MediaType>,
}

impl MediaFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(media_type: MediaType) -> Self {
        Self {
            types: vec![media_type],
        }
    }

    pub fn of(types: &[MediaType]) -> Self {
        Self {
            types: types.to_vec(),
        }
    }

    pub fn matches(&self, media_type: MediaType) -> bool {
        self.types.is_empty() || self.types.contains(&media_type)
    }
}

impl From<Option<MediaType>> for MediaFilter {
    fn from(media_type: Option<MediaType>) -> Self {
        media_type.map(Self::only).unwrap_or_default()
    }
}

/// Dashboard counters for one filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub monthly: usize,
    pub total: usize,
    pub high_risk: usize,
}

/// The analysis ledger
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn HistoryPersistence>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn HistoryPersistence>) -> Self {
        Self { backend }
    }

    /// Volatile store for tests and `history_backend = "memory"`
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryHistory::new()))
    }

    pub fn append(&self, entry: &HistoryEntry) -> AppResult<()> {
        self.backend.append(entry)
    }

    /// All entries in insertion order
    pub fn list(&self) -> AppResult<Vec<HistoryEntry>> {
        self.backend.list()
    }

    pub fn get(&self, id: Uuid) -> AppResult<HistoryEntry> {
        self.list()?
            .into_iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| AppError::not_found(format!("history entry {}", id)))
    }

    /// Entries created in the current calendar month (local wall clock)
    pub fn count_in_current_month(&self, filter: &MediaFilter) -> AppResult<usize> {
        self.count_in_month(filter, &Local::now())
    }

    /// Entries created in the calendar month containing `reference`,
    /// compared in `reference`'s time zone.
    pub fn count_in_month<Tz: TimeZone>(
        &self,
        filter: &MediaFilter,
        reference: &DateTime<Tz>,
    ) -> AppResult<usize> {
        let zone = reference.timezone();
        let (year, month) = (reference.year(), reference.month());
        Ok(self
            .list()?
            .iter()
            .filter(|e| filter.matches(e.media_type()))
            .filter(|e| {
                let local = e.created_at().with_timezone(&zone);
                local.year() == year && local.month() == month
            })
            .count())
    }

    /// Entries whose result classifies as high risk
    pub fn count_high_risk(&self, filter: &MediaFilter) -> AppResult<usize> {
        Ok(self
            .list()?
            .iter()
            .filter(|e| filter.matches(e.media_type()) && e.is_high_risk())
            .count())
    }

    pub fn count_total(&self, filter: &MediaFilter) -> AppResult<usize> {
        Ok(self
            .list()?
            .iter()
            .filter(|e| filter.matches(e.media_type()))
            .count())
    }

    /// Up to `limit` matching entries, newest first
    pub fn recent(&self, filter: &MediaFilter, limit: usize) -> AppResult<Vec<HistoryEntry>> {
        Ok(self
            .list()?
            .into_iter()
            .rev()
            .filter(|e| filter.matches(e.media_type()))
            .take(limit)
            .collect())
    }

    pub fn summary(&self, filter: &MediaFilter) -> AppResult<HistorySummary> {
        Ok(HistorySummary {
            monthly: self.count_in_current_month(filter)?,
            total: self.count_total(filter)?,
            high_risk: self.count_high_risk(filter)?,
        })
    }
}
