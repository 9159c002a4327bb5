//! Analysis History
//!
//! The ledger of past analyses and the aggregates the dashboard shows.

pub mod memory;
pub mod store;

pub use memory::InMemoryHistory;
pub use store::{HistoryPersistence, HistoryStore, HistorySummary, MediaFilter};
