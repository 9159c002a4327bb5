//! History Commands

use deeptrust_core::{HistoryEntry, MediaType};

use crate::models::response::CommandResponse;
use crate::services::history::{HistorySummary, MediaFilter};
use crate::state::AppState;

/// Most recent entries first, optionally limited to one media type
pub fn list_history(
    state: &AppState,
    media_type: Option<MediaType>,
    limit: usize,
) -> CommandResponse<Vec<HistoryEntry>> {
    state
        .history()
        .recent(&MediaFilter::from(media_type), limit)
        .into()
}

/// Dashboard counters: this month, all time, high risk
pub fn get_stats(state: &AppState, media_type: Option<MediaType>) -> CommandResponse<HistorySummary> {
    state.history().summary(&MediaFilter::from(media_type)).into()
}
