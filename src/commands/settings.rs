//! Settings Commands
//!
//! Commands for reading and updating application settings.

use crate::models::response::CommandResponse;
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::state::AppState;

/// Get current application settings, keys redacted
pub async fn get_settings(state: &AppState) -> CommandResponse<AppConfig> {
    CommandResponse::ok(state.get_config().await.redacted())
}

/// Update application settings with a partial update
pub async fn update_settings(
    state: &AppState,
    update: SettingsUpdate,
) -> CommandResponse<AppConfig> {
    state
        .update_config(update)
        .await
        .map(|config| config.redacted())
        .into()
}
