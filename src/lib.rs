//! DeepTrust - Rust Backend Library
//!
//! Orchestration core for media authenticity analysis. It includes:
//! - Command handlers used by the `deeptrust` CLI
//! - The analysis pipeline: provider fallback chain, progress, orchestrator
//! - History ledger and report rendering (PDF + JSON)
//! - Storage layer (SQLite, Config)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used items from commands
pub use commands::{
    // Analysis commands
    analyze_file, load_media,
    // History commands
    list_history, get_stats,
    // Export commands
    export_report, write_artifacts, ExportFormat,
    // Settings commands
    get_settings, update_settings,
};
pub use models::response::{AnalysisReport, CommandResponse};
pub use models::settings::{AppConfig, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
