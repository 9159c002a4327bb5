//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.deeptrust/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the DeepTrust directory (~/.deeptrust/)
pub fn deeptrust_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".deeptrust"))
}

/// Get the config file path (~/.deeptrust/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(deeptrust_dir()?.join("config.json"))
}

/// Get the history database path (~/.deeptrust/history.db)
pub fn history_db_path() -> AppResult<PathBuf> {
    Ok(deeptrust_dir()?.join("history.db"))
}

/// Get the default export directory (~/.deeptrust/exports/)
pub fn exports_dir() -> AppResult<PathBuf> {
    Ok(deeptrust_dir()?.join("exports"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the DeepTrust directory, creating if it doesn't exist
pub fn ensure_deeptrust_dir() -> AppResult<PathBuf> {
    let path = deeptrust_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
