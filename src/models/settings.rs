//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use deeptrust_core::Sensitivity;
use deeptrust_providers::{Credential, DEFAULT_BACKEND_URL, DEFAULT_GEMINI_MODEL};

/// Upper bound for a single provider attempt.
pub const MAX_PROVIDER_TIMEOUT_SECS: u64 = 300;

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Demo mode skips the primary provider regardless of credentials
    pub demo_mode: bool,
    /// Primary (Gemini) provider settings
    pub primary: PrimaryProviderSettings,
    /// Secondary (detection backend) settings
    pub secondary: SecondaryProviderSettings,
    /// Default sensitivity for new analyses
    pub sensitivity: Sensitivity,
    /// Per-attempt provider timeout in seconds
    pub provider_timeout_secs: u64,
    /// Cosmetic progress ticker
    pub progress: ProgressSettings,
    /// Where analysis history is kept
    pub history_backend: HistoryBackend,
    /// Export directory; defaults to ~/.deeptrust/exports
    pub export_dir: Option<PathBuf>,
    /// Optional proxy for outbound provider traffic
    pub proxy_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for PrimaryProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for SecondaryProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    pub tick_interval_ms: u64,
    pub step: u8,
    pub cap: u8,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            step: 5,
            cap: 90,
        }
    }
}

impl ProgressSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// History storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Sqlite,
    Memory,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            demo_mode: true,
            primary: PrimaryProviderSettings::default(),
            secondary: SecondaryProviderSettings::default(),
            sensitivity: Sensitivity::Medium,
            provider_timeout_secs: 30,
            progress: ProgressSettings::default(),
            history_backend: HistoryBackend::Sqlite,
            export_dir: None,
            proxy_url: None,
        }
    }
}

/// Settings update request (partial update)
///
/// For the key fields, `Some("")` clears the stored key.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub demo_mode: Option<bool>,
    pub primary_api_key: Option<String>,
    pub primary_model: Option<String>,
    pub secondary_api_key: Option<String>,
    pub secondary_base_url: Option<String>,
    pub sensitivity: Option<Sensitivity>,
    pub provider_timeout_secs: Option<u64>,
    pub history_backend: Option<HistoryBackend>,
    pub export_dir: Option<PathBuf>,
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(demo_mode) = update.demo_mode {
            self.demo_mode = demo_mode;
        }
        if let Some(key) = update.primary_api_key {
            self.primary.api_key = non_empty(key);
        }
        if let Some(model) = update.primary_model {
            self.primary.model = model;
        }
        if let Some(key) = update.secondary_api_key {
            self.secondary.api_key = non_empty(key);
        }
        if let Some(base_url) = update.secondary_base_url {
            self.secondary.base_url = base_url;
        }
        if let Some(sensitivity) = update.sensitivity {
            self.sensitivity = sensitivity;
        }
        if let Some(timeout) = update.provider_timeout_secs {
            self.provider_timeout_secs = timeout;
        }
        if let Some(backend) = update.history_backend {
            self.history_backend = backend;
        }
        if let Some(dir) = update.export_dir {
            self.export_dir = Some(dir);
        }
    }

    /// Resolved credential for the primary provider
    pub fn primary_credential(&self) -> Credential {
        Credential::from_setting(self.primary.api_key.as_deref())
    }

    /// Resolved credential for the secondary provider
    pub fn secondary_credential(&self) -> Credential {
        Credential::from_setting(self.secondary.api_key.as_deref())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Copy safe to display: API keys reduced to their last four characters
    pub fn redacted(&self) -> AppConfig {
        let mut copy = self.clone();
        copy.primary.api_key = copy.primary.api_key.as_deref().map(mask_key);
        copy.secondary.api_key = copy.secondary.api_key.as_deref().map(mask_key);
        copy
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.primary.model.trim().is_empty() {
            return Err("primary.model cannot be empty".to_string());
        }

        if self.secondary.base_url.trim().is_empty() {
            return Err("secondary.base_url cannot be empty".to_string());
        }

        if self.provider_timeout_secs == 0 || self.provider_timeout_secs > MAX_PROVIDER_TIMEOUT_SECS {
            return Err(format!(
                "provider_timeout_secs must be between 1 and {}",
                MAX_PROVIDER_TIMEOUT_SECS
            ));
        }

        if self.progress.step == 0 {
            return Err("progress.step must be greater than 0".to_string());
        }

        if self.progress.cap >= 100 {
            return Err(format!(
                "Invalid progress.cap: {}. Must be below 100",
                self.progress.cap
            ));
        }

        if self.progress.tick_interval_ms == 0 {
            return Err("progress.tick_interval_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}
