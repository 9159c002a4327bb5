//! Core Error Types
//!
//! Defines the foundational error types shared across the DeepTrust workspace.
//! These error types are dependency-light (thiserror + serde_json) so the
//! provider crate and the application crate can both build on them.
//!
//! The application crate extends these with storage and rendering variants.

use thiserror::Error;

use crate::result::RiskLevel;

/// Core error type for the DeepTrust workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A result whose reported risk level disagrees with its score.
    ///
    /// Raised at construction time; such a result is never stored.
    #[error(
        "Data integrity error: score {score} classifies as {expected} but {reported} was reported"
    )]
    DataIntegrity {
        score: u8,
        reported: RiskLevel,
        expected: RiskLevel,
    },

    /// Validation errors (out-of-range score, malformed signal, bad input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Parse errors for enum tags and identifiers
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether this error is a score/risk-level mismatch
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::DataIntegrity { .. })
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
