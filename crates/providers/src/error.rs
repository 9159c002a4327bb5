//! Provider Error Types
//!
//! Failure taxonomy for remote analysis providers. Every variant is
//! recoverable by the fallback chain; integrity violations are additionally
//! flagged so callers can surface them instead of treating them as noise.

use deeptrust_core::CoreError;
use thiserror::Error;

/// Errors a provider call can produce.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Credential rejected (invalid or revoked API key)
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Too many requests in a short window
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u32>,
    },

    /// Account quota exhausted
    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// Connection refused, DNS failure, reset, etc.
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Attempt exceeded its time budget
    #[error("Timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Provider returned a 5xx or unexpected status
    #[error("Server error{}: {message}", status_suffix(.status))]
    ServerError {
        message: String,
        status: Option<u16>,
    },

    /// Response body could not be understood
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// Provider has no usable credential or endpoint
    #[error("Provider not configured: {message}")]
    NotConfigured { message: String },

    /// Provider result violated the score/risk-level invariant or carried invalid values
    #[error("Rejected provider result: {0}")]
    InvalidResult(#[from] CoreError),

    /// Anything else
    #[error("Error: {message}")]
    Other { message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError {
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError {
            message: msg.into(),
        }
    }

    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured {
            message: msg.into(),
        }
    }

    /// Whether the provider returned a result that contradicts the risk policy.
    ///
    /// These indicate a pipeline bug rather than a flaky dependency.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::InvalidResult(err) if err.is_integrity_violation())
    }

    /// Short machine-readable label for logs and attempt records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "authentication",
            Self::RateLimited { .. } => "rate_limited",
            Self::QuotaExceeded { .. } => "quota",
            Self::NetworkError { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::ServerError { .. } => "server",
            Self::ParseError { .. } => "parse",
            Self::NotConfigured { .. } => "not_configured",
            Self::InvalidResult(err) if err.is_integrity_violation() => "data_integrity",
            Self::InvalidResult(_) => "invalid_result",
            Self::Other { .. } => "other",
        }
    }
}

/// Helper function to create an error for a missing credential
pub fn missing_credential_error(provider: &str) -> ProviderError {
    ProviderError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to map HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> ProviderError {
    match status {
        401 => ProviderError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => ProviderError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        429 if body.to_lowercase().contains("quota") => ProviderError::QuotaExceeded {
            message: format!("{}: {}", provider, body),
        },
        429 => ProviderError::RateLimited {
            message: format!("{}: {}", provider, body),
            retry_after: None,
        },
        400 => ProviderError::Other {
            message: format!("{}: bad request: {}", provider, body),
        },
        500..=599 => ProviderError::ServerError {
            message: format!("{}: {}", provider, body),
            status: Some(status),
        },
        _ => ProviderError::ServerError {
            message: format!("{}: unexpected HTTP {}: {}", provider, status, body),
            status: Some(status),
        },
    }
}

/// Map a reqwest transport error into the provider taxonomy.
pub fn map_transport_error(err: reqwest::Error, provider: &str) -> ProviderError {
    if err.is_timeout() {
        ProviderError::network(format!("{}: request timed out: {}", provider, err))
    } else if err.is_connect() {
        ProviderError::network(format!("{}: cannot connect: {}", provider, err))
    } else if err.is_decode() {
        ProviderError::parse(format!("{}: {}", provider, err))
    } else {
        ProviderError::network(format!("{}: {}", provider, err))
    }
}
