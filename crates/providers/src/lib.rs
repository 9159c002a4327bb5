//! DeepTrust Providers
//!
//! Provides a uniform interface over the services that can produce an
//! authenticity verdict:
//! - Gemini (primary, requires an API key)
//! - Detection backend (secondary, API key optional)
//! - Synthetic generator (last resort, deterministic, never fails)
//!
//! Also includes the credential sentinel type and the HTTP client factory.

pub mod backend;
pub mod credential;
pub mod error;
pub mod gemini;
pub mod http_client;
pub mod provider;
pub mod synthetic;
pub mod types;

// Re-export main types
pub use backend::{BackendConfig, DetectionBackendProvider, DEFAULT_BACKEND_URL};
pub use credential::{Credential, PLACEHOLDER_KEY};
pub use error::{parse_http_error, ProviderError, ProviderResult};
pub use gemini::{GeminiConfig, GeminiProvider, DEFAULT_GEMINI_MODEL};
pub use http_client::build_http_client;
pub use provider::{AnalysisProvider, AnalysisRequest};
pub use synthetic::{ResultGenerator, SyntheticGenerator};
pub use types::ProviderVerdict;
