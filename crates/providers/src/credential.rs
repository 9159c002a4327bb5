//! Provider Credentials
//!
//! API keys resolved from configuration into an explicit three-state type so
//! "configured" is a type-level fact rather than a string comparison at the
//! call site.

use std::fmt;

/// Development placeholder shipped in default configurations.
pub const PLACEHOLDER_KEY: &str = "local-dev-key";

/// A provider credential.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credential {
    /// A real key supplied by the user
    Configured(String),
    /// A placeholder value; treated as "not configured"
    Placeholder,
    /// No key at all
    #[default]
    Missing,
}

impl Credential {
    /// Resolve a raw configuration value.
    ///
    /// Blank strings and [`PLACEHOLDER_KEY`] become `Placeholder`.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Credential::Missing,
            Some("") => Credential::Placeholder,
            Some(v) if v == PLACEHOLDER_KEY => Credential::Placeholder,
            Some(v) => Credential::Configured(v.to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Credential::Configured(_))
    }

    /// The key, if one is configured.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Credential::Configured(key) => Some(key),
            _ => None,
        }
    }
}

/// Never prints the secret itself.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Configured(_) => write!(f, "Credential::Configured(***)"),
            Credential::Placeholder => write!(f, "Credential::Placeholder"),
            Credential::Missing => write!(f, "Credential::Missing"),
        }
    }
}
