//! Provider Wire Types
//!
//! The loosely-typed verdict shape remote services return, and its checked
//! conversion into an `AnalysisResult`.

use serde::Deserialize;

use deeptrust_core::{AnalysisResult, CoreError, ResultTier, RiskLevel, Signal, MAX_SCORE};

use crate::error::{ProviderError, ProviderResult};

/// Verdict as reported by a remote service.
///
/// Scores may arrive as floats; risk levels as free text. Nothing here is
/// trusted until [`ProviderVerdict::into_result`] validates it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderVerdict {
    pub score: f64,
    #[serde(default, alias = "riskLevel")]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub signals: Vec<WireSignal>,
}

/// Signal as reported by a remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct WireSignal {
    #[serde(alias = "type")]
    pub kind: String,
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
}

impl ProviderVerdict {
    /// Validate and convert into a result tagged with `tier`.
    ///
    /// A reported risk level that disagrees with the score is rejected as a
    /// data-integrity error. Fractional scores are truncated, which keeps them
    /// in the band the service classified them in since every threshold is a
    /// whole number.
    pub fn into_result(self, tier: ResultTier) -> ProviderResult<AnalysisResult> {
        if !self.score.is_finite() || self.score < 0.0 || self.score > MAX_SCORE as f64 {
            return Err(ProviderError::InvalidResult(CoreError::validation(format!(
                "score {} outside [0, {}]",
                self.score, MAX_SCORE
            ))));
        }
        let score = self.score.floor() as u8;

        let reported = match self.risk_level.as_deref() {
            Some(level) => Some(level.parse::<RiskLevel>()?),
            None => None,
        };

        let signals = self
            .signals
            .into_iter()
            .map(|s| Signal::new(s.kind, s.confidence, s.description))
            .collect();

        Ok(AnalysisResult::from_reported(score, reported, signals, tier)?)
    }
}

/// Strip a Markdown code fence some models wrap JSON answers in.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
