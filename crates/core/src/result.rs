//! Analysis Result Model
//!
//! The shape every tier of the analysis chain resolves to, plus the fixed
//! score-to-risk policy. An `AnalysisResult` can only be built through a
//! validating constructor (or deserialized through one), so a stored result
//! always satisfies `risk_level == classify(score)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Scores at or above this value are high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 70;

/// Scores at or above this value (and below [`HIGH_RISK_THRESHOLD`]) are medium risk.
pub const MEDIUM_RISK_THRESHOLD: u8 = 40;

/// Upper bound of the score scale.
pub const MAX_SCORE: u8 = 100;

/// Signals above this confidence are flagged as strong evidence.
pub const STRONG_SIGNAL_THRESHOLD: f64 = 0.7;

// ============================================================================
// Risk classification
// ============================================================================

/// Risk classification derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(CoreError::parse(format!("unknown risk level: {}", other))),
        }
    }
}

/// Classify a score into a risk level.
///
/// `score >= 70` is high, `40 <= score < 70` is medium, anything lower is low.
pub fn classify(score: u8) -> RiskLevel {
    if score >= HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

// ============================================================================
// Tier
// ============================================================================

/// Position in the provider chain that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultTier {
    /// Remote primary provider (real analysis)
    Primary,
    /// Remote secondary provider (real analysis)
    Secondary,
    /// Deterministic synthetic result
    Fallback,
}

impl ResultTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultTier::Primary => "primary",
            ResultTier::Secondary => "secondary",
            ResultTier::Fallback => "fallback",
        }
    }

    /// Whether the result came from an actual analysis service.
    pub fn is_real_analysis(&self) -> bool {
        !matches!(self, ResultTier::Fallback)
    }
}

impl fmt::Display for ResultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultTier {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(ResultTier::Primary),
            "secondary" => Ok(ResultTier::Secondary),
            "fallback" => Ok(ResultTier::Fallback),
            other => Err(CoreError::parse(format!("unknown result tier: {}", other))),
        }
    }
}

// ============================================================================
// Signals
// ============================================================================

/// One detected anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Anomaly kind, e.g. "face-swap" or "voice-cloning"
    #[serde(rename = "type")]
    pub kind: String,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Human-readable explanation
    pub description: String,
}

impl Signal {
    pub fn new(kind: impl Into<String>, confidence: f64, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            confidence,
            description: description.into(),
        }
    }

    /// Confidence as a whole percentage, rounded to the nearest integer.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Whether the signal is strong evidence of manipulation.
    pub fn is_strong(&self) -> bool {
        self.confidence > STRONG_SIGNAL_THRESHOLD
    }

    fn validate(&self, index: usize) -> CoreResult<()> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(CoreError::validation(format!(
                "signal {} ('{}') has confidence {} outside [0, 1]",
                index, self.kind, self.confidence
            )));
        }
        Ok(())
    }
}

// ============================================================================
// AnalysisResult
// ============================================================================

/// Outcome of one authenticity analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnalysisResult", rename_all = "camelCase")]
pub struct AnalysisResult {
    score: u8,
    risk_level: RiskLevel,
    signals: Vec<Signal>,
    tier: ResultTier,
}

impl AnalysisResult {
    /// Build a result, checking the reported risk level against the score.
    ///
    /// A mismatch is a [`CoreError::DataIntegrity`] error.
    pub fn new(
        score: u8,
        risk_level: RiskLevel,
        signals: Vec<Signal>,
        tier: ResultTier,
    ) -> CoreResult<Self> {
        if score > MAX_SCORE {
            return Err(CoreError::validation(format!(
                "score {} exceeds {}",
                score, MAX_SCORE
            )));
        }
        let expected = classify(score);
        if expected != risk_level {
            return Err(CoreError::DataIntegrity {
                score,
                reported: risk_level,
                expected,
            });
        }
        for (index, signal) in signals.iter().enumerate() {
            signal.validate(index)?;
        }
        Ok(Self {
            score,
            risk_level,
            signals,
            tier,
        })
    }

    /// Build a result whose risk level is derived from the score.
    pub fn classified(score: u8, signals: Vec<Signal>, tier: ResultTier) -> CoreResult<Self> {
        Self::new(score, classify(score), signals, tier)
    }

    /// Build a result from provider-reported values.
    ///
    /// A reported risk level is checked, never trusted; a missing one is derived.
    pub fn from_reported(
        score: u8,
        reported: Option<RiskLevel>,
        signals: Vec<Signal>,
        tier: ResultTier,
    ) -> CoreResult<Self> {
        match reported {
            Some(level) => Self::new(score, level, signals, tier),
            None => Self::classified(score, signals, tier),
        }
    }

    /// Build a signal-less result; the score is capped at [`MAX_SCORE`].
    ///
    /// Infallible: the risk level is always derived from the capped score.
    pub fn without_signals(score: u8, tier: ResultTier) -> Self {
        let score = score.min(MAX_SCORE);
        Self {
            score,
            risk_level: classify(score),
            signals: Vec::new(),
            tier,
        }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn tier(&self) -> ResultTier {
        self.tier
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }

    /// Relabel the result with the chain step that produced it.
    pub fn with_tier(mut self, tier: ResultTier) -> Self {
        self.tier = tier;
        self
    }

    /// Number of signals above the strong-evidence threshold.
    pub fn strong_signal_count(&self) -> usize {
        self.signals.iter().filter(|s| s.is_strong()).count()
    }
}

/// Unchecked wire shape, converted through [`AnalysisResult::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysisResult {
    score: u8,
    risk_level: RiskLevel,
    #[serde(default)]
    signals: Vec<Signal>,
    tier: ResultTier,
}

impl TryFrom<RawAnalysisResult> for AnalysisResult {
    type Error = CoreError;

    fn try_from(raw: RawAnalysisResult) -> CoreResult<Self> {
        AnalysisResult::new(raw.score, raw.risk_level, raw.signals, raw.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0), RiskLevel::Low);
        assert_eq!(classify(39), RiskLevel::Low);
        assert_eq!(classify(40), RiskLevel::Medium);
        assert_eq!(classify(69), RiskLevel::Medium);
        assert_eq!(classify(70), RiskLevel::High);
        assert_eq!(classify(100), RiskLevel::High);
    }

    #[test]
    fn test_classify_full_range_is_monotone() {
        let mut previous = RiskLevel::Low;
        for score in 0..=MAX_SCORE {
            let level = classify(score);
            let rank = |l: RiskLevel| match l {
                RiskLevel::Low => 0,
                RiskLevel::Medium => 1,
                RiskLevel::High => 2,
            };
            assert!(rank(level) >= rank(previous), "score {}", score);
            previous = level;
        }
    }

    #[test]
    fn test_new_rejects_mismatched_risk() {
        let err = AnalysisResult::new(85, RiskLevel::Low, vec![], ResultTier::Primary).unwrap_err();
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn test_new_rejects_out_of_range_score() {
        let err = AnalysisResult::new(101, RiskLevel::High, vec![], ResultTier::Primary).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_new_rejects_bad_confidence() {
        let signals = vec![Signal::new("face-swap", 1.5, "too confident")];
        assert!(AnalysisResult::classified(80, signals, ResultTier::Secondary).is_err());

        let signals = vec![Signal::new("face-swap", f64::NAN, "nan")];
        assert!(AnalysisResult::classified(80, signals, ResultTier::Secondary).is_err());
    }

    #[test]
    fn test_without_signals_caps_score() {
        let result = AnalysisResult::without_signals(250, ResultTier::Fallback);
        assert_eq!(result.score(), MAX_SCORE);
        assert_eq!(result.risk_level(), RiskLevel::High);
        assert!(result.signals().is_empty());
    }

    #[test]
    fn test_from_reported_derives_missing_level() {
        let result = AnalysisResult::from_reported(55, None, vec![], ResultTier::Secondary).unwrap();
        assert_eq!(result.risk_level(), RiskLevel::Medium);
    }

    #[test]
    fn test_serialized_shape() {
        let result = AnalysisResult::new(
            85,
            RiskLevel::High,
            vec![Signal::new("face-swap", 0.92, "Blending artifacts")],
            ResultTier::Primary,
        )
        .unwrap();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["score"], 85);
        assert_eq!(value["riskLevel"], "high");
        assert_eq!(value["tier"], "primary");
        assert_eq!(value["signals"][0]["type"], "face-swap");
    }

    #[test]
    fn test_deserialize_checks_invariant() {
        let json = r#"{"score":20,"riskLevel":"high","signals":[],"tier":"fallback"}"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());

        let json = r#"{"score":20,"riskLevel":"low","signals":[],"tier":"fallback"}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.tier(), ResultTier::Fallback);
    }

    #[test]
    fn test_with_tier_keeps_score_and_signals() {
        let result = AnalysisResult::classified(
            72,
            vec![Signal::new("lip-sync", 0.8, "Mouth lags audio")],
            ResultTier::Primary,
        )
        .unwrap();
        let relabelled = result.clone().with_tier(ResultTier::Secondary);

        assert_eq!(relabelled.tier(), ResultTier::Secondary);
        assert_eq!(relabelled.score(), result.score());
        assert_eq!(relabelled.risk_level(), RiskLevel::High);
        assert_eq!(relabelled.signals(), result.signals());
    }

    #[test]
    fn test_signal_percent_and_strength() {
        let signal = Signal::new("lip-sync", 0.916, "Mouth movement drift");
        assert_eq!(signal.confidence_percent(), 92);
        assert!(signal.is_strong());
        assert!(!Signal::new("noise", 0.7, "").is_strong());
    }
}
