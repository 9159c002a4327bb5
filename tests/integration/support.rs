//! Test doubles for providers and the synthetic generator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use deeptrust_core::{
    AnalysisResult, MediaFile, MediaType, ResultTier, RiskLevel, Sensitivity, Signal,
};
use deeptrust_providers::{
    AnalysisProvider, AnalysisRequest, ProviderError, ProviderResult, ResultGenerator,
    SyntheticGenerator,
};

/// What a scripted provider does when called
#[derive(Debug, Clone)]
pub enum Script {
    /// Return a classified result with this score and one signal
    Succeed(u8),
    /// Reject the credential
    AuthFailure,
    /// Connection refused
    NetworkFailure,
    /// Report a risk level that contradicts the score
    Contradict { score: u8, reported: RiskLevel },
    /// Sleep, then succeed
    Hang(Duration),
}

pub struct ScriptedProvider {
    tier: ResultTier,
    configured: bool,
    script: Script,
    calls: AtomicUsize,
    last_sensitivity: Mutex<Option<Sensitivity>>,
}

impl ScriptedProvider {
    pub fn new(tier: ResultTier, configured: bool, script: Script) -> Arc<Self> {
        Arc::new(Self {
            tier,
            configured,
            script,
            calls: AtomicUsize::new(0),
            last_sensitivity: Mutex::new(None),
        })
    }

    pub fn primary(script: Script) -> Arc<Self> {
        Self::new(ResultTier::Primary, true, script)
    }

    pub fn secondary(script: Script) -> Arc<Self> {
        Self::new(ResultTier::Secondary, true, script)
    }

    pub fn unconfigured(tier: ResultTier) -> Arc<Self> {
        Self::new(tier, false, Script::Succeed(50))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_sensitivity(&self) -> Option<Sensitivity> {
        *self.last_sensitivity.lock().unwrap()
    }

    fn result(&self, score: u8) -> ProviderResult<AnalysisResult> {
        let signals = vec![Signal::new("face-swap", 0.92, "Blending seams around the jawline.")];
        Ok(AnalysisResult::classified(score, signals, self.tier)?)
    }
}

#[async_trait]
impl AnalysisProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        match self.tier {
            ResultTier::Primary => "scripted-primary",
            ResultTier::Secondary => "scripted-secondary",
            ResultTier::Fallback => "scripted-fallback",
        }
    }

    fn tier(&self) -> ResultTier {
        self.tier
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn analyze(&self, request: AnalysisRequest<'_>) -> ProviderResult<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_sensitivity.lock().unwrap() = Some(request.sensitivity);
        match &self.script {
            Script::Succeed(score) => self.result(*score),
            Script::AuthFailure => Err(ProviderError::AuthenticationFailed {
                message: "API key not valid".to_string(),
            }),
            Script::NetworkFailure => Err(ProviderError::network("connection refused")),
            Script::Contradict { score, reported } => Ok(AnalysisResult::from_reported(
                *score,
                Some(*reported),
                Vec::new(),
                self.tier,
            )?),
            Script::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                self.result(60)
            }
        }
    }
}

/// Primary provider that blocks until released
pub struct GatedProvider {
    pub started: Notify,
    pub release: Notify,
}

impl GatedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl AnalysisProvider for GatedProvider {
    fn name(&self) -> &'static str {
        "gated"
    }

    fn tier(&self) -> ResultTier {
        ResultTier::Primary
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn analyze(&self, _request: AnalysisRequest<'_>) -> ProviderResult<AnalysisResult> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(AnalysisResult::classified(30, Vec::new(), ResultTier::Primary)?)
    }
}

/// Synthetic generator that counts invocations
#[derive(Default)]
pub struct CountingGenerator {
    inner: SyntheticGenerator,
    calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResultGenerator for CountingGenerator {
    fn generate(&self, media_type: MediaType, seed: Option<u64>) -> AnalysisResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(media_type, seed)
    }
}

pub fn sample_file(media_type: MediaType) -> MediaFile {
    let filename = match media_type {
        MediaType::Image => "portrait.png",
        MediaType::Video => "interview.mp4",
        MediaType::Audio => "voicemail.wav",
    };
    MediaFile::new(filename, vec![0x42; 64])
}
