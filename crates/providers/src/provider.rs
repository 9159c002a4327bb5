//! Analysis Provider Trait
//!
//! Defines the common interface for all analysis providers. The fallback
//! chain holds providers as `Arc<dyn AnalysisProvider>` and knows nothing about
//! their transport.

use async_trait::async_trait;

use deeptrust_core::{AnalysisResult, MediaFile, MediaType, ResultTier, Sensitivity};

use crate::error::ProviderResult;

/// Everything a provider receives for one analysis.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub file: &'a MediaFile,
    pub media_type: MediaType,
    pub sensitivity: Sensitivity,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(file: &'a MediaFile, media_type: MediaType, sensitivity: Sensitivity) -> Self {
        Self {
            file,
            media_type,
            sensitivity,
        }
    }
}

/// Trait that all remote analysis providers implement.
///
/// Implementations own their credential; `is_configured` reports whether the
/// credential is usable. The returned result must already be validated (built
/// through `AnalysisResult::from_reported`) and tagged with `tier()`.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Position this provider occupies in the chain.
    fn tier(&self) -> ResultTier;

    /// Whether the provider holds a usable credential.
    ///
    /// Providers that accept anonymous calls return `true` unconditionally.
    fn is_configured(&self) -> bool;

    /// Analyze one media file.
    async fn analyze(&self, request: AnalysisRequest<'_>) -> ProviderResult<AnalysisResult>;
}
