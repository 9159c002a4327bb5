//! Gemini Provider
//!
//! Primary analysis tier backed by Google's Gemini `generateContent` API.
//! The media file is sent inline (base64) next to an instruction prompt that
//! asks the model for a JSON verdict.
//!
//! ## API Details
//!
//! - Endpoint: `POST {base_url}/models/{model}:generateContent`
//! - Auth: `x-goog-api-key: {api_key}`
//! - Body: `{ contents: [{ parts: [{ text }, { inline_data: { mime_type, data } }] }], generationConfig }`
//! - Response: `{ candidates: [{ content: { parts: [{ text }] } }] }`

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use deeptrust_core::{AnalysisResult, MediaType, ResultTier};

use crate::credential::Credential;
use crate::error::{
    map_transport_error, missing_credential_error, parse_http_error, ProviderError,
    ProviderResult,
};
use crate::http_client::build_http_client;
use crate::provider::{AnalysisProvider, AnalysisRequest};
use crate::types::{strip_code_fence, ProviderVerdict};

/// Default Gemini API base URL.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const PROVIDER_NAME: &str = "gemini";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub credential: Credential,
    pub model: String,
    pub base_url: Option<String>,
    pub proxy_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            credential: Credential::Missing,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: None,
            proxy_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// Gemini-backed primary provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> ProviderResult<Self> {
        let client = build_http_client(config.proxy_url.as_deref())?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_URL)
            .trim_end_matches('/');
        let model = if self.config.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL
        } else {
            self.config.model.trim()
        };
        format!("{}/models/{}:generateContent", base, model)
    }

    /// Build the JSON request body for the API
    fn build_request_body(&self, request: &AnalysisRequest<'_>) -> serde_json::Value {
        let data = base64::engine::general_purpose::STANDARD.encode(&request.file.bytes);
        serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": analysis_prompt(request.media_type) },
                    {
                        "inline_data": {
                            "mime_type": request.file.mime_type,
                            "data": data,
                        }
                    }
                ]
            }],
            "generationConfig": {
                "temperature": 0,
                "responseMimeType": "application/json",
            }
        })
    }

    fn map_http_error(&self, status: u16, body: &str) -> ProviderError {
        let message = serde_json::from_str::<GeminiErrorResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .and_then(|d| d.message)
            .unwrap_or_else(|| body.to_string());
        // Gemini reports invalid keys as 400 INVALID_ARGUMENT.
        if status == 400 && message.to_lowercase().contains("api key") {
            return ProviderError::AuthenticationFailed {
                message: format!("{}: {}", PROVIDER_NAME, message),
            };
        }
        parse_http_error(status, &message, PROVIDER_NAME)
    }

    fn parse_response(&self, body: &str) -> ProviderResult<AnalysisResult> {
        let response: GenerateContentResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::parse(format!("invalid Gemini response: {}", e)))?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::parse("Gemini returned no candidate text"));
        }

        let verdict: ProviderVerdict = serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| ProviderError::parse(format!("Gemini verdict is not valid JSON: {}", e)))?;
        verdict.into_result(ResultTier::Primary)
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn tier(&self) -> ResultTier {
        ResultTier::Primary
    }

    fn is_configured(&self) -> bool {
        self.config.credential.is_configured()
    }

    async fn analyze(&self, request: AnalysisRequest<'_>) -> ProviderResult<AnalysisResult> {
        let api_key = self
            .config
            .credential
            .secret()
            .ok_or_else(|| missing_credential_error(PROVIDER_NAME))?;

        tracing::debug!(
            model = %self.config.model,
            media_type = %request.media_type,
            bytes = request.file.len(),
            "sending media to Gemini"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.build_request_body(&request))
            .send()
            .await
            .map_err(|e| map_transport_error(e, PROVIDER_NAME))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response body: {}", e)))?;

        if status != 200 {
            return Err(self.map_http_error(status, &body));
        }
        self.parse_response(&body)
    }
}

/// Instruction sent alongside the media.
fn analysis_prompt(media_type: MediaType) -> String {
    let focus = match media_type {
        MediaType::Image => {
            "retouching, compositing, GAN or diffusion generation artifacts, inconsistent lighting"
        }
        MediaType::Video => "face-swap, lip-sync drift, temporal flicker, frame blending",
        MediaType::Audio => "voice cloning, synthetic prosody, spectral splicing",
    };
    format!(
        "You are a media forensics analyst. Examine this {} for signs of manipulation ({}). \
         Respond with JSON only: {{\"score\": <integer 0-100, likelihood of manipulation>, \
         \"riskLevel\": \"low\"|\"medium\"|\"high\" (high if score >= 70, medium if score >= 40), \
         \"signals\": [{{\"type\": <short kebab-case label>, \"confidence\": <0.0-1.0>, \
         \"description\": <one sentence>}}]}}",
        media_type, focus
    )
}
