//! Detection Backend Provider
//!
//! Secondary analysis tier: the self-hosted detection service. Accepts
//! anonymous calls; an API key is sent only when one is configured.
//!
//! ## API Details
//!
//! - Endpoint: `POST {base_url}/api/analyze`
//! - Auth: optional `X-API-Key: {api_key}`
//! - Body: multipart form with `file`, `media_type`, `sensitivity`
//! - Response: `{ score, riskLevel?, signals: [{ type, confidence, description }] }`

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use deeptrust_core::{AnalysisResult, ResultTier};

use crate::credential::Credential;
use crate::error::{map_transport_error, parse_http_error, ProviderError, ProviderResult};
use crate::http_client::build_http_client;
use crate::provider::{AnalysisProvider, AnalysisRequest};
use crate::types::ProviderVerdict;

/// Default backend location for local development.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

const PROVIDER_NAME: &str = "detection-backend";

/// Settings for the detection backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub credential: Credential,
    pub base_url: String,
    pub proxy_url: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            credential: Credential::Missing,
            base_url: DEFAULT_BACKEND_URL.to_string(),
            proxy_url: None,
        }
    }
}

/// Secondary provider talking to the detection backend over HTTP.
pub struct DetectionBackendProvider {
    client: reqwest::Client,
    config: BackendConfig,
}

impl DetectionBackendProvider {
    pub fn new(config: BackendConfig) -> ProviderResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ProviderError::not_configured(
                "detection backend base URL is empty",
            ));
        }
        let client = build_http_client(config.proxy_url.as_deref())?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/analyze", self.config.base_url.trim_end_matches('/'))
    }

    fn build_form(&self, request: &AnalysisRequest<'_>) -> ProviderResult<Form> {
        let part = Part::bytes(request.file.bytes.clone())
            .file_name(request.file.filename.clone())
            .mime_str(&request.file.mime_type)
            .map_err(|e| ProviderError::Other {
                message: format!("invalid MIME type '{}': {}", request.file.mime_type, e),
            })?;

        Ok(Form::new()
            .part("file", part)
            .text("media_type", request.media_type.as_str())
            .text("sensitivity", request.sensitivity.as_str()))
    }
}

#[async_trait]
impl AnalysisProvider for DetectionBackendProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn tier(&self) -> ResultTier {
        ResultTier::Secondary
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn analyze(&self, request: AnalysisRequest<'_>) -> ProviderResult<AnalysisResult> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .multipart(self.build_form(&request)?);

        if let Some(key) = self.config.credential.secret() {
            builder = builder.header("X-API-Key", key);
        }

        tracing::debug!(
            endpoint = %self.endpoint(),
            media_type = %request.media_type,
            sensitivity = %request.sensitivity,
            authenticated = self.config.credential.is_configured(),
            "sending media to detection backend"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, PROVIDER_NAME))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response body: {}", e)))?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body, PROVIDER_NAME));
        }

        let verdict: ProviderVerdict = serde_json::from_str(&body)
            .map_err(|e| ProviderError::parse(format!("invalid backend response: {}", e)))?;
        verdict.into_result(ResultTier::Secondary)
    }
}
