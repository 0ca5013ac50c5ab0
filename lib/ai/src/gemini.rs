//! Google Gemini backend.
//!
//! Talks to the `generateContent` REST endpoint. System messages are sent
//! as `systemInstruction`; everything else goes to `contents` in order.

use crate::backend::{
    Candidate, Content, GenerateOptions, GenerateResponse, LlmBackend, Role, TokenUsage,
};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "gemini";

/// Configuration for the Gemini backend.
#[derive(Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Number of candidates to request.
    #[serde(default = "default_candidate_count")]
    pub candidate_count: u32,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_candidate_count() -> u32 {
    1
}

fn default_request_timeout_seconds() -> u64 {
    120
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("candidate_count", &self.candidate_count)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl GeminiConfig {
    /// Creates a configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            candidate_count: default_candidate_count(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }

    /// Returns the sampling options configured for every call.
    #[must_use]
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            candidate_count: self.candidate_count,
            temperature: self.temperature,
        }
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    candidate_count: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    error: Option<ApiError>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

fn build_request(contents: &[Content], options: &GenerateOptions) -> GenerateContentRequest {
    let system_parts: Vec<WirePart> = contents
        .iter()
        .filter(|c| c.role == Role::System)
        .map(|c| WirePart {
            text: Some(c.text.clone()),
        })
        .collect();

    let contents = contents
        .iter()
        .filter(|c| c.role != Role::System)
        .map(|c| WireContent {
            role: Some(
                match c.role {
                    Role::Model => "model",
                    _ => "user",
                }
                .to_string(),
            ),
            parts: vec![WirePart {
                text: Some(c.text.clone()),
            }],
        })
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: (!system_parts.is_empty()).then_some(WireContent {
            role: None,
            parts: system_parts,
        }),
        generation_config: GenerationConfig {
            candidate_count: options.candidate_count,
            temperature: options.temperature,
        },
    }
}

fn into_response(
    response: GenerateContentResponse,
    model: &str,
) -> Result<GenerateResponse, LlmError> {
    if let Some(error) = response.error {
        return Err(LlmError::RequestFailed {
            status: None,
            reason: error.message,
        });
    }

    let candidates = response
        .candidates
        .into_iter()
        .map(|candidate| {
            let text = candidate
                .content
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .filter_map(|part| part.text)
                        .collect::<String>()
                })
                .unwrap_or_default();
            Candidate::new(text)
        })
        .collect();

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count.unwrap_or(0),
            output_tokens: u.candidates_token_count.unwrap_or(0),
        })
        .unwrap_or_default();

    Ok(GenerateResponse {
        candidates,
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        usage,
    })
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiBackend {
    /// Creates a backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot
    /// be built.
    pub fn new(config: GeminiConfig) -> Result<Self, Report<LlmError>> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "gemini api key is empty".to_string(),
            }
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self { config, client })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    #[instrument(skip_all, fields(model = %self.config.model, messages = contents.len()))]
    async fn generate(
        &self,
        contents: &[Content],
        options: &GenerateOptions,
    ) -> Result<GenerateResponse, Report<LlmError>> {
        let request = build_request(contents, options);

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::ProviderUnavailable {
                        provider: PROVIDER.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LlmError::RateLimited { retry_after_secs }.into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                status: Some(status.as_u16()),
                reason: body,
            }
            .into());
        }

        let body: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::ResponseParseFailed {
                    reason: e.to_string(),
                })?;

        let generated = into_response(body, &self.config.model)?;
        debug!(
            candidates = generated.candidates.len(),
            tokens = generated.usage.total(),
            "gemini response received"
        );
        Ok(generated)
    }

    fn provider(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
