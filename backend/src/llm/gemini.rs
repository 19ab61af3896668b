//! Gemini API client
//!
//! Direct HTTP client for the Gemini `generateContent` endpoint. Each call is
//! a single-turn request; the API key travels in the `key` query parameter
//! and is stripped from any error text before it leaves this module.

use async_trait::async_trait;
use std::fmt;

use super::gemini_types::{GeminiApiRequest, GeminiApiResponse};
use super::{ModelClient, ModelError, ResponseFormat};
use crate::config::ModelConfig;
use crate::text::excerpt;

/// Default base URL of the Gemini REST API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Longest provider error body carried into a [`ModelError`]
const ERROR_BODY_EXCERPT: usize = 500;

/// HTTP client for one Gemini model
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client for [`DEFAULT_MODEL`] at [`DEFAULT_BASE_URL`].
    ///
    /// `http` is shared so connections are pooled across calls.
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Build a client from the model section of the server configuration.
    pub fn from_config(http: reqwest::Client, config: &ModelConfig) -> Self {
        Self::new(http, config.api_key.clone())
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone())
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model name this client calls
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String, ModelError> {
        if self.api_key.is_empty() {
            return Err(ModelError::MissingApiKey);
        }

        let force_json = format == ResponseFormat::Json;
        let request_body = GeminiApiRequest::from_prompt(prompt, force_json);

        tracing::debug!(
            model = %self.model,
            force_json = force_json,
            prompt_len = prompt.len(),
            "Calling Gemini API"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            let error_body = excerpt(&error_body, ERROR_BODY_EXCERPT);

            tracing::error!(
                status_code = status_code,
                error_body = %error_body,
                "Gemini API returned error status"
            );

            if status_code == 429 {
                return Err(ModelError::RateLimited(error_body));
            }
            return Err(ModelError::Status {
                status: status_code,
                body: error_body,
            });
        }

        let response_body = response
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.without_url().to_string()))?;

        let parsed: GeminiApiResponse = serde_json::from_str(&response_body).map_err(|e| {
            ModelError::Decode(format!(
                "{} - Response body: {}",
                e,
                excerpt(&response_body, ERROR_BODY_EXCERPT)
            ))
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
        {
            return Err(ModelError::Blocked(reason.clone()));
        }

        if parsed.candidates.is_empty() {
            return Err(ModelError::EmptyResponse(
                "response contains no candidates".to_string(),
            ));
        }

        let text = parsed.first_candidate_text().unwrap_or_default();
        if text.trim().is_empty() {
            let reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(ModelError::EmptyResponse(format!(
                "candidate text is empty (finish reason: {})",
                reason
            )));
        }

        tracing::debug!(
            response_len = text.len(),
            "Successfully received response from Gemini API"
        );

        Ok(text)
    }
}
