//! Generation backend using the OpenAI `/v1/chat/completions` API.

use serde::{Deserialize, Serialize};

use crate::prompt::ComposedPrompt;

use super::{check_http_response, GenerationBackend, ProviderError};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OpenAI chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier.
    pub model: String,
    /// System + user instruction pair.
    pub messages: Vec<OpenAiMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum completion tokens.
    pub max_tokens: u32,
}

/// A message in OpenAI chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiMessage {
    /// Role (`system` or `user`).
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// OpenAI chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    /// Response choices.
    pub choices: Vec<OpenAiChoice>,
}

/// A response choice from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    /// Assistant message for this choice.
    pub message: OpenAiResponseMessage,
}

/// Assistant message from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Text content.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// OpenAI chat completions generation backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    /// Create a new backend instance against `base_url` (no trailing slash).
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            client: reqwest::Client::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build an OpenAI API request from a composed prompt.
#[doc(hidden)]
pub fn build_request(model: &str, prompt: &ComposedPrompt) -> OpenAiRequest {
    OpenAiRequest {
        model: model.to_owned(),
        messages: vec![
            OpenAiMessage {
                role: "system".to_owned(),
                content: prompt.system.clone(),
            },
            OpenAiMessage {
                role: "user".to_owned(),
                content: prompt.user.clone(),
            },
        ],
        temperature: prompt.temperature,
        max_tokens: prompt.max_tokens,
    }
}

/// Parse an OpenAI API response into the raw generated text.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the response cannot be deserialized or
/// contains no choices.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    Ok(choice.message.content.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn generate(&self, prompt: &ComposedPrompt) -> Result<String, ProviderError> {
        let api_request = build_request(&self.model, prompt);
        let url = format!("{}{COMPLETIONS_PATH}", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }
}
