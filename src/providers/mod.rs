//! External backend abstraction layer.
//!
//! Defines the [`GenerationBackend`] and [`SearchBackend`] traits plus the
//! shared error type used by all backend implementations.
//!
//! Two backends are implemented:
//! - [`openai::OpenAiBackend`]: OpenAI `/v1/chat/completions` API
//! - [`serper::SerperBackend`]: Serper.dev web search API
//!
//! Backend failures surface immediately as terminal errors for the request;
//! there is no retry layer. The one exception is individual search queries
//! inside the source resolver, which are skipped on failure.

use async_trait::async_trait;
use regex::Regex;

use crate::prompt::ComposedPrompt;

pub mod openai;
pub mod serper;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by generation and search backends.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("backend response parse error: {0}")]
    Parse(String),
    /// Upstream backend responded with an error status.
    #[error("backend returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Backend cannot serve the request with current configuration.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// HTTP helpers (shared by all backends)
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure,
/// `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, redact credential-shaped substrings, and truncate.
///
/// Upstream error bodies are surfaced to callers in the `detail` field, so
/// anything that looks like an API key must not pass through.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sk-[A-Za-z0-9_\-]{20,}",
        r"Bearer [A-Za-z0-9._\-]{16,}",
        r"[A-Fa-f0-9]{40,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Text-generation backend interface.
///
/// Implementations must be `Send + Sync`; a dispatcher holds one behind an
/// `Arc` for the process lifetime.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for a composed system/user instruction pair.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn generate(&self, prompt: &ComposedPrompt) -> Result<String, ProviderError>;
}

/// A single organic result from the search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub url: String,
}

/// Web-search backend interface.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search query and return organic hits in ranking order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError>;
}
