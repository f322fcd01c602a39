//! Request/response domain types and the API error taxonomy.
//!
//! The raw JSON body is an open bag of optional fields; validation turns it
//! into the closed [`GenerationRequest`] union with per-variant required
//! fields, so mode handling is exhaustive and "missing field" checks live
//! in exactly one place.

use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;
use crate::style::ToneSliders;

/// Requested output shape for the slider-driven mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    /// Three short numbered options, normalized as a list.
    Short,
    /// Single block at the compiled paragraph count.
    #[default]
    Normal,
    /// Single block, one paragraph longer.
    Long,
}

/// The JSON request body as received, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRequest {
    /// Request mode: `"simple"` or `"advanced"`.
    pub mode: Option<String>,
    /// Original post text (simple mode).
    pub text: Option<String>,
    /// Message to reply to (advanced/advice mode).
    pub message: Option<String>,
    /// Scenario description, accepted in place of `message`.
    pub scenario: Option<String>,
    /// Persona tag (simple mode).
    pub tone: Option<String>,
    /// Tone sliders (advanced/advice mode).
    pub sliders: Option<ToneSliders>,
    /// Ordered objective tags.
    pub intents: Vec<String>,
    /// Free-form objective text.
    pub intent_text: Option<String>,
    /// Output shape; defaults to `normal`.
    pub reply_format: Option<ReplyFormat>,
    /// Selects the advice variant of advanced mode.
    pub advice_mode: bool,
    /// Whether advice responses should resolve reference sources.
    pub want_sources: bool,
    /// Optional persona flavor for advice mode.
    pub persona: Option<String>,
}

impl RawRequest {
    /// Validate the raw body into a [`GenerationRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for a missing/unknown mode or any
    /// missing per-mode required field. No backend is contacted before this
    /// validation passes.
    pub fn into_request(self) -> Result<GenerationRequest, ApiError> {
        let mode = self
            .mode
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("missing mode".to_owned()))?;

        match mode {
            "simple" => {
                let text = non_empty(self.text).ok_or_else(|| {
                    ApiError::BadRequest("simple mode requires a non-empty text".to_owned())
                })?;
                let tone = non_empty(self.tone).ok_or_else(|| {
                    ApiError::BadRequest("simple mode requires a tone".to_owned())
                })?;
                Ok(GenerationRequest::Simple { text, tone })
            }
            "advanced" => {
                let message = non_empty(self.message)
                    .or_else(|| non_empty(self.scenario))
                    .ok_or_else(|| {
                        ApiError::BadRequest(
                            "advanced mode requires a non-empty message or scenario".to_owned(),
                        )
                    })?;
                let sliders = self.sliders.ok_or_else(|| {
                    ApiError::BadRequest("advanced mode requires sliders".to_owned())
                })?;

                if self.advice_mode {
                    Ok(GenerationRequest::Advice {
                        message,
                        intents: self.intents,
                        intent_text: self.intent_text,
                        sliders,
                        want_sources: self.want_sources,
                        persona: self.persona,
                    })
                } else {
                    Ok(GenerationRequest::Advanced {
                        message,
                        intents: self.intents,
                        intent_text: self.intent_text,
                        sliders,
                        reply_format: self.reply_format.unwrap_or_default(),
                    })
                }
            }
            other => Err(ApiError::BadRequest(format!("unknown mode: {other:?}"))),
        }
    }
}

/// Return the trimmed string when it is non-empty.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// A validated request, one variant per mode.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    /// Short-options mode: persona-driven, three numbered replies.
    Simple {
        /// The original post to reply to.
        text: String,
        /// Persona tag; unknown tags fall back to the default persona.
        tone: String,
    },
    /// Slider-driven long-form mode.
    Advanced {
        /// Message or scenario to reply to.
        message: String,
        /// Ordered objective tags.
        intents: Vec<String>,
        /// Free-form objective text.
        intent_text: Option<String>,
        /// Tone sliders.
        sliders: ToneSliders,
        /// Requested output shape.
        reply_format: ReplyFormat,
    },
    /// Advice mode: bulleted guidance, optionally with reference sources.
    Advice {
        /// Situation to advise on.
        message: String,
        /// Ordered objective tags.
        intents: Vec<String>,
        /// Free-form objective text.
        intent_text: Option<String>,
        /// Tone sliders.
        sliders: ToneSliders,
        /// Whether to resolve reference sources.
        want_sources: bool,
        /// Optional persona flavor.
        persona: Option<String>,
    },
}

/// A supporting reference link resolved for an advice response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    /// Human-readable title.
    pub title: String,
    /// Full URL.
    pub url: String,
    /// Domain the URL belongs to.
    pub domain: String,
    /// The search query that produced this hit, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl SourceRef {
    /// Identity used for deduplication: `domain + title`.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.domain, self.title)
    }
}

/// The shaped result of a successful request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    /// Normalized reply options (three for simple/short, one block otherwise).
    pub replies: Vec<String>,
    /// Reference sources, only present for advice requests that asked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceRef>>,
}

/// Request-terminal error taxonomy, mapped to HTTP statuses at the server
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing/invalid field or unsupported mode. No retry.
    #[error("{0}")]
    BadRequest(String),
    /// Fixed-window admission denied; caller should back off.
    #[error("Too many requests. Try again shortly.")]
    RateLimited,
    /// The generation backend credential is not configured.
    #[error("generation backend not configured")]
    MissingCredential,
    /// The generation or search backend failed.
    ///
    /// The sanitized upstream error body is surfaced as `detail`; this
    /// leaks upstream error text to the caller, acceptable for this
    /// service's trust model.
    #[error("upstream backend error")]
    Upstream {
        /// Sanitized upstream error description.
        detail: String,
    },
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::HttpStatus { status, body } => ApiError::Upstream {
                detail: format!("status {status}: {body}"),
            },
            other => ApiError::Upstream {
                detail: other.to_string(),
            },
        }
    }
}
