//! Mode routing and pipeline orchestration.
//!
//! The dispatcher owns the backend collaborators and runs the per-mode
//! pipeline: style compilation or persona resolution, prompt composition,
//! one generation call, normalization, and (advice mode) source resolution.
//! Each request is one sequential chain of awaited backend calls; the only
//! cross-request shared state lives in the rate limiter, which runs before
//! dispatch.

use std::sync::Arc;

use tracing::debug;

use crate::normalize::{normalize_block, normalize_options};
use crate::persona::Persona;
use crate::prompt::{compose_advanced, compose_advice, compose_simple};
use crate::providers::{GenerationBackend, SearchBackend};
use crate::sources::resolve_sources;
use crate::style;
use crate::types::{ApiError, GenerationRequest, GenerationResult, ReplyFormat};

/// Routes validated requests through the generation pipeline.
pub struct Dispatcher {
    generation: Option<Arc<dyn GenerationBackend>>,
    search: Option<Arc<dyn SearchBackend>>,
}

impl Dispatcher {
    /// Create a dispatcher.
    ///
    /// `generation` is `None` when no generation credential is configured;
    /// the process still serves, but every request fails with
    /// [`ApiError::MissingCredential`]. `search` being `None` selects the
    /// suggestion fallback for advice sources.
    pub fn new(
        generation: Option<Arc<dyn GenerationBackend>>,
        search: Option<Arc<dyn SearchBackend>>,
    ) -> Self {
        Self { generation, search }
    }

    /// Whether a search backend is configured.
    pub fn has_search_backend(&self) -> bool {
        self.search.is_some()
    }

    /// Execute the pipeline for one validated request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingCredential`] without a generation backend,
    /// or [`ApiError::Upstream`] when the generation backend fails. Source
    /// resolution failures degrade to fewer (or no) sources instead.
    pub async fn dispatch(&self, request: GenerationRequest) -> Result<GenerationResult, ApiError> {
        let generation = self
            .generation
            .as_deref()
            .ok_or(ApiError::MissingCredential)?;

        match request {
            GenerationRequest::Simple { text, tone } => {
                let persona = Persona::resolve(&tone);
                debug!(persona = persona.tag(), "dispatching simple request");
                let prompt = compose_simple(&text, persona);
                let raw = generation.generate(&prompt).await?;
                Ok(GenerationResult {
                    replies: normalize_options(&raw),
                    sources: None,
                })
            }
            GenerationRequest::Advanced {
                message,
                intents,
                intent_text,
                sliders,
                reply_format,
            } => {
                let sheet = style::compile(&sliders);
                debug!(
                    temperature = sheet.params.temperature,
                    max_tokens = sheet.params.max_tokens,
                    "dispatching advanced request"
                );
                let prompt = compose_advanced(
                    &message,
                    &intents,
                    intent_text.as_deref(),
                    &sheet,
                    reply_format,
                );
                let raw = generation.generate(&prompt).await?;
                let replies = match reply_format {
                    ReplyFormat::Short => normalize_options(&raw),
                    ReplyFormat::Normal | ReplyFormat::Long => vec![normalize_block(&raw)],
                };
                Ok(GenerationResult {
                    replies,
                    sources: None,
                })
            }
            GenerationRequest::Advice {
                message,
                intents,
                intent_text,
                sliders,
                want_sources,
                persona,
            } => {
                let sheet = style::compile(&sliders);
                let voice = persona.as_deref().map(Persona::resolve);
                debug!(want_sources, "dispatching advice request");
                let prompt =
                    compose_advice(&message, &intents, intent_text.as_deref(), voice, &sheet);
                let raw = generation.generate(&prompt).await?;

                let sources = if want_sources {
                    Some(resolve_sources(generation, self.search.as_deref(), &message).await)
                } else {
                    None
                };

                Ok(GenerationResult {
                    replies: vec![normalize_block(&raw)],
                    sources,
                })
            }
        }
    }
}
