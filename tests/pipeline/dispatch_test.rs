//! End-to-end dispatcher tests over scripted backends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use retort::dispatch::Dispatcher;
use retort::prompt::ComposedPrompt;
use retort::providers::{GenerationBackend, ProviderError, SearchBackend, SearchHit};
use retort::style::ToneSliders;
use retort::types::{ApiError, GenerationRequest, ReplyFormat};

/// Generation backend that replays a scripted sequence of responses and
/// records the prompts it saw.
struct ScriptedGeneration {
    responses: Mutex<Vec<String>>,
    prompts: Mutex<Vec<ComposedPrompt>>,
}

impl ScriptedGeneration {
    fn new(responses: &[&str]) -> Arc<Self> {
        let mut queue: Vec<String> = responses.iter().map(|s| (*s).to_owned()).collect();
        queue.reverse();
        Arc::new(Self {
            responses: Mutex::new(queue),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<ComposedPrompt> {
        self.prompts.lock().expect("lock").clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedGeneration {
    async fn generate(&self, prompt: &ComposedPrompt) -> Result<String, ProviderError> {
        self.prompts.lock().expect("lock").push(prompt.clone());
        let mut queue = self.responses.lock().expect("lock");
        queue
            .pop()
            .ok_or_else(|| ProviderError::Unavailable("script exhausted".to_owned()))
    }
}

/// Generation backend that always fails with an upstream HTTP status.
struct FailingGeneration;

#[async_trait]
impl GenerationBackend for FailingGeneration {
    async fn generate(&self, _prompt: &ComposedPrompt) -> Result<String, ProviderError> {
        Err(ProviderError::HttpStatus {
            status: 500,
            body: "backend melted".to_owned(),
        })
    }
}

struct TableSearch {
    table: HashMap<String, Vec<SearchHit>>,
}

#[async_trait]
impl SearchBackend for TableSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        self.table
            .get(query)
            .cloned()
            .ok_or_else(|| ProviderError::Unavailable(format!("no results scripted for {query}")))
    }
}

fn advanced_request(reply_format: ReplyFormat) -> GenerationRequest {
    GenerationRequest::Advanced {
        message: "they cancelled on me twice".to_owned(),
        intents: vec!["set a boundary".to_owned()],
        intent_text: None,
        sliders: ToneSliders::default(),
        reply_format,
    }
}

#[tokio::test]
async fn simple_mode_returns_three_clean_options() {
    let generation = ScriptedGeneration::new(&[
        "1. \"Bold of you to assume I noticed.\"\n\
         2. Noted, and filed under never.\n\
         3. 'We can circle back when the idea improves.'\n\
         4. Extra option that should be dropped.",
    ]);
    let dispatcher = Dispatcher::new(Some(generation.clone()), None);

    let result = dispatcher
        .dispatch(GenerationRequest::Simple {
            text: "your plan is bad".to_owned(),
            tone: "Savage".to_owned(),
        })
        .await
        .expect("dispatch succeeds");

    assert_eq!(result.replies.len(), 3);
    assert!(result.sources.is_none());
    for reply in &result.replies {
        assert!(!reply.is_empty());
        assert!(!reply.starts_with(|c: char| c.is_ascii_digit()));
        assert!(!reply.starts_with('"'));
        assert!(!reply.starts_with('\''));
    }

    // Simple mode uses the fixed sampling parameters, not slider-derived ones.
    let prompts = generation.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].temperature, 0.95);
    assert_eq!(prompts[0].max_tokens, 240);
}

#[tokio::test]
async fn advanced_normal_returns_one_normalized_block() {
    let generation =
        ScriptedGeneration::new(&["\"Here's a reply: I hear you, and the answer is still no.\""]);
    let dispatcher = Dispatcher::new(Some(generation), None);

    let result = dispatcher
        .dispatch(advanced_request(ReplyFormat::Normal))
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        result.replies,
        vec!["I hear you, and the answer is still no.".to_owned()]
    );
}

#[tokio::test]
async fn advanced_short_normalizes_as_a_list() {
    let generation = ScriptedGeneration::new(&["1. First option\n2. Second option"]);
    let dispatcher = Dispatcher::new(Some(generation), None);

    let result = dispatcher
        .dispatch(advanced_request(ReplyFormat::Short))
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        result.replies,
        vec!["First option".to_owned(), "Second option".to_owned()]
    );
}

#[tokio::test]
async fn missing_generation_backend_is_a_credential_error() {
    let dispatcher = Dispatcher::new(None, None);

    let err = dispatcher
        .dispatch(advanced_request(ReplyFormat::Normal))
        .await
        .expect_err("no backend configured");
    assert!(matches!(err, ApiError::MissingCredential));
}

#[tokio::test]
async fn backend_http_failure_surfaces_as_upstream() {
    let dispatcher = Dispatcher::new(Some(Arc::new(FailingGeneration)), None);

    let err = dispatcher
        .dispatch(advanced_request(ReplyFormat::Normal))
        .await
        .expect_err("backend fails");
    match err {
        ApiError::Upstream { detail } => {
            assert!(detail.contains("500"));
            assert!(detail.contains("backend melted"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn advice_with_sources_runs_search_after_the_reply() {
    // First scripted response is the advice reply, second is the
    // query-extraction output.
    let generation = ScriptedGeneration::new(&[
        "- Sleep at consistent hours\n- Skip caffeine after noon",
        "sleep hygiene basics",
    ]);
    let search = Arc::new(TableSearch {
        table: HashMap::from([(
            "sleep hygiene basics".to_owned(),
            vec![SearchHit {
                title: "Sleep basics".to_owned(),
                url: "https://www.cdc.gov/sleep".to_owned(),
            }],
        )]),
    });
    let dispatcher = Dispatcher::new(Some(generation), Some(search));
    assert!(dispatcher.has_search_backend());

    let result = dispatcher
        .dispatch(GenerationRequest::Advice {
            message: "I can't sleep".to_owned(),
            intents: Vec::new(),
            intent_text: None,
            sliders: ToneSliders::default(),
            want_sources: true,
            persona: None,
        })
        .await
        .expect("dispatch succeeds");

    assert_eq!(result.replies.len(), 1);
    assert!(result.replies[0].contains("consistent hours"));

    let sources = result.sources.expect("sources requested");
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].domain, "www.cdc.gov");
}

#[tokio::test]
async fn advice_without_want_sources_skips_resolution() {
    let generation = ScriptedGeneration::new(&["- One piece of advice"]);
    let dispatcher = Dispatcher::new(Some(generation.clone()), None);

    let result = dispatcher
        .dispatch(GenerationRequest::Advice {
            message: "situation".to_owned(),
            intents: Vec::new(),
            intent_text: None,
            sliders: ToneSliders::default(),
            want_sources: false,
            persona: None,
        })
        .await
        .expect("dispatch succeeds");

    assert!(result.sources.is_none());
    // Only the advice call itself, no extraction or suggestion calls.
    assert_eq!(generation.prompts().len(), 1);
}
