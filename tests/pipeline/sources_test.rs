//! Source resolution: allowlist filtering, dedup, quota, and fallback.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use retort::prompt::ComposedPrompt;
use retort::providers::{GenerationBackend, ProviderError, SearchBackend, SearchHit};
use retort::sources::resolve_sources;

/// Generation backend that replays a scripted sequence of responses.
struct ScriptedGeneration {
    responses: Mutex<Vec<String>>,
}

impl ScriptedGeneration {
    fn new(responses: &[&str]) -> Self {
        let mut queue: Vec<String> = responses.iter().map(|s| (*s).to_owned()).collect();
        queue.reverse();
        Self {
            responses: Mutex::new(queue),
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedGeneration {
    async fn generate(&self, _prompt: &ComposedPrompt) -> Result<String, ProviderError> {
        let mut queue = self.responses.lock().expect("lock");
        queue
            .pop()
            .ok_or_else(|| ProviderError::Unavailable("script exhausted".to_owned()))
    }
}

/// Search backend answering from a fixed per-query table; unknown queries
/// fail.
struct TableSearch {
    table: HashMap<String, Vec<SearchHit>>,
}

impl TableSearch {
    fn new(entries: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
        let table = entries
            .into_iter()
            .map(|(query, hits)| {
                let hits = hits
                    .into_iter()
                    .map(|(title, url)| SearchHit {
                        title: title.to_owned(),
                        url: url.to_owned(),
                    })
                    .collect();
                (query.to_owned(), hits)
            })
            .collect();
        Self { table }
    }
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

#[tokio::test]
async fn search_backed_filters_by_allowlist() {
    let generation = ScriptedGeneration::new(&["sleep hygiene"]);
    let search = TableSearch::new(vec![(
        "sleep hygiene",
        vec![
            ("Random blog", "https://example.com/sleep"),
            ("Sleep basics", "https://www.nih.gov/sleep"),
        ],
    )]);

    let sources = resolve_sources(&generation, Some(&search), "how do I sleep better").await;

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].title, "Sleep basics");
    assert_eq!(sources[0].domain, "www.nih.gov");
    assert_eq!(sources[0].query.as_deref(), Some("sleep hygiene"));
}

#[tokio::test]
async fn duplicate_domain_and_title_collapse_to_first_seen() {
    let generation = ScriptedGeneration::new(&["q1|q2"]);
    let search = TableSearch::new(vec![
        (
            "q1",
            vec![("Sleep basics", "https://www.nih.gov/sleep-first")],
        ),
        (
            "q2",
            vec![
                ("Sleep basics", "https://www.nih.gov/sleep-second"),
                ("Other title", "https://www.cdc.gov/sleep"),
            ],
        ),
    ]);

    let sources = resolve_sources(&generation, Some(&search), "sleep").await;

    assert_eq!(sources.len(), 2);
    // First-seen wins: the q1 URL survives.
    assert_eq!(sources[0].url, "https://www.nih.gov/sleep-first");
    assert_eq!(sources[1].title, "Other title");
}

#[tokio::test]
async fn collection_stops_at_the_quota() {
    let many: Vec<(String, String)> = (0..12)
        .map(|i| {
            (
                format!("Article {i}"),
                format!("https://www.cdc.gov/article/{i}"),
            )
        })
        .collect();
    let hits: Vec<(&str, &str)> = many
        .iter()
        .map(|(t, u)| (t.as_str(), u.as_str()))
        .collect();

    let generation = ScriptedGeneration::new(&["q1|q2"]);
    let search = TableSearch::new(vec![("q1", hits), ("q2", vec![])]);

    let sources = resolve_sources(&generation, Some(&search), "topic").await;
    assert_eq!(sources.len(), 8);
}

#[tokio::test]
async fn failing_query_is_skipped_not_fatal() {
    // "missing" is not in the table, so that query errors; "q2" still lands.
    let generation = ScriptedGeneration::new(&["missing|q2"]);
    let search = TableSearch::new(vec![(
        "q2",
        vec![("Stress guide", "https://www.cdc.gov/stress")],
    )]);

    let sources = resolve_sources(&generation, Some(&search), "stress").await;
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].title, "Stress guide");
}

#[tokio::test]
async fn failed_query_extraction_falls_back_to_the_raw_message() {
    // Script exhausted immediately: extraction fails, the message itself is
    // used as the query.
    let generation = ScriptedGeneration::new(&[]);
    let search = TableSearch::new(vec![(
        "insomnia",
        vec![("Insomnia", "https://www.nhs.uk/conditions/insomnia")],
    )]);

    let sources = resolve_sources(&generation, Some(&search), "insomnia").await;
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].domain, "www.nhs.uk");
}

#[tokio::test]
async fn no_search_backend_uses_the_suggestion_fallback() {
    let generation = ScriptedGeneration::new(&[
        "Sleep hygiene \u{2014} https://www.cdc.gov/sleep \u{2014} sleep hygiene basics\n\
         Broken line without separators\n\
         Stress management \u{2014} https://www.apa.org/topics/stress \u{2014} managing stress",
    ]);

    let sources = resolve_sources(&generation, None, "how do I sleep better").await;

    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].domain, "www.cdc.gov");
    assert_eq!(sources[1].domain, "www.apa.org");
    assert_eq!(sources[1].query.as_deref(), Some("managing stress"));
}

#[tokio::test]
async fn fallback_generation_failure_yields_no_sources() {
    let generation = ScriptedGeneration::new(&[]);
    let sources = resolve_sources(&generation, None, "anything").await;
    assert!(sources.is_empty());
}
