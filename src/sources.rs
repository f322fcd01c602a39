//! Reference-source resolution for advice responses.
//!
//! Two strategies, chosen by whether a search backend is configured:
//!
//! 1. **Search-backed**: the generation backend extracts a handful of
//!    pipe-separated queries from the situation; each query runs against the
//!    search backend; organic hits are kept only when their domain ends with
//!    an entry from the high-trust allowlist, deduplicated by
//!    `domain + title` (first seen wins) and capped.
//! 2. **Suggestion fallback**: with no search backend, the generation
//!    backend synthesizes `Title — URL — Query` lines which are parsed and
//!    capped.
//!
//! The whole path is best-effort: a failing individual query is logged and
//! skipped, and a total failure yields an empty source list rather than an
//! error; the advice reply itself is never blocked on sources.

use std::collections::HashSet;

use tracing::warn;

use crate::prompt::ComposedPrompt;
use crate::providers::{GenerationBackend, SearchBackend};
use crate::types::SourceRef;

/// Maximum sources returned per request.
pub const MAX_SOURCES: usize = 8;

/// Maximum queries extracted from one situation.
const MAX_QUERIES: usize = 6;

/// High-trust domains for search-result filtering. A hit is kept when its
/// domain equals an entry or ends with `.entry`, so `www.nih.gov` passes
/// via `nih.gov`, and the bare `gov`/`edu` suffixes admit government and
/// academic hosts generally.
const TRUSTED_DOMAINS: [&str; 14] = [
    "nih.gov",
    "cdc.gov",
    "who.int",
    "nhs.uk",
    "mayoclinic.org",
    "clevelandclinic.org",
    "health.harvard.edu",
    "hopkinsmedicine.org",
    "nature.com",
    "science.org",
    "sciencedirect.com",
    "apa.org",
    "gov",
    "edu",
];

/// Resolve reference sources for an advice situation.
///
/// Picks the search-backed strategy when a search backend is present,
/// otherwise the suggestion fallback. Never fails; degrades to an empty
/// list.
pub async fn resolve_sources(
    generation: &dyn GenerationBackend,
    search: Option<&dyn SearchBackend>,
    message: &str,
) -> Vec<SourceRef> {
    match search {
        Some(backend) => search_backed(generation, backend, message).await,
        None => suggestion_fallback(generation, message).await,
    }
}

/// Search-backed strategy: extract queries, search each, filter and dedup.
async fn search_backed(
    generation: &dyn GenerationBackend,
    search: &dyn SearchBackend,
    message: &str,
) -> Vec<SourceRef> {
    let queries = extract_queries(generation, message).await;

    let mut seen: HashSet<String> = HashSet::new();
    let mut accepted: Vec<SourceRef> = Vec::new();

    for query in queries {
        if accepted.len() >= MAX_SOURCES {
            break;
        }
        let hits = match search.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query = %query, error = %e, "search query failed, skipping");
                continue;
            }
        };
        for hit in hits {
            if accepted.len() >= MAX_SOURCES {
                break;
            }
            let Some(domain) = domain_of(&hit.url) else {
                continue;
            };
            if !domain_allowed(&domain) {
                continue;
            }
            let source = SourceRef {
                title: hit.title,
                url: hit.url,
                domain,
                query: Some(query.clone()),
            };
            if seen.insert(source.dedup_key()) {
                accepted.push(source);
            }
        }
    }

    accepted
}

/// Ask the generation backend for pipe-separated search queries.
async fn extract_queries(generation: &dyn GenerationBackend, message: &str) -> Vec<String> {
    let prompt = ComposedPrompt {
        system: "Extract 3-6 concise web search queries that would find reputable \
                 references for the situation below. Output only the queries, \
                 separated by | characters, nothing else."
            .to_owned(),
        user: format!("Situation:\n\"\"\"{message}\"\"\""),
        temperature: 0.2,
        max_tokens: 120,
    };

    let raw = match generation.generate(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "query extraction failed, falling back to the raw situation");
            String::new()
        }
    };

    let queries = parse_query_list(&raw);
    if queries.is_empty() {
        vec![message.trim().to_owned()]
    } else {
        queries
    }
}

/// Split a pipe-separated query list, trimming and dropping empties.
pub fn parse_query_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_owned)
        .take(MAX_QUERIES)
        .collect()
}

/// Suggestion fallback: have the generation backend synthesize links.
async fn suggestion_fallback(generation: &dyn GenerationBackend, message: &str) -> Vec<SourceRef> {
    let prompt = ComposedPrompt {
        system: "Suggest 4-8 reputable reference links (major health, science, \
                 government, or academic institutions) for the situation below. \
                 Format each suggestion on its own line as: Title — URL — Query. \
                 Output only those lines."
            .to_owned(),
        user: format!("Situation:\n\"\"\"{message}\"\"\""),
        temperature: 0.3,
        max_tokens: 300,
    };

    match generation.generate(&prompt).await {
        Ok(raw) => parse_suggestions(&raw),
        Err(e) => {
            warn!(error = %e, "source suggestion failed, returning no sources");
            Vec::new()
        }
    }
}

/// Parse `Title — URL — Query` lines into sources.
///
/// Lines missing a title or URL, or whose URL has no parsable authority,
/// are discarded. Capped at [`MAX_SOURCES`].
pub fn parse_suggestions(raw: &str) -> Vec<SourceRef> {
    raw.lines()
        .filter_map(parse_suggestion_line)
        .take(MAX_SOURCES)
        .collect()
}

fn parse_suggestion_line(line: &str) -> Option<SourceRef> {
    let mut parts = line.split('\u{2014}').map(str::trim);
    let title = parts.next().filter(|s| !s.is_empty())?;
    let url = parts.next().filter(|s| !s.is_empty())?;
    let query = parts.next().filter(|s| !s.is_empty());
    let domain = domain_of(url)?;

    Some(SourceRef {
        title: title.to_owned(),
        url: url.to_owned(),
        domain,
        query: query.map(str::to_owned),
    })
}

/// Extract the authority (host) segment of a URL.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.host_str().map(str::to_owned)
}

/// Whether a domain ends with a trusted-allowlist entry.
pub fn domain_allowed(domain: &str) -> bool {
    let domain = domain.to_ascii_lowercase();
    TRUSTED_DOMAINS.iter().any(|trusted| {
        domain == *trusted || domain.ends_with(&format!(".{trusted}"))
    })
}
