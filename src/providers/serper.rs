//! Search backend using the Serper.dev Google search API.

use serde::{Deserialize, Serialize};

use super::{check_http_response, ProviderError, SearchBackend, SearchHit};

const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

/// Results requested per query; the resolver filters and caps afterwards.
const RESULTS_PER_QUERY: u32 = 10;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Serper search request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct SerperRequest {
    /// The search query.
    pub q: String,
    /// Requested result count.
    pub num: u32,
}

/// Serper search response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct SerperResponse {
    /// Organic (non-ad) results.
    #[serde(default)]
    pub organic: Vec<SerperOrganic>,
}

/// One organic search result.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct SerperOrganic {
    /// Result title.
    #[serde(default)]
    pub title: String,
    /// Result link.
    #[serde(default)]
    pub link: String,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Serper.dev search backend.
#[derive(Debug, Clone)]
pub struct SerperBackend {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl SerperBackend {
    /// Create a new backend with the default Serper endpoint.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a new backend against a custom endpoint (for testing).
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            client: reqwest::Client::new(),
        }
    }
}

/// Parse a Serper response body into search hits, dropping entries with a
/// missing title or link.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body cannot be deserialized.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<Vec<SearchHit>, ProviderError> {
    let resp: SerperResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    Ok(resp
        .organic
        .into_iter()
        .filter(|hit| !hit.title.is_empty() && !hit.link.is_empty())
        .map(|hit| SearchHit {
            title: hit.title,
            url: hit.link,
        })
        .collect())
}

#[async_trait::async_trait]
impl SearchBackend for SerperBackend {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let request = SerperRequest {
            q: query.to_owned(),
            num: RESULTS_PER_QUERY,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }
}
