//! Firecrawl web search adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use pitchcraft_shared::{PitchcraftError, ResearchCapability, Result, SearchHit};

use crate::http::{build_client, parse_base_url, send_json};

pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";
pub const DEFAULT_KEY_ENV: &str = "FIRECRAWL_API_KEY";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: Vec<SearchDocument>,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SearchDocument {
    url: Option<String>,
    markdown: Option<String>,
    content: Option<String>,
    description: Option<String>,
    metadata: Option<DocumentMetadata>,
}

#[derive(Debug, Deserialize)]
struct DocumentMetadata {
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
    description: Option<String>,
}

impl SearchDocument {
    /// Richest text available, then the best URL available.
    fn into_hit(self) -> SearchHit {
        let meta_description = self.metadata.as_ref().and_then(|m| m.description.clone());
        let meta_url = self.metadata.and_then(|m| m.source_url);

        let content = [self.markdown, self.content, self.description, meta_description]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or_default();

        SearchHit {
            content,
            url: self.url.or(meta_url).unwrap_or_default(),
        }
    }
}

/// Research capability backed by Firecrawl's search endpoint.
#[derive(Debug, Clone)]
pub struct FirecrawlResearch {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlResearch {
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: parse_base_url(base_url.unwrap_or(DEFAULT_BASE_URL))?,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ResearchCapability for FirecrawlResearch {
    fn name(&self) -> &str {
        "firecrawl"
    }

    #[instrument(skip_all, fields(provider = "firecrawl", result_limit = result_limit))]
    async fn search(&self, query: &str, result_limit: usize) -> Result<Vec<SearchHit>> {
        let request = self
            .client
            .post(format!("{}/v0/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                limit: result_limit,
            });

        let response: SearchResponse = send_json("firecrawl", request).await?;
        if !response.success {
            return Err(PitchcraftError::Upstream(format!(
                "firecrawl: search failed: {}",
                response.error.as_deref().unwrap_or("unknown error")
            )));
        }

        let hits: Vec<SearchHit> = response
            .data
            .into_iter()
            .take(result_limit)
            .map(SearchDocument::into_hit)
            .collect();

        debug!(hits = hits.len(), "firecrawl search complete");
        Ok(hits)
    }
}
