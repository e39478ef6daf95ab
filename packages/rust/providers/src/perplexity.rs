//! Perplexity research adapter (online chat completions with citations).

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use pitchcraft_shared::{ResearchCapability, Result, SearchHit};

use crate::chat::{ChatRequest, ChatResponse};
use crate::http::{build_client, non_blank, parse_base_url, send_json};

pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_MODEL: &str = "llama-3.1-sonar-large-128k-online";
pub const DEFAULT_KEY_ENV: &str = "PERPLEXITY_API_KEY";

const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are a market research analyst providing detailed competitive \
intelligence and market insights for startups.";

/// Research capability backed by Perplexity's online models.
#[derive(Debug, Clone)]
pub struct PerplexityResearch {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl PerplexityResearch {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: parse_base_url(base_url.unwrap_or(DEFAULT_BASE_URL))?,
            api_key: api_key.into(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
        })
    }
}

fn research_prompt(query: &str, result_limit: usize) -> String {
    format!(
        "Research: {query}\n\n\
         Provide:\n\
         1. Market size and growth potential\n\
         2. Top {result_limit} competitors and their positioning\n\
         3. Current market trends and opportunities\n\
         4. Recent funding activity in this space\n\n\
         Provide specific, data-driven insights with numbers when possible."
    )
}

#[async_trait]
impl ResearchCapability for PerplexityResearch {
    fn name(&self) -> &str {
        "perplexity"
    }

    /// Perplexity answers with one synthesized report. It comes back as the
    /// first hit, attributed to the first citation; every further citation
    /// follows as a hit with no content.
    #[instrument(skip_all, fields(provider = "perplexity", result_limit = result_limit))]
    async fn search(&self, query: &str, result_limit: usize) -> Result<Vec<SearchHit>> {
        let prompt = research_prompt(query, result_limit);
        let body = ChatRequest::new(&self.model, SYSTEM_PROMPT, &prompt, MAX_TOKENS, TEMPERATURE);

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let mut response: ChatResponse = send_json("perplexity", request).await?;
        let mut citations = std::mem::take(&mut response.citations).into_iter();
        let content = non_blank("perplexity", response.into_first_content())?;

        let mut hits = vec![SearchHit {
            content,
            url: citations.next().unwrap_or_default(),
        }];
        hits.extend(citations.map(|url| SearchHit {
            content: String::new(),
            url,
        }));

        debug!(
            chars = hits[0].content.len(),
            hits = hits.len(),
            "perplexity research received"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcraft_shared::PitchcraftError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_keeps_every_citation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer pplx-test"))
            .and(body_partial_json(serde_json::json!({
                "model": DEFAULT_MODEL,
                "max_tokens": 1500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Market size: $4 billion"}}],
                "citations": ["https://example.com/report", "https://example.com/other"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let research = PerplexityResearch::new("pplx-test", Some(server.uri().as_str()), None).unwrap();
        let hits = research.search("pet sitting", 5).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "Market size: $4 billion");
        assert_eq!(hits[0].url, "https://example.com/report");
        assert_eq!(hits[1].content, "");
        assert_eq!(hits[1].url, "https://example.com/other");
    }

    #[tokio::test]
    async fn missing_citations_leave_url_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Trend: growth"}}]
            })))
            .mount(&server)
            .await;

        let research = PerplexityResearch::new("k", Some(server.uri().as_str()), None).unwrap();
        let hits = research.search("q", 5).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "");
    }

    #[tokio::test]
    async fn empty_choice_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let research = PerplexityResearch::new("k", Some(server.uri().as_str()), None).unwrap();
        let err = research.search("q", 5).await.unwrap_err();
        assert!(matches!(err, PitchcraftError::Malformed { .. }));
    }

    #[test]
    fn prompt_mentions_limit() {
        let prompt = research_prompt("drones market size", 3);
        assert!(prompt.contains("drones market size"));
        assert!(prompt.contains("Top 3 competitors"));
    }
}
