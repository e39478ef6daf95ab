//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use pitchcraft_shared::{EnhancementCapability, Result, TextGeneration};

use crate::http::{build_client, non_blank, parse_base_url, send_json};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_KEY_ENV: &str = "GOOGLE_GEMINI_API_KEY";

const ENHANCE_MAX_TOKENS: u32 = 2000;
const ENHANCE_TEMPERATURE: f32 = 0.7;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
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

    #[instrument(skip_all, fields(provider = "gemini", model = %self.model, max_tokens = max_tokens))]
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            },
        };

        let request = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response: GenerateResponse = send_json("gemini", request).await?;
        let text = non_blank("gemini", response.into_first_text())?;

        debug!(chars = text.len(), "gemini completion received");
        Ok(text)
    }
}

#[async_trait]
impl EnhancementCapability for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt, ENHANCE_MAX_TOKENS, ENHANCE_TEMPERATURE)
            .await
    }
}

#[async_trait]
impl TextGeneration for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        self.complete(prompt, max_tokens, temperature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcraft_shared::PitchcraftError;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn enhancement_posts_generate_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .and(query_param("key", "g-test"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "enhance this"}]}],
                "generationConfig": {"maxOutputTokens": 2000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Enhanced deck"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new("g-test", Some(server.uri().as_str()), None).unwrap();
        let text = EnhancementCapability::generate(&client, "enhance this")
            .await
            .unwrap();
        assert_eq!(text, "Enhanced deck");
    }

    #[tokio::test]
    async fn no_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("k", Some(server.uri().as_str()), Some("gemini-1.5-flash")).unwrap();
        let err = TextGeneration::generate(&client, "p", 100, 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, PitchcraftError::Malformed { .. }));
    }
}
