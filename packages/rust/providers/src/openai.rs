//! OpenAI-compatible chat completion adapter.
//!
//! Serves both slide generation and the enhancement/summary/validation family.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use pitchcraft_shared::{EnhancementCapability, Result, TextGeneration};

use crate::chat::{ChatRequest, ChatResponse};
use crate::http::{build_client, non_blank, parse_base_url, send_json};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_KEY_ENV: &str = "OPENAI_API_KEY";

/// Sampling used when acting as an enhancement model.
const ENHANCE_MAX_TOKENS: u32 = 2000;
const ENHANCE_TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You are a professional business consultant specializing in startup \
pitch decks. Create compelling, investor-ready content that is specific, data-driven, and \
persuasive.";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
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

    #[instrument(skip_all, fields(provider = "openai", model = %self.model, max_tokens = max_tokens))]
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let body = ChatRequest::new(&self.model, SYSTEM_PROMPT, prompt, max_tokens, temperature);

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatResponse = send_json("openai", request).await?;
        let text = non_blank("openai", response.into_first_content())?;

        debug!(chars = text.len(), "openai completion received");
        Ok(text)
    }
}

#[async_trait]
impl TextGeneration for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        self.complete(prompt, max_tokens, temperature).await
    }
}

#[async_trait]
impl EnhancementCapability for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt, ENHANCE_MAX_TOKENS, ENHANCE_TEMPERATURE)
            .await
    }
}
