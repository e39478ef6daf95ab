//! Lingo.dev translation adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pitchcraft_shared::{LocalizationCapability, Result};

use crate::http::{build_client, non_blank, parse_base_url, send_json};

pub const DEFAULT_BASE_URL: &str = "https://api.lingo.dev";
pub const DEFAULT_KEY_ENV: &str = "LINGO_DEV_API_KEY";

/// Decks are always generated in English before translation.
const SOURCE_LANGUAGE: &str = "en";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
    preserve_formatting: bool,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LingoTranslator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LingoTranslator {
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: parse_base_url(base_url.unwrap_or(DEFAULT_BASE_URL))?,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl LocalizationCapability for LingoTranslator {
    fn name(&self) -> &str {
        "lingo"
    }

    #[instrument(skip_all, fields(provider = "lingo", target_language = %target_language))]
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let request = self
            .client
            .post(format!("{}/v1/translate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&TranslateRequest {
                text,
                source_language: SOURCE_LANGUAGE,
                target_language,
                preserve_formatting: true,
            });

        let response: TranslateResponse = send_json("lingo", request).await?;
        non_blank("lingo", response.translated_text)
    }
}
