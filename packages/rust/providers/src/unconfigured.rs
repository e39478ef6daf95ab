//! Stand-in adapter for a capability with no usable vendor.
//!
//! Every call fails, so the owning stage always degrades to its fallback.

use async_trait::async_trait;

use pitchcraft_shared::{
    EnhancementCapability, LocalizationCapability, PitchcraftError, ResearchCapability, Result,
    SearchHit, TextGeneration,
};

#[derive(Debug, Clone)]
pub struct Unconfigured {
    name: String,
    reason: String,
}

impl Unconfigured {
    /// Vendor selected but its API key env var is unset.
    pub fn missing_key(provider: &str, key_env: &str) -> Self {
        Self {
            name: format!("{provider} (unconfigured)"),
            reason: format!("{provider}: API key env var {key_env} is not set"),
        }
    }

    /// Capability explicitly disabled with `provider = "none"`.
    pub fn disabled(capability: &str) -> Self {
        Self {
            name: "none".into(),
            reason: format!("{capability} capability is disabled"),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(PitchcraftError::config(self.reason.clone()))
    }
}

#[async_trait]
impl ResearchCapability for Unconfigured {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str, _result_limit: usize) -> Result<Vec<SearchHit>> {
        self.fail()
    }
}

#[async_trait]
impl TextGeneration for Unconfigured {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
        self.fail()
    }
}

#[async_trait]
impl EnhancementCapability for Unconfigured {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.fail()
    }
}

#[async_trait]
impl LocalizationCapability for Unconfigured {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, _text: &str, _target_language: &str) -> Result<String> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_fails_with_reason() {
        let adapter = Unconfigured::missing_key("perplexity", "PERPLEXITY_API_KEY");
        let err = adapter.search("q", 5).await.unwrap_err();
        assert!(err.to_string().contains("PERPLEXITY_API_KEY"));
        assert_eq!(ResearchCapability::name(&adapter), "perplexity (unconfigured)");

        let disabled = Unconfigured::disabled("generation");
        assert!(TextGeneration::generate(&disabled, "p", 1, 0.0).await.is_err());
    }
}
