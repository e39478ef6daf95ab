//! Capability traits: one per pipeline stage family.
//!
//! Vendor adapters in `pitchcraft-providers` implement these; the pipeline in
//! `pitchcraft-core` only ever sees `Arc<dyn …>` handles. Which vendor backs a
//! capability is decided by configuration at construction time.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SearchHit;

/// Market research: turn a query into a ranked list of hits.
#[async_trait]
pub trait ResearchCapability: Send + Sync {
    /// Human-readable provider name for tracing.
    fn name(&self) -> &str;

    async fn search(&self, query: &str, result_limit: usize) -> Result<Vec<SearchHit>>;
}

/// Free-form text generation with explicit sampling controls.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}

/// Prompt-in, text-out model used for enhancement, summaries and scoring.
#[async_trait]
pub trait EnhancementCapability: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Translation of deck text into a target language.
#[async_trait]
pub trait LocalizationCapability: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// The full set of collaborators a pipeline is constructed with.
#[derive(Clone)]
pub struct Capabilities {
    pub research: Arc<dyn ResearchCapability>,
    pub generation: Arc<dyn TextGeneration>,
    pub enhancement: Arc<dyn EnhancementCapability>,
    /// `None` disables the localization stage entirely.
    pub localization: Option<Arc<dyn LocalizationCapability>>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("research", &self.research.name())
            .field("generation", &self.generation.name())
            .field("enhancement", &self.enhancement.name())
            .field(
                "localization",
                &self.localization.as_ref().map(|l| l.name().to_string()),
            )
            .finish()
    }
}
