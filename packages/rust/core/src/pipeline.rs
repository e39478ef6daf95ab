//! End-to-end pitch pipeline.
//!
//! Stages run in a fixed order: research and generation side by side, then
//! enhancement, summary, optional localization, and validation alongside the
//! local language analysis. Every stage yields a value (live or fallback), so
//! the pipeline has no failure transitions. A panic anywhere in the run is
//! caught at [`Pipeline::run`] and turned into a fully templated artifact.

use std::panic::AssertUnwindSafe;
use std::sync::OnceLock;

use chrono::Utc;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument};

use pitchcraft_shared::{
    AppConfig, Capabilities, Idea, PitchArtifact, PitchId, PitchcraftError, ResearchResult,
    Result, StageBudgets,
};

use crate::analysis::analyze;
use crate::assembler::{AssemblyInput, assemble, fallback_artifact};
use crate::enhancement::{EnhancementAdapter, EnhancementBudgets};
use crate::fallback::StageObserver;
use crate::generation::GenerationAdapter;
use crate::localization::{LocalizationAdapter, is_english};
use crate::research::ResearchAdapter;

/// Longest accepted language tag.
const MAX_LANGUAGE_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Runtime knobs for one [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub budgets: StageBudgets,
    pub research_result_limit: usize,
    pub generation_max_tokens: u32,
    pub generation_temperature: f32,
    /// Used when a request names no language.
    pub default_language: String,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            budgets: StageBudgets::from(&config.pipeline),
            research_result_limit: config.pipeline.research_result_limit,
            generation_max_tokens: config.pipeline.generation_max_tokens,
            generation_temperature: config.pipeline.generation_temperature,
            default_language: config.defaults.language.clone(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Boundary types
// ---------------------------------------------------------------------------

/// Request accepted by [`Pipeline::generate`]. A missing idea is a client
/// error, same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub idea: Option<String>,
    pub language: Option<String>,
}

impl GenerateRequest {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: Some(idea.into()),
            language: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub pitch: PitchArtifact,
}

/// Normalize a language tag such as `es` or `pt-BR`, or use the default.
pub fn normalize_language(requested: Option<&str>, default: &str) -> Result<String> {
    let language = requested.map(str::trim).filter(|l| !l.is_empty()).unwrap_or(default);
    let valid = !language.is_empty()
        && language.len() <= MAX_LANGUAGE_LEN
        && language.starts_with(|c: char| c.is_ascii_alphabetic())
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(PitchcraftError::invalid_input(format!(
            "language must be a tag like 'en' or 'pt-BR', got '{language}'"
        )));
    }
    Ok(language.to_string())
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    research: ResearchAdapter,
    generation: GenerationAdapter,
    enhancement: EnhancementAdapter,
    localization: Option<LocalizationAdapter>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(capabilities: Capabilities, config: PipelineConfig) -> Self {
        let budgets = config.budgets;
        Self {
            research: ResearchAdapter::new(
                capabilities.research,
                budgets.research,
                config.research_result_limit,
            ),
            generation: GenerationAdapter::new(
                capabilities.generation,
                budgets.generation,
                config.generation_max_tokens,
                config.generation_temperature,
            ),
            enhancement: EnhancementAdapter::new(
                capabilities.enhancement,
                EnhancementBudgets {
                    enhance: budgets.enhancement,
                    summary: budgets.summary,
                    validation: budgets.validation,
                },
            ),
            localization: capabilities
                .localization
                .map(|cap| LocalizationAdapter::new(cap, budgets.localization)),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The boundary operation: validate input, then always return a pitch.
    ///
    /// Only a missing or blank idea (or a malformed language tag) is an error,
    /// and it is returned before any stage runs.
    pub async fn generate(
        &self,
        request: GenerateRequest,
        observer: &dyn StageObserver,
    ) -> Result<GenerateResponse> {
        let idea = Idea::new(request.idea.as_deref().unwrap_or(""))?;
        let language =
            normalize_language(request.language.as_deref(), &self.config.default_language)?;

        let pitch = self.run(&idea, &language, observer).await;
        Ok(GenerateResponse {
            success: true,
            pitch,
        })
    }

    /// Run every stage for an already validated idea. Never fails.
    #[instrument(skip_all, fields(idea = %idea, language = %language))]
    pub async fn run(
        &self,
        idea: &Idea,
        language: &str,
        observer: &dyn StageObserver,
    ) -> PitchArtifact {
        let start = Instant::now();

        match AssertUnwindSafe(self.run_stages(idea, language, start, observer))
            .catch_unwind()
            .await
        {
            Ok(artifact) => {
                info!(
                    id = %artifact.id,
                    processing_time_ms = artifact.analysis.processing_time_ms,
                    score = artifact.analysis.quality.score,
                    "pitch assembled"
                );
                artifact
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(%message, "pipeline panicked, returning fallback artifact");
                fallback_artifact(idea, language, start.elapsed())
            }
        }
    }

    async fn run_stages(
        &self,
        idea: &Idea,
        language: &str,
        start: Instant,
        observer: &dyn StageObserver,
    ) -> PitchArtifact {
        // Research publishes here; generation reads whatever is present when
        // it starts.
        let published: OnceLock<ResearchResult> = OnceLock::new();

        let (research, deck) = tokio::join!(
            async {
                let research = self.research.call(idea, observer).await.value;
                let _ = published.set(research.clone());
                research
            },
            async {
                self.generation
                    .call(idea, published.get(), observer)
                    .await
                    .value
            },
        );

        let slides = self.enhancement.enhance(&deck, idea, observer).await.value;
        let summary = self.enhancement.summarize(&slides, idea, observer).await.value;

        let (slides, executive_summary) = match &self.localization {
            Some(localization) if !is_english(language) => {
                let localized = localization
                    .localize(language, &slides, &summary, observer)
                    .await
                    .value;
                (localized.slides, localized.executive_summary)
            }
            None if !is_english(language) => {
                debug!(%language, "no localization provider, keeping source language");
                (slides, summary)
            }
            _ => (slides, summary),
        };

        let (quality, language_analysis) = tokio::join!(
            async {
                self.enhancement
                    .validate(&slides, &executive_summary, idea, observer)
                    .await
                    .value
            },
            async { analyze(&slides, &executive_summary) },
        );

        assemble(AssemblyInput {
            id: PitchId::new(),
            idea: idea.clone(),
            language: language.to_string(),
            research,
            slides,
            executive_summary,
            quality,
            language_analysis,
            elapsed: start.elapsed(),
            generated_at: Utc::now(),
        })
    }
}
