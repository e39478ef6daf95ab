//! Pitch artifact assembler.
//!
//! Merges research, slides, summary and scores into one [`PitchArtifact`].
//! Pure and total: the id and timestamp are passed in, so identical inputs
//! always produce identical artifacts.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use pitchcraft_shared::{
    Analysis, Idea, LanguageAnalysis, PitchArtifact, PitchId, QualityAssessment, ResearchResult,
    SlideDeck,
};

use crate::analysis::analyze;
use crate::templates;

/// Everything one pipeline run contributes to its artifact.
#[derive(Debug, Clone)]
pub struct AssemblyInput {
    pub id: PitchId,
    pub idea: Idea,
    pub language: String,
    pub research: ResearchResult,
    pub slides: SlideDeck,
    pub executive_summary: String,
    pub quality: QualityAssessment,
    pub language_analysis: LanguageAnalysis,
    /// Wall time of the run up to assembly.
    pub elapsed: Duration,
    pub generated_at: DateTime<Utc>,
}

pub fn assemble(input: AssemblyInput) -> PitchArtifact {
    let processing_time_ms = u64::try_from(input.elapsed.as_millis()).unwrap_or(u64::MAX);
    debug!(id = %input.id, processing_time_ms, "assembling pitch artifact");

    PitchArtifact {
        id: input.id,
        idea: input.idea,
        language: input.language,
        executive_summary: input.executive_summary,
        slides: input.slides,
        research: input.research,
        analysis: Analysis {
            quality: input.quality,
            language: input.language_analysis,
            processing_time_ms,
        },
        generated_at: input.generated_at,
    }
}

/// Artifact built only from fallback templates and the raw idea. Used when a
/// run fails outside every guarded stage.
pub fn fallback_artifact(idea: &Idea, language: &str, elapsed: Duration) -> PitchArtifact {
    let slides = templates::fallback_deck(idea);
    let executive_summary = templates::fallback_summary(idea);
    let language_analysis = analyze(&slides, &executive_summary);

    assemble(AssemblyInput {
        id: PitchId::new(),
        idea: idea.clone(),
        language: language.to_string(),
        research: templates::fallback_research(idea),
        slides,
        executive_summary,
        quality: templates::fallback_assessment(),
        language_analysis,
        elapsed,
        generated_at: Utc::now(),
    })
}
