//! Enhancement-family stage adapters: content enhancement, executive
//! summary, and quality validation all share one enhancement capability and
//! differ only in prompt shape and response parsing.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::instrument;

use pitchcraft_shared::{
    EnhancementCapability, Idea, PitchcraftError, QualityAssessment, Result, SlideDeck,
};

use crate::fallback::{Guarded, Stage, StageObserver, guarded};
use crate::sections::titled_sections;
use crate::templates;

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

pub fn enhance_prompt(deck: &SlideDeck, idea: &Idea) -> String {
    format!(
        "Enhance and improve the following pitch deck content for \"{idea}\":\n\n{}\n\n\
         Please improve each section by:\n\
         1. Making content more specific and data-driven\n\
         2. Adding compelling details and metrics where appropriate\n\
         3. Improving clarity and investor appeal\n\
         4. Maintaining professional tone\n\n\
         Return the enhanced content in the same format, one section per slide, each \
         starting with its exact title followed by a colon.",
        deck.to_outline()
    )
}

pub fn summary_prompt(deck: &SlideDeck, idea: &Idea) -> String {
    format!(
        "Create a compelling 2-3 sentence executive summary for \"{idea}\" based on this pitch \
         content:\n\n{}\n\n\
         The summary should capture the essence of the opportunity, highlight key value \
         propositions and appeal to investors. Reply with the summary text only.",
        deck.to_outline()
    )
}

pub fn validation_prompt(deck: &SlideDeck, summary: &str, idea: &Idea) -> String {
    format!(
        "Analyze and score this pitch deck for \"{idea}\".\n\n\
         Executive summary: {summary}\n\n{}\n\n\
         Reply with a JSON object: {{\"score\": <number 0-10>, \"feedback\": \"<one paragraph>\", \
         \"suggestions\": [\"<specific improvement>\", ...]}}",
        deck.to_outline()
    )
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Match response sections to slides by title. Unmatched slides keep their
/// input content; a response matching no slide at all is `Malformed`.
pub fn parse_enhanced(text: &str, original: &SlideDeck) -> Result<SlideDeck> {
    let sections = titled_sections(text);
    if !sections.iter().any(|(_, body)| !body.is_empty()) {
        return Err(PitchcraftError::malformed(
            "enhancement response matched no slide titles",
        ));
    }

    Ok(original.map_contents(|slide| {
        sections
            .iter()
            .find(|(title, body)| *title == slide.title && !body.is_empty())
            .map_or_else(|| slide.content.clone(), |(_, body)| body.clone())
    }))
}

pub fn parse_summary(text: &str) -> Result<String> {
    let summary = text.trim().trim_matches('"').trim();
    if summary.is_empty() {
        return Err(PitchcraftError::malformed("summary response is empty"));
    }
    Ok(summary.to_string())
}

#[derive(Debug, Deserialize)]
struct ValidationReply {
    score: f32,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
}

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:/\s*10|out of 10)").expect("score regex")
});

fn json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn suggestion_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|line| {
            let lower = line.to_lowercase();
            ["suggest", "improve", "consider"]
                .iter()
                .any(|k| lower.contains(k))
        })
        .map(str::to_string)
        .collect()
}

fn non_empty_or(items: Vec<String>, default: impl FnOnce() -> Vec<String>) -> Vec<String> {
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() { default() } else { items }
}

/// Accept a JSON reply (possibly fenced) or prose with `N/10` / `N out of 10`.
/// No recoverable score is `Malformed`.
pub fn parse_validation(text: &str) -> Result<QualityAssessment> {
    if let Some(reply) = json_object(text).and_then(|raw| serde_json::from_str::<ValidationReply>(raw).ok()) {
        let feedback = reply
            .feedback
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| templates::fallback_assessment().feedback);
        let suggestions = non_empty_or(
            reply.suggestions.unwrap_or_default(),
            templates::default_suggestions,
        );
        return Ok(QualityAssessment::new(reply.score, feedback, suggestions));
    }

    let score = SCORE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .ok_or_else(|| PitchcraftError::malformed("validation response has no score"))?;

    Ok(QualityAssessment::new(
        score,
        text.trim(),
        non_empty_or(suggestion_lines(text), templates::default_suggestions),
    ))
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Per-call budgets for the enhancement family.
#[derive(Debug, Clone, Copy)]
pub struct EnhancementBudgets {
    pub enhance: Duration,
    pub summary: Duration,
    pub validation: Duration,
}

pub struct EnhancementAdapter {
    capability: Arc<dyn EnhancementCapability>,
    budgets: EnhancementBudgets,
}

impl EnhancementAdapter {
    pub fn new(capability: Arc<dyn EnhancementCapability>, budgets: EnhancementBudgets) -> Self {
        Self {
            capability,
            budgets,
        }
    }

    #[instrument(skip_all, fields(stage = "enhancement", provider = %self.capability.name()))]
    pub async fn enhance(
        &self,
        deck: &SlideDeck,
        idea: &Idea,
        observer: &dyn StageObserver,
    ) -> Guarded<SlideDeck> {
        let prompt = enhance_prompt(deck, idea);
        guarded(
            Stage::Enhancement,
            self.budgets.enhance,
            async {
                let text = self.capability.generate(&prompt).await?;
                parse_enhanced(&text, deck)
            },
            || templates::fallback_enhancement(deck, idea),
            observer,
        )
        .await
    }

    #[instrument(skip_all, fields(stage = "summary", provider = %self.capability.name()))]
    pub async fn summarize(
        &self,
        deck: &SlideDeck,
        idea: &Idea,
        observer: &dyn StageObserver,
    ) -> Guarded<String> {
        let prompt = summary_prompt(deck, idea);
        guarded(
            Stage::Summary,
            self.budgets.summary,
            async {
                let text = self.capability.generate(&prompt).await?;
                parse_summary(&text)
            },
            || templates::fallback_summary(idea),
            observer,
        )
        .await
    }

    #[instrument(skip_all, fields(stage = "validation", provider = %self.capability.name()))]
    pub async fn validate(
        &self,
        deck: &SlideDeck,
        summary: &str,
        idea: &Idea,
        observer: &dyn StageObserver,
    ) -> Guarded<QualityAssessment> {
        let prompt = validation_prompt(deck, summary, idea);
        guarded(
            Stage::Validation,
            self.budgets.validation,
            async {
                let text = self.capability.generate(&prompt).await?;
                parse_validation(&text)
            },
            templates::fallback_assessment,
            observer,
        )
        .await
    }
}
