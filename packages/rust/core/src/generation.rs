//! Slide generation stage adapter.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use pitchcraft_shared::{
    Idea, PitchcraftError, ResearchResult, Result, SlideDeck, SlideTitle, TextGeneration,
};

use crate::fallback::{Guarded, Stage, StageObserver, guarded};
use crate::sections::{numbered_sections, strip_title_prefix};
use crate::templates;

/// Per-section guidance appended to each numbered heading in the prompt.
fn section_hint(title: SlideTitle) -> &'static str {
    match title {
        SlideTitle::ExecutiveSummary => "2-3 sentences",
        SlideTitle::ProblemStatement => "specific problems and pain points",
        SlideTitle::Solution => "how the product solves the problem",
        SlideTitle::MarketOpportunity => "market size and potential",
        SlideTitle::BusinessModel => "revenue streams and monetization",
        SlideTitle::CompetitiveAdvantage => "unique value proposition",
        SlideTitle::FinancialProjections => "growth trajectory and metrics",
        SlideTitle::Team => "key team members and expertise",
        SlideTitle::FundingRequest => "investment amount and use of funds",
    }
}

/// Build the numbered nine-section prompt, folding in research when present.
pub fn generation_prompt(idea: &Idea, research: Option<&ResearchResult>) -> String {
    let mut prompt = format!("Generate a comprehensive startup pitch deck for: \"{idea}\"\n\n");

    if let Some(research) = research {
        prompt.push_str("Market research:\n");
        let _ = writeln!(prompt, "- Market size: {}", research.market_size);
        let _ = writeln!(prompt, "- Competitors: {}", research.competitors.join("; "));
        let _ = writeln!(prompt, "- Trends: {}", research.trends.join("; "));
        let _ = writeln!(prompt, "- Funding: {}", research.funding);
        prompt.push('\n');
    }

    prompt.push_str(
        "Create professional content for each slide with specific, detailed information. \
         Use exactly these numbered sections:\n\n",
    );
    for (i, title) in SlideTitle::ALL.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {} ({})", i + 1, title, section_hint(*title));
    }
    prompt.push_str(
        "\nMake it professional, specific, and investor-ready. Focus on concrete details \
         rather than generic statements.",
    );
    prompt
}

/// Map a numbered response onto the canonical deck.
///
/// Section `n` fills slide `n`; a missing or empty section takes that slide's
/// fallback text. A response with no numbered sections is `Malformed`.
pub fn parse_deck(text: &str, idea: &Idea) -> Result<SlideDeck> {
    let sections: HashMap<usize, String> = numbered_sections(text)
        .into_iter()
        .map(|(n, body)| (n, strip_title_prefix(&body).to_string()))
        .filter(|(_, body)| !body.is_empty())
        .collect();

    if sections.is_empty() {
        return Err(PitchcraftError::malformed(
            "generation response has no numbered sections",
        ));
    }

    debug!(sections = sections.len(), "parsed generated deck");

    Ok(SlideDeck::build(|title| {
        sections
            .get(&(title.index() + 1))
            .cloned()
            .unwrap_or_else(|| templates::fallback_slide(title, idea))
    }))
}

pub struct GenerationAdapter {
    capability: Arc<dyn TextGeneration>,
    budget: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl GenerationAdapter {
    pub fn new(
        capability: Arc<dyn TextGeneration>,
        budget: Duration,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            capability,
            budget,
            max_tokens,
            temperature,
        }
    }

    #[instrument(
        skip_all,
        fields(stage = "generation", provider = %self.capability.name(), with_research = research.is_some())
    )]
    pub async fn call(
        &self,
        idea: &Idea,
        research: Option<&ResearchResult>,
        observer: &dyn StageObserver,
    ) -> Guarded<SlideDeck> {
        let prompt = generation_prompt(idea, research);
        guarded(
            Stage::Generation,
            self.budget,
            async {
                let text = self
                    .capability
                    .generate(&prompt, self.max_tokens, self.temperature)
                    .await?;
                parse_deck(&text, idea)
            },
            || templates::fallback_deck(idea),
            observer,
        )
        .await
    }
}
