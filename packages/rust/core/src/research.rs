//! Research stage adapter.
//!
//! Queries the research capability and distills its hits into a
//! [`ResearchResult`], filling any field the text does not yield from the
//! sector-aware fallback template.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use pitchcraft_shared::{Idea, PitchcraftError, ResearchCapability, ResearchResult, Result, SearchHit};

use crate::fallback::{Guarded, Stage, StageObserver, guarded};
use crate::templates;

/// Most competitors or trends kept from live research.
const MAX_LIST_ITEMS: usize = 5;

pub fn research_query(idea: &Idea) -> String {
    format!("{idea} market size, competitors, trends and funding")
}

pub struct ResearchAdapter {
    capability: Arc<dyn ResearchCapability>,
    budget: Duration,
    result_limit: usize,
}

impl ResearchAdapter {
    pub fn new(capability: Arc<dyn ResearchCapability>, budget: Duration, result_limit: usize) -> Self {
        Self {
            capability,
            budget,
            result_limit,
        }
    }

    #[instrument(skip_all, fields(stage = "research", provider = %self.capability.name()))]
    pub async fn call(&self, idea: &Idea, observer: &dyn StageObserver) -> Guarded<ResearchResult> {
        let query = research_query(idea);
        guarded(
            Stage::Research,
            self.budget,
            async {
                let hits = self.capability.search(&query, self.result_limit).await?;
                parse_research(&hits, idea)
            },
            || templates::fallback_research(idea),
            observer,
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn strip_list_number(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line.trim();
    }
    rest.strip_prefix('.').unwrap_or(rest).trim()
}

fn is_numbered(line: &str) -> bool {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.len() < line.len() && rest.starts_with('.')
}

fn mentions_any(line: &str, needles: &[&str]) -> bool {
    let lower = line.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

fn first_mentioning(lines: &[&str], needles: &[&str]) -> Option<String> {
    lines
        .iter()
        .find(|line| mentions_any(line, needles))
        .map(|line| line.to_string())
}

fn collect_mentioning(lines: &[&str], keep: impl Fn(&str) -> bool) -> Vec<String> {
    lines
        .iter()
        .filter(|line| keep(line))
        .map(|line| strip_list_number(line).to_string())
        .filter(|cleaned| !cleaned.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}

/// Distill research hits. Fields the text does not yield come from the
/// fallback template; hits with no text at all are `Malformed`.
pub fn parse_research(hits: &[SearchHit], idea: &Idea) -> Result<ResearchResult> {
    let lines: Vec<&str> = hits
        .iter()
        .flat_map(|hit| hit.content.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(PitchcraftError::malformed("research returned no content"));
    }

    let fallback = templates::fallback_research(idea);

    let market_size = first_mentioning(&lines, &["market size", "billion", "million"])
        .unwrap_or(fallback.market_size);

    let competitors = collect_mentioning(&lines, |line| {
        mentions_any(line, &["competitor", "company"]) || is_numbered(line)
    });
    let trends =
        collect_mentioning(&lines, |line| mentions_any(line, &["trend", "opportunity", "growth"]));

    let funding = first_mentioning(&lines, &["funding", "investment", "raised"])
        .unwrap_or(fallback.funding);

    let mut sources: Vec<String> = Vec::new();
    for hit in hits {
        let url = hit.url.trim();
        if !url.is_empty() && !sources.iter().any(|s| s == url) {
            sources.push(url.to_string());
        }
    }

    Ok(ResearchResult {
        market_size,
        competitors: if competitors.is_empty() {
            fallback.competitors
        } else {
            competitors
        },
        trends: if trends.is_empty() {
            fallback.trends
        } else {
            trends
        },
        funding,
        sources: if sources.is_empty() {
            fallback.sources
        } else {
            sources
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{Outcome, SilentObserver};
    use crate::testing::{MockResearch, Reply};

    fn idea() -> Idea {
        Idea::new("AI-powered pet sitting marketplace").unwrap()
    }

    fn hit(content: &str, url: &str) -> SearchHit {
        SearchHit {
            content: content.into(),
            url: url.into(),
        }
    }

    #[test]
    fn parse_extracts_each_field() {
        let text = "The pet care market size is $5.4 billion in 2024.\n\
                    1. Rover - largest competitor\n\
                    2. Wag! - on-demand walking company\n\
                    Key trend: premium services\n\
                    Growth driven by urban pet ownership\n\
                    Rover raised $155M in its last round.";
        let research = parse_research(
            &[hit(text, "https://a.example"), hit("", "https://a.example")],
            &idea(),
        )
        .unwrap();

        assert_eq!(research.market_size, "The pet care market size is $5.4 billion in 2024.");
        assert_eq!(
            research.competitors,
            ["Rover - largest competitor", "Wag! - on-demand walking company"]
        );
        assert_eq!(
            research.trends,
            ["Key trend: premium services", "Growth driven by urban pet ownership"]
        );
        assert_eq!(research.funding, "Rover raised $155M in its last round.");
        assert_eq!(research.sources, ["https://a.example"]);
    }

    #[test]
    fn every_cited_url_becomes_a_source() {
        let hits = [
            hit("Market size: $4 billion", "https://a.example"),
            hit("", "https://b.example"),
            hit("", "https://c.example"),
        ];
        let research = parse_research(&hits, &idea()).unwrap();
        assert_eq!(research.market_size, "Market size: $4 billion");
        assert_eq!(
            research.sources,
            ["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn missing_fields_come_from_fallback() {
        let research = parse_research(&[hit("Competitor: Rover", "")], &idea()).unwrap();
        let fallback = templates::fallback_research(&idea());
        assert_eq!(research.competitors, ["Competitor: Rover"]);
        assert_eq!(research.market_size, fallback.market_size);
        assert_eq!(research.trends, fallback.trends);
        assert_eq!(research.funding, fallback.funding);
        assert_eq!(research.sources, fallback.sources);
    }

    #[test]
    fn lists_are_capped_at_five() {
        let text = (1..=8)
            .map(|i| format!("{i}. Company {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let research = parse_research(&[hit(&text, "u")], &idea()).unwrap();
        assert_eq!(research.competitors.len(), 5);
        assert_eq!(research.competitors[0], "Company 1");
    }

    #[test]
    fn blank_hits_are_malformed() {
        let err = parse_research(&[hit("  \n ", "u")], &idea()).unwrap_err();
        assert!(matches!(err, PitchcraftError::Malformed { .. }));
        assert!(parse_research(&[], &idea()).is_err());
    }

    #[tokio::test]
    async fn adapter_falls_back_on_empty_hits() {
        let mock = MockResearch::new(Reply::Ok(vec![]));
        let adapter = ResearchAdapter::new(mock.clone(), Duration::from_secs(8), 5);
        let out = adapter.call(&idea(), &SilentObserver).await;
        assert_eq!(out.outcome, Outcome::Fallback);
        assert_eq!(out.value, templates::fallback_research(&idea()));
        assert_eq!(mock.calls(), 1);
        assert_eq!(
            mock.last_query().as_deref(),
            Some("AI-powered pet sitting marketplace market size, competitors, trends and funding")
        );
    }

    #[tokio::test]
    async fn fallback_is_idempotent() {
        let mock = MockResearch::new(Reply::Fail);
        let adapter = ResearchAdapter::new(mock.clone(), Duration::from_secs(8), 5);
        let first = adapter.call(&idea(), &SilentObserver).await;
        let second = adapter.call(&idea(), &SilentObserver).await;
        assert_eq!(first.outcome, Outcome::Error);
        assert_eq!(first.value, second.value);
        assert_eq!(mock.calls(), 2);
    }
}
