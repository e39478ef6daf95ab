//! Core domain types for PitchCraft pitch decks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PitchcraftError, Result};

// ---------------------------------------------------------------------------
// PitchId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for pitch artifact identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitchId(pub Uuid);

impl PitchId {
    /// Generate a new time-sortable pitch identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for PitchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PitchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PitchId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Idea
// ---------------------------------------------------------------------------

/// A startup idea as submitted by the user. Never empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Idea(String);

impl Idea {
    /// Trim and validate raw idea text.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PitchcraftError::invalid_input(
                "idea is required and must not be blank",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Idea {
    type Error = PitchcraftError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Idea> for String {
    fn from(idea: Idea) -> Self {
        idea.0
    }
}

impl std::fmt::Display for Idea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Slides
// ---------------------------------------------------------------------------

/// The nine canonical pitch sections, in deck order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlideTitle {
    #[serde(rename = "Executive Summary")]
    ExecutiveSummary,
    #[serde(rename = "Problem Statement")]
    ProblemStatement,
    #[serde(rename = "Solution")]
    Solution,
    #[serde(rename = "Market Opportunity")]
    MarketOpportunity,
    #[serde(rename = "Business Model")]
    BusinessModel,
    #[serde(rename = "Competitive Advantage")]
    CompetitiveAdvantage,
    #[serde(rename = "Financial Projections")]
    FinancialProjections,
    #[serde(rename = "Team")]
    Team,
    #[serde(rename = "Funding Request")]
    FundingRequest,
}

impl SlideTitle {
    /// All titles in canonical deck order.
    pub const ALL: [SlideTitle; 9] = [
        Self::ExecutiveSummary,
        Self::ProblemStatement,
        Self::Solution,
        Self::MarketOpportunity,
        Self::BusinessModel,
        Self::CompetitiveAdvantage,
        Self::FinancialProjections,
        Self::Team,
        Self::FundingRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "Executive Summary",
            Self::ProblemStatement => "Problem Statement",
            Self::Solution => "Solution",
            Self::MarketOpportunity => "Market Opportunity",
            Self::BusinessModel => "Business Model",
            Self::CompetitiveAdvantage => "Competitive Advantage",
            Self::FinancialProjections => "Financial Projections",
            Self::Team => "Team",
            Self::FundingRequest => "Funding Request",
        }
    }

    /// Zero-based position in the deck.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for SlideTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: SlideTitle,
    pub content: String,
}

/// Exactly nine slides in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Slide>", into = "Vec<Slide>")]
pub struct SlideDeck([Slide; 9]);

impl SlideDeck {
    /// Build a deck by producing the content for each canonical title in order.
    pub fn build(mut content_for: impl FnMut(SlideTitle) -> String) -> Self {
        Self(SlideTitle::ALL.map(|title| Slide {
            title,
            content: content_for(title),
        }))
    }

    /// Produce a new deck whose contents are derived from this one.
    pub fn map_contents(&self, mut f: impl FnMut(&Slide) -> String) -> Self {
        Self::build(|title| f(&self.0[title.index()]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.0.iter()
    }

    pub fn get(&self, title: SlideTitle) -> &Slide {
        &self.0[title.index()]
    }

    /// `Title: content` lines joined by blank lines (prompt/analysis input).
    pub fn to_outline(&self) -> String {
        self.0
            .iter()
            .map(|s| format!("{}: {}", s.title, s.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl TryFrom<Vec<Slide>> for SlideDeck {
    type Error = PitchcraftError;

    fn try_from(slides: Vec<Slide>) -> Result<Self> {
        let titles: Vec<SlideTitle> = slides.iter().map(|s| s.title).collect();
        if titles != SlideTitle::ALL {
            return Err(PitchcraftError::parse(format!(
                "slide deck must contain the nine canonical slides in order, got {titles:?}"
            )));
        }
        let slides: [Slide; 9] = slides
            .try_into()
            .map_err(|_| PitchcraftError::parse("slide deck must contain exactly nine slides"))?;
        Ok(Self(slides))
    }
}

impl From<SlideDeck> for Vec<Slide> {
    fn from(deck: SlideDeck) -> Self {
        deck.0.into()
    }
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// One item returned by a research capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub content: String,
    pub url: String,
}

/// Market research attached to every pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub market_size: String,
    pub competitors: Vec<String>,
    pub trends: Vec<String>,
    pub funding: String,
    pub sources: Vec<String>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Upper bound of every 0..10 score.
pub const MAX_SCORE: f32 = 10.0;

/// Clamp a score into `[0, 10]`; NaN becomes 0.
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

/// Quality scoring of the final deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Always within `[0, 10]`.
    pub score: f32,
    pub feedback: String,
    pub suggestions: Vec<String>,
}

impl QualityAssessment {
    pub fn new(score: f32, feedback: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            score: clamp_score(score),
            feedback: feedback.into(),
            suggestions,
        }
    }
}

/// Locally computed language metrics for the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageAnalysis {
    pub word_count: usize,
    pub sentence_count: usize,
    pub readability: f32,
    pub engagement: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub quality: QualityAssessment,
    pub language: LanguageAnalysis,
    pub processing_time_ms: u64,
}

// ---------------------------------------------------------------------------
// PitchArtifact
// ---------------------------------------------------------------------------

/// The assembled deck returned by one pipeline run. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchArtifact {
    pub id: PitchId,
    pub idea: Idea,
    pub language: String,
    pub executive_summary: String,
    pub slides: SlideDeck,
    pub research: ResearchResult,
    pub analysis: Analysis,
    pub generated_at: DateTime<Utc>,
}

/// Listing row for stored pitches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchSummary {
    pub id: PitchId,
    pub idea: String,
    pub language: String,
    pub quality_score: f32,
    pub generated_at: DateTime<Utc>,
}
