//! Deterministic fallback content.
//!
//! Everything here is a pure function of the idea text, so identical input
//! always yields byte-identical output.

use std::sync::LazyLock;

use regex::Regex;

use pitchcraft_shared::{Idea, QualityAssessment, ResearchResult, SlideDeck, SlideTitle};

// ---------------------------------------------------------------------------
// Sector classification
// ---------------------------------------------------------------------------

/// Coarse market sector, used to pick fallback competitors and trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sector {
    AiMl,
    HealthTech,
    FinTech,
    Saas,
    Technology,
}

static AI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ai|a\.i\.|artificial intelligence|machine learning|ml|deep learning|llms?|gpt|automation|agents?|chatbots?)\b",
    )
    .expect("AI regex")
});

static HEALTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:health|healthcare|medical|medicine|patients?|clinics?|hospitals?|telemedicine|telehealth|wellness|fitness|therapy|pharma)\b",
    )
    .expect("health regex")
});

static FINANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:fintech|finance|financial|payments?|banking|banks?|lending|loans?|insurance|insurtech|investing|crypto|wallets?|accounting)\b",
    )
    .expect("finance regex")
});

static SAAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:saas|software|platform|apps?|tools?|dashboard|api|crm|workflow)\b")
        .expect("saas regex")
});

/// Classify an idea by whole-word keyword match. First match wins.
pub fn classify(idea: &str) -> Sector {
    if AI_RE.is_match(idea) {
        Sector::AiMl
    } else if HEALTH_RE.is_match(idea) {
        Sector::HealthTech
    } else if FINANCE_RE.is_match(idea) {
        Sector::FinTech
    } else if SAAS_RE.is_match(idea) {
        Sector::Saas
    } else {
        Sector::Technology
    }
}

impl Sector {
    pub fn competitors(&self) -> [&'static str; 5] {
        match self {
            Self::AiMl => [
                "Big Tech AI platforms (Google, Microsoft, OpenAI)",
                "Specialized AI startups with vertical focus",
                "Traditional software companies adding AI features",
                "Open-source model ecosystems",
                "In-house data science teams at large enterprises",
            ],
            Self::HealthTech => [
                "Established healthcare IT vendors",
                "Telehealth and digital care platforms",
                "Hospital and clinic in-house systems",
                "Consumer wellness and fitness apps",
                "Venture-backed digital health startups",
            ],
            Self::FinTech => [
                "Incumbent banks and financial institutions",
                "Established payment processors",
                "Venture-backed neobanks and fintech startups",
                "Big Tech financial services offerings",
                "Specialized compliance and risk vendors",
            ],
            Self::Saas => [
                "Established SaaS giants with broad suites",
                "Niche vertical SaaS solutions",
                "Open-source alternatives",
                "No-code and low-code platforms",
                "Custom in-house tooling",
            ],
            Self::Technology => [
                "Established market incumbents with legacy solutions",
                "Emerging technology startups with innovative approaches",
                "Large enterprise software providers",
                "Specialized niche players with domain expertise",
                "International companies expanding globally",
            ],
        }
    }

    pub fn trends(&self) -> [&'static str; 5] {
        match self {
            Self::AiMl => [
                "Rapid enterprise adoption of generative AI",
                "Edge AI deployment for latency and privacy",
                "AI democratization through APIs and open models",
                "Growing regulatory focus on responsible AI",
                "Vertical-specific AI solutions outperforming general tools",
            ],
            Self::HealthTech => [
                "Shift toward remote and virtual care delivery",
                "Consumer demand for personalized health insights",
                "Interoperability mandates across health data systems",
                "Value-based care driving outcome measurement",
                "AI-assisted diagnostics and triage",
            ],
            Self::FinTech => [
                "Embedded finance inside non-financial products",
                "Real-time payments becoming the default",
                "Open banking APIs expanding data access",
                "Rising compliance automation spend",
                "Digital-first banking adoption among younger users",
            ],
            Self::Saas => [
                "No-code and low-code adoption",
                "API-first and composable architectures",
                "Embedded analytics inside workflows",
                "Usage-based pricing models",
                "Consolidation of fragmented tool stacks",
            ],
            Self::Technology => [
                "Accelerated digital transformation across industries",
                "Increased focus on automation and efficiency",
                "Growing demand for user-friendly solutions",
                "Emphasis on sustainable and cost-effective alternatives",
                "Integration of AI and machine learning capabilities",
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

pub const FALLBACK_SOURCES: [&str; 4] = [
    "Market Intelligence",
    "Industry Reports",
    "Competitive Analysis",
    "Investment Tracking",
];

pub fn fallback_market_size(idea: &Idea) -> String {
    format!(
        "The {idea} market represents a multi-billion dollar opportunity with strong growth \
         projections driven by digital transformation and increasing demand for innovative \
         solutions."
    )
}

pub fn fallback_funding() -> String {
    "Active investment environment with significant venture capital interest, growing number \
     of funding rounds, and increasing valuations in the sector."
        .to_string()
}

pub fn fallback_research(idea: &Idea) -> ResearchResult {
    let sector = classify(idea.as_str());
    ResearchResult {
        market_size: fallback_market_size(idea),
        competitors: sector.competitors().map(String::from).to_vec(),
        trends: sector.trends().map(String::from).to_vec(),
        funding: fallback_funding(),
        sources: FALLBACK_SOURCES.map(String::from).to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Slides
// ---------------------------------------------------------------------------

pub fn fallback_slide(title: SlideTitle, idea: &Idea) -> String {
    match title {
        SlideTitle::ExecutiveSummary => format!(
            "{idea} represents a significant market opportunity with our innovative approach to \
             solving key industry challenges. Our solution addresses critical pain points while \
             providing scalable value to customers and sustainable competitive advantages."
        ),
        SlideTitle::ProblemStatement => format!(
            "Current solutions in the {idea} space suffer from inefficiencies, high costs, and \
             poor user experience. Customers struggle with outdated processes, lack of \
             integration, and limited scalability that prevent them from achieving their goals \
             effectively."
        ),
        SlideTitle::Solution => format!(
            "Our {idea} platform provides a comprehensive, user-friendly solution that \
             streamlines processes, reduces costs, and improves outcomes through innovative \
             technology, superior user experience, and seamless integration capabilities."
        ),
        SlideTitle::MarketOpportunity => "The addressable market represents a multi-billion \
             dollar opportunity with strong growth projections. Market trends indicate \
             increasing demand for innovative solutions, digital transformation, and improved \
             efficiency across industries."
            .to_string(),
        SlideTitle::BusinessModel => "We employ a scalable SaaS model with multiple revenue \
             streams including subscriptions, transaction fees, and premium services. Strong \
             unit economics with clear path to profitability and sustainable growth."
            .to_string(),
        SlideTitle::CompetitiveAdvantage => "Our proprietary technology, experienced team, and \
             first-mover advantage in key market segments create sustainable competitive moats. \
             Strong intellectual property, brand recognition, and strategic partnerships."
            .to_string(),
        SlideTitle::FinancialProjections => "Projecting 200% year-over-year growth with \
             positive cash flow by year 3. Strong unit economics with 80%+ gross margins, \
             efficient customer acquisition costs, and expanding market opportunities."
            .to_string(),
        SlideTitle::Team => "Led by experienced entrepreneurs with proven track records in \
             technology, business development, and market execution. Advisory board includes \
             industry experts, successful founders, and strategic partners."
            .to_string(),
        SlideTitle::FundingRequest => "Seeking $2M Series A funding to accelerate product \
             development, expand market reach, and scale operations. Funds will be used for \
             team growth, marketing, technology infrastructure, and market expansion."
            .to_string(),
    }
}

pub fn fallback_deck(idea: &Idea) -> SlideDeck {
    SlideDeck::build(|title| fallback_slide(title, idea))
}

// ---------------------------------------------------------------------------
// Enhancement / summary / validation
// ---------------------------------------------------------------------------

/// Slides shorter than this (in characters) get the enhancement suffix.
pub const SHORT_SLIDE_CHARS: usize = 100;

pub fn enhancement_suffix(idea: &Idea) -> String {
    format!(
        " Our {idea} solution leverages cutting-edge technology and proven business strategies \
         to deliver exceptional value to customers and stakeholders."
    )
}

/// Pad short slides with the enhancement suffix; longer slides pass through.
pub fn fallback_enhancement(deck: &SlideDeck, idea: &Idea) -> SlideDeck {
    deck.map_contents(|slide| {
        if slide.content.chars().count() < SHORT_SLIDE_CHARS {
            format!("{}{}", slide.content, enhancement_suffix(idea))
        } else {
            slide.content.clone()
        }
    })
}

pub fn fallback_summary(idea: &Idea) -> String {
    format!(
        "{idea} represents a compelling investment opportunity with strong market potential \
         and innovative solutions."
    )
}

pub const FALLBACK_SCORE: f32 = 7.5;

pub fn fallback_assessment() -> QualityAssessment {
    QualityAssessment::new(
        FALLBACK_SCORE,
        "The pitch deck demonstrates good foundational elements with clear structure and \
         compelling value proposition. Consider adding more specific metrics and market data.",
        [
            "Include more specific market size numbers and growth projections",
            "Add customer testimonials or early traction metrics",
            "Strengthen the competitive differentiation section",
            "Provide more detailed financial projections and assumptions",
        ]
        .map(String::from)
        .to_vec(),
    )
}

/// Suggestions used when a scored review names none of its own.
pub fn default_suggestions() -> Vec<String> {
    [
        "Consider adding more specific metrics and data points",
        "Include customer testimonials or case studies if available",
        "Strengthen the competitive analysis section",
        "Add more detailed financial projections",
    ]
    .map(String::from)
    .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea(s: &str) -> Idea {
        Idea::new(s).unwrap()
    }

    #[test]
    fn classify_matches_whole_words() {
        assert_eq!(classify("AI-powered pet sitting marketplace"), Sector::AiMl);
        assert_eq!(classify("telehealth for rural clinics"), Sector::HealthTech);
        assert_eq!(classify("cross-border payments for freelancers"), Sector::FinTech);
        assert_eq!(classify("CRM software for plumbers"), Sector::Saas);
        // "said" and "domain" contain "ai" but not as a whole word
        assert_eq!(classify("domain names said simply"), Sector::Technology);
        assert_eq!(classify("artisanal bakery delivery"), Sector::Technology);
    }

    #[test]
    fn fallback_research_interpolates_idea() {
        let research = fallback_research(&idea("AI-powered pet sitting marketplace"));
        assert!(research.market_size.starts_with(
            "The AI-powered pet sitting marketplace market represents a multi-billion dollar"
        ));
        assert_eq!(research.competitors.len(), 5);
        assert_eq!(research.trends.len(), 5);
        assert_eq!(research.competitors[0], Sector::AiMl.competitors()[0]);
        assert_eq!(research.sources, FALLBACK_SOURCES);
    }

    #[test]
    fn fallback_text_is_deterministic() {
        let a = idea("drone delivery");
        assert_eq!(fallback_deck(&a), fallback_deck(&a));
        assert_eq!(fallback_research(&a), fallback_research(&a));
        assert_eq!(fallback_summary(&a), fallback_summary(&a));
    }

    #[test]
    fn fallback_deck_covers_every_title() {
        let deck = fallback_deck(&idea("drone delivery"));
        assert!(
            deck.get(SlideTitle::ExecutiveSummary)
                .content
                .starts_with("drone delivery represents a significant market opportunity")
        );
        assert!(deck.get(SlideTitle::FundingRequest).content.starts_with("Seeking $2M Series A"));
        assert!(deck.iter().all(|s| !s.content.contains("  ")));
    }

    #[test]
    fn fallback_enhancement_pads_only_short_slides() {
        let i = idea("drone delivery");
        let long = "x".repeat(SHORT_SLIDE_CHARS);
        let deck = SlideDeck::build(|t| {
            if t == SlideTitle::Team {
                "Short.".into()
            } else {
                long.clone()
            }
        });
        let enhanced = fallback_enhancement(&deck, &i);
        assert_eq!(
            enhanced.get(SlideTitle::Team).content,
            format!("Short.{}", enhancement_suffix(&i))
        );
        assert_eq!(enhanced.get(SlideTitle::Solution).content, long);
    }

    #[test]
    fn fallback_assessment_is_fixed() {
        let a = fallback_assessment();
        assert_eq!(a.score, 7.5);
        assert_eq!(a.suggestions.len(), 4);
        assert!(a.feedback.starts_with("The pitch deck demonstrates"));
    }
}
