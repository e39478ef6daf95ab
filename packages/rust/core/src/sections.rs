//! Splitting free-form model output into per-slide sections.

use std::sync::LazyLock;

use regex::Regex;

use pitchcraft_shared::SlideTitle;

/// `1. `, `## 2) `, `**3. ` at the start of a line.
static NUMBERED_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*)?[ \t]*(\d{1,2})[.)][ \t]+")
        .expect("numbered heading regex")
});

const TITLE_ALTERNATION: &str = "executive summary|problem statement|solution|market opportunity|\
business model|competitive advantage|financial projections|team|funding request";

/// A line that is a canonical title, optionally numbered, bolded or followed
/// by a colon and inline content. Group 1 is the heading markup, group 2 the
/// title.
static TITLE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?im)^[ \t]*((?:#{{1,6}}[ \t]*)?(?:\d{{1,2}}[.)][ \t]*)?(?:\*\*)?)[ \t]*(?:our[ \t]+)?({TITLE_ALTERNATION})\b(?:[ \t]*\([^)\n]*\))?[ \t]*(?:\*\*)?[ \t]*(?::[ \t]*(?:\*\*)?[ \t]*|$)"
    ))
    .expect("title heading regex")
});

/// The text after a numbered heading marker names a canonical title, on its
/// own or followed by a colon, a spaced dash or the end of the line.
static NUMBERED_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:\*\*|__)?[ \t]*(?:our[ \t]+)?({TITLE_ALTERNATION})\b(?:[ \t]*\([^)\n]*\))?(?:\*\*|__)?[ \t]*(?::|-[ \t]|$)"
    ))
    .expect("numbered title regex")
});

/// Leading repetition of a canonical title at the very start of a section.
static TITLE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^[\s*#_]*(?:our\s+)?(?:{TITLE_ALTERNATION})\b(?:[ \t]*\([^)\n]*\))?[ \t]*(?:\*\*|__)?[ \t]*(?:[:\-][\s*_]*|\n\s*|$)"
    ))
    .expect("title prefix regex")
});

/// Look up a canonical title by name, ignoring case.
pub fn title_from_name(name: &str) -> Option<SlideTitle> {
    SlideTitle::ALL
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(name.trim()))
}

/// Rest of the line starting at `at`.
fn line_from(text: &str, at: usize) -> &str {
    text[at..].lines().next().unwrap_or("")
}

/// Split on numbered headings 1 to 9, in strictly increasing order.
///
/// When any heading names a canonical title, only titled headings count and
/// each fills the slot of the title it names, so a nested list inside a
/// section never becomes a slide. Otherwise the bare numbers decide.
pub fn numbered_sections(text: &str) -> Vec<(usize, String)> {
    let candidates: Vec<(usize, Option<SlideTitle>, usize, usize)> = NUMBERED_HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let n = caps.get(1)?.as_str().parse::<usize>().ok()?;
            let title = NUMBERED_TITLE_RE
                .captures(line_from(text, whole.end()))
                .and_then(|c| title_from_name(c.get(1)?.as_str()));
            Some((n, title, whole.start(), whole.end()))
        })
        .collect();

    let titled = candidates.iter().any(|(_, title, ..)| title.is_some());
    let mut headings: Vec<(usize, usize, usize)> = Vec::new();
    let mut last = 0;
    for (n, title, start, end) in candidates {
        let slot = match (titled, title) {
            (true, Some(title)) => title.index() + 1,
            (true, None) => continue,
            (false, _) => n,
        };
        if slot > last && slot <= SlideTitle::ALL.len() {
            headings.push((slot, start, end));
            last = slot;
        }
    }

    headings
        .iter()
        .enumerate()
        .map(|(i, &(n, _, body_start))| {
            let body_end = headings.get(i + 1).map_or(text.len(), |next| next.1);
            (n, text[body_start..body_end].trim().to_string())
        })
        .collect()
}

/// Remove a repeated title (and any trailing colon or bold markers) from the
/// start of a section.
pub fn strip_title_prefix(section: &str) -> &str {
    let trimmed = section.trim();
    match TITLE_PREFIX_RE.find(trimmed) {
        Some(m) => trimmed[m.end()..].trim(),
        None => trimmed,
    }
}

/// Split on canonical title headings. Later sections for the same title
/// replace earlier ones.
///
/// A heading is either marked (numbered, `#` or bold, or the title alone on
/// its line) or an inline label such as `Team: two founders`. An inline label
/// only opens a section for a title that has no marked heading, so a label
/// inside another section's prose does not split it.
pub fn titled_sections(text: &str) -> Vec<(SlideTitle, String)> {
    let candidates: Vec<(SlideTitle, bool, usize, usize)> = TITLE_HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = title_from_name(caps.get(2)?.as_str())?;
            let marked = !caps.get(1)?.as_str().trim().is_empty()
                || line_from(text, whole.end()).trim().is_empty();
            Some((title, marked, whole.start(), whole.end()))
        })
        .collect();

    let headings: Vec<(SlideTitle, usize, usize)> = candidates
        .iter()
        .filter(|&&(title, marked, ..)| {
            marked || !candidates.iter().any(|&(t, m, ..)| m && t == title)
        })
        .map(|&(title, _, start, end)| (title, start, end))
        .collect();

    let mut sections: Vec<(SlideTitle, String)> = Vec::new();
    for (i, &(title, _, body_start)) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map_or(text.len(), |next| next.1);
        let body = text[body_start..body_end].trim().to_string();
        sections.retain(|(t, _)| *t != title);
        sections.push((title, body));
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_sections_ignore_nested_lists() {
        let text = "1. Executive Summary\nWe win.\n2. Problem Statement\nPeople suffer:\n1. cost\n2. time\n3. Solution\nWe fix it.";
        let sections = numbered_sections(text);
        let numbers: Vec<usize> = sections.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, [1, 2, 3]);
        assert!(sections[1].1.contains("1. cost"));
        assert_eq!(sections[2].1, "Solution\nWe fix it.");
    }

    #[test]
    fn nested_list_running_past_the_slide_number_stays_in_its_slide() {
        let text = "1. Executive Summary\nPets need care.\n\
                    2. Problem Statement\nOwners face:\n1. cost\n2. trust\n3. availability\n\
                    3. Solution\nA vetted marketplace.\n\
                    4. Market Opportunity\n$5B.";
        let sections = numbered_sections(text);
        assert_eq!(
            sections,
            vec![
                (1, "Executive Summary\nPets need care.".to_string()),
                (
                    2,
                    "Problem Statement\nOwners face:\n1. cost\n2. trust\n3. availability".to_string()
                ),
                (3, "Solution\nA vetted marketplace.".to_string()),
                (4, "Market Opportunity\n$5B.".to_string()),
            ]
        );
    }

    #[test]
    fn titled_numbers_follow_the_title_they_name() {
        let text = "1. Executive Summary\nA\n2. Solution\nB\n3. Team-based pricing is rare\n4. Team\nC";
        let numbers: Vec<usize> = numbered_sections(text).iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, [1, 3, 8]);
    }

    #[test]
    fn bare_numbers_split_when_no_heading_names_a_title() {
        let text = "1. We win.\n2. People suffer.\n3) We fix it.";
        let sections = numbered_sections(text);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[2], (3, "We fix it.".to_string()));
    }

    #[test]
    fn numbered_sections_accept_markdown_headings() {
        let text = "Intro text\n## 1) Executive Summary\nA\n**2. Problem Statement**\nB";
        let sections = numbered_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], (1, "Executive Summary\nA".to_string()));
    }

    #[test]
    fn strip_title_prefix_variants() {
        assert_eq!(strip_title_prefix("Executive Summary: We win."), "We win.");
        assert_eq!(
            strip_title_prefix("**Executive Summary (2-3 sentences)**\nWe win."),
            "We win."
        );
        assert_eq!(strip_title_prefix("Our Solution - a robot."), "a robot.");
        assert_eq!(strip_title_prefix("Teams of sitters"), "Teams of sitters");
        assert_eq!(strip_title_prefix("Team members bring 20 years"), "Team members bring 20 years");
        assert_eq!(strip_title_prefix("Executive Summary"), "");
        assert_eq!(strip_title_prefix("We win."), "We win.");
    }

    #[test]
    fn titled_sections_match_case_insensitively() {
        let text = "EXECUTIVE SUMMARY: Bold vision.\n\n**team**\nTwo founders.\n\nSolution providers are many.\nfunding request:\n$1M seed.";
        let sections = titled_sections(text);
        assert_eq!(
            sections,
            vec![
                (SlideTitle::ExecutiveSummary, "Bold vision.".to_string()),
                (
                    SlideTitle::Team,
                    "Two founders.\n\nSolution providers are many.".to_string()
                ),
                (SlideTitle::FundingRequest, "$1M seed.".to_string()),
            ]
        );
    }

    #[test]
    fn inline_label_does_not_split_a_marked_section() {
        let text = "**Competitive Advantage**\nNetwork effects.\nTeam: ex-Rover founders run ops.\n\n\
                    **Team**\nTwo founders.";
        let sections = titled_sections(text);
        assert_eq!(
            sections,
            vec![
                (
                    SlideTitle::CompetitiveAdvantage,
                    "Network effects.\nTeam: ex-Rover founders run ops.".to_string()
                ),
                (SlideTitle::Team, "Two founders.".to_string()),
            ]
        );
    }

    #[test]
    fn title_lookup() {
        assert_eq!(title_from_name(" market OPPORTUNITY "), Some(SlideTitle::MarketOpportunity));
        assert_eq!(title_from_name("Roadmap"), None);
    }
}
