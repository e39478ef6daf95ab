//! Local language analysis of the finished deck. No external calls.

use pitchcraft_shared::{LanguageAnalysis, MAX_SCORE, SlideDeck};

const PRONOUNS: [&str; 8] = ["we", "our", "us", "you", "your", "i", "my", "ours"];

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
}

fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
}

/// Vowel groups, minus a silent trailing `e`, at least one per word.
fn syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;
    for c in lower.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

fn round1(x: f32) -> f32 {
    (x * 10.0).round() / 10.0
}

/// Flesch reading ease rescaled from 0..100 to 0..10.
fn readability(word_count: usize, sentences: usize, syllable_count: usize) -> f32 {
    let words = word_count as f32;
    let ease = 206.835
        - 1.015 * (words / sentences.max(1) as f32)
        - 84.6 * (syllable_count as f32 / words);
    round1((ease / 10.0).clamp(0.0, MAX_SCORE))
}

/// Concrete numbers, direct address and punctuation energy, per 100 words.
fn engagement(text: &str, word_list: &[&str]) -> f32 {
    let per_hundred = 100.0 / word_list.len() as f32;
    let numbers = word_list
        .iter()
        .filter(|w| w.chars().any(|c| c.is_ascii_digit()))
        .count() as f32;
    let pronouns = word_list
        .iter()
        .filter(|w| PRONOUNS.contains(&w.to_lowercase().as_str()))
        .count() as f32;
    let marks = text.chars().filter(|c| matches!(c, '!' | '?')).count() as f32;

    let score = 3.0
        + (numbers * per_hundred * 0.5).min(3.0)
        + (pronouns * per_hundred * 0.4).min(3.0)
        + (marks * per_hundred).min(1.0);
    round1(score.clamp(0.0, MAX_SCORE))
}

/// Analyze the executive summary and every slide body together.
pub fn analyze(slides: &SlideDeck, executive_summary: &str) -> LanguageAnalysis {
    let text = std::iter::once(executive_summary)
        .chain(slides.iter().map(|s| s.content.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    let word_list: Vec<&str> = words(&text).collect();
    if word_list.is_empty() {
        return LanguageAnalysis {
            word_count: 0,
            sentence_count: 0,
            readability: 0.0,
            engagement: 0.0,
        };
    }

    let sentences = sentence_count(&text);
    let syllable_count: usize = word_list.iter().map(|w| syllables(w)).sum();

    LanguageAnalysis {
        word_count: word_list.len(),
        sentence_count: sentences,
        readability: readability(word_list.len(), sentences, syllable_count),
        engagement: engagement(&text, &word_list),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_deck_scores_zero() {
        let deck = SlideDeck::build(|_| String::new());
        let a = analyze(&deck, "  ");
        assert_eq!(a.word_count, 0);
        assert_eq!(a.sentence_count, 0);
        assert_eq!(a.readability, 0.0);
        assert_eq!(a.engagement, 0.0);
    }

    #[test]
    fn counts_words_and_sentences() {
        let deck = SlideDeck::build(|_| "We grow fast.".into());
        let a = analyze(&deck, "Pets win! Really?");
        assert_eq!(a.word_count, 3 * 9 + 3);
        assert_eq!(a.sentence_count, 9 + 2);
    }

    #[test]
    fn syllable_heuristic() {
        assert_eq!(syllables("cat"), 1);
        assert_eq!(syllables("marketplace"), 3);
        assert_eq!(syllables("table"), 2);
        assert_eq!(syllables("rhythm"), 1);
        assert_eq!(syllables("42"), 1);
    }

    #[test]
    fn scores_stay_in_range_and_are_deterministic() {
        let deck = SlideDeck::build(|t| format!("Our {t} delivers 200% growth for you!"));
        let a = analyze(&deck, "We raise $2M.");
        let b = analyze(&deck, "We raise $2M.");
        assert_eq!(a, b);
        assert!((0.0..=10.0).contains(&a.readability));
        assert!((0.0..=10.0).contains(&a.engagement));
        assert!(a.engagement > 3.0);
    }

    #[test]
    fn simple_text_reads_easier_than_jargon() {
        let plain = SlideDeck::build(|_| "We help dogs. We walk them. They love it.".into());
        let dense = SlideDeck::build(|_| {
            "Comprehensive interoperability facilitates organizational digitalization \
             opportunities throughout heterogeneous infrastructures."
                .into()
        });
        assert!(analyze(&plain, "").readability > analyze(&dense, "").readability);
    }
}
