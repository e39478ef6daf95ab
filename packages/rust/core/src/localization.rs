//! Optional localization stage.
//!
//! Slide contents and the executive summary are translated concurrently under
//! a single budget. Titles stay canonical. Any failure leaves the whole deck
//! untranslated rather than mixing languages.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::instrument;

use pitchcraft_shared::{LocalizationCapability, PitchcraftError, Result, SlideDeck};

use crate::fallback::{Guarded, Stage, StageObserver, guarded};

/// `en` and regional variants (`en-GB`, `en_us`) need no translation.
pub fn is_english(language: &str) -> bool {
    let lang = language.trim().to_ascii_lowercase();
    lang == "en" || lang.starts_with("en-") || lang.starts_with("en_")
}

/// Translated deck plus executive summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Localized {
    pub slides: SlideDeck,
    pub executive_summary: String,
}

pub struct LocalizationAdapter {
    capability: Arc<dyn LocalizationCapability>,
    budget: Duration,
}

impl LocalizationAdapter {
    pub fn new(capability: Arc<dyn LocalizationCapability>, budget: Duration) -> Self {
        Self { capability, budget }
    }

    #[instrument(
        skip_all,
        fields(stage = "localization", provider = %self.capability.name(), target_language = %language)
    )]
    pub async fn localize(
        &self,
        language: &str,
        slides: &SlideDeck,
        executive_summary: &str,
        observer: &dyn StageObserver,
    ) -> Guarded<Localized> {
        guarded(
            Stage::Localization,
            self.budget,
            self.translate_all(language, slides, executive_summary),
            || Localized {
                slides: slides.clone(),
                executive_summary: executive_summary.to_string(),
            },
            observer,
        )
        .await
    }

    async fn translate_all(
        &self,
        language: &str,
        slides: &SlideDeck,
        executive_summary: &str,
    ) -> Result<Localized> {
        let texts: Vec<&str> = std::iter::once(executive_summary)
            .chain(slides.iter().map(|s| s.content.as_str()))
            .collect();

        let translated = try_join_all(texts.iter().map(|text| async move {
            let out = self.capability.translate(text, language).await?;
            let out = out.trim();
            if out.is_empty() && !text.trim().is_empty() {
                return Err(PitchcraftError::malformed("translation came back empty"));
            }
            Ok::<String, PitchcraftError>(out.to_string())
        }))
        .await?;

        let mut translated = translated.into_iter();
        let executive_summary = translated
            .next()
            .ok_or_else(|| PitchcraftError::malformed("translation lost the summary"))?;
        let rest: Vec<String> = translated.collect();

        Ok(Localized {
            slides: slides.map_contents(|slide| {
                rest.get(slide.title.index())
                    .cloned()
                    .unwrap_or_else(|| slide.content.clone())
            }),
            executive_summary,
        })
    }
}
