//! Vendor adapters for PitchCraft's pipeline capabilities.
//!
//! Each module wraps one HTTP API behind a capability trait from
//! `pitchcraft-shared`. [`build_capabilities`] turns an [`AppConfig`] into the
//! concrete set a pipeline is constructed with; the pipeline itself never
//! branches on vendor.

mod chat;
mod http;

pub mod firecrawl;
pub mod gemini;
pub mod lingo;
pub mod openai;
pub mod perplexity;
pub mod unconfigured;

use std::sync::Arc;

use tracing::{info, warn};

use pitchcraft_shared::{
    AppConfig, Capabilities, EnhancementCapability, LocalizationCapability, PitchcraftError,
    ProviderConfig, ProviderKind, ResearchCapability, Result, TextGeneration, api_key_from_env,
};

pub use firecrawl::FirecrawlResearch;
pub use gemini::GeminiClient;
pub use lingo::LingoTranslator;
pub use openai::OpenAiClient;
pub use perplexity::PerplexityResearch;
pub use unconfigured::Unconfigured;

// ---------------------------------------------------------------------------
// Capability slots
// ---------------------------------------------------------------------------

/// The four configurable capability slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Research,
    Generation,
    Enhancement,
    Localization,
}

impl Slot {
    pub const ALL: [Slot; 4] = [
        Self::Research,
        Self::Generation,
        Self::Enhancement,
        Self::Localization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Generation => "generation",
            Self::Enhancement => "enhancement",
            Self::Localization => "localization",
        }
    }

    /// Whether `kind` can back this slot. `none` fits every slot.
    pub fn supports(&self, kind: ProviderKind) -> bool {
        if kind == ProviderKind::None {
            return true;
        }
        match self {
            Self::Research => matches!(kind, ProviderKind::Perplexity | ProviderKind::Firecrawl),
            Self::Generation | Self::Enhancement => {
                matches!(kind, ProviderKind::OpenAi | ProviderKind::Gemini)
            }
            Self::Localization => kind == ProviderKind::Lingo,
        }
    }

    fn provider<'a>(&self, config: &'a AppConfig) -> &'a ProviderConfig {
        match self {
            Self::Research => &config.research,
            Self::Generation => &config.generation,
            Self::Enhancement => &config.enhancement,
            Self::Localization => &config.localization,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Env var a vendor reads its key from when `api_key_env` is not set.
pub fn default_key_env(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::Perplexity => Some(perplexity::DEFAULT_KEY_ENV),
        ProviderKind::Firecrawl => Some(firecrawl::DEFAULT_KEY_ENV),
        ProviderKind::OpenAi => Some(openai::DEFAULT_KEY_ENV),
        ProviderKind::Gemini => Some(gemini::DEFAULT_KEY_ENV),
        ProviderKind::Lingo => Some(lingo::DEFAULT_KEY_ENV),
        ProviderKind::None => None,
    }
}

fn key_env(cfg: &ProviderConfig) -> Option<String> {
    cfg.api_key_env
        .clone()
        .or_else(|| default_key_env(cfg.provider).map(str::to_string))
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// A resolved vendor: either a key to construct it with, or the adapter
/// that stands in for it.
enum Resolved {
    Key(String),
    Missing(Unconfigured),
}

fn resolve(slot: Slot, cfg: &ProviderConfig) -> Result<Resolved> {
    if !slot.supports(cfg.provider) {
        return Err(PitchcraftError::config(format!(
            "provider {:?} cannot serve the {slot} capability",
            cfg.provider.as_str()
        )));
    }

    let Some(env) = key_env(cfg) else {
        return Ok(Resolved::Missing(Unconfigured::disabled(slot.as_str())));
    };

    match api_key_from_env(&env) {
        Some(key) => Ok(Resolved::Key(key)),
        None => {
            warn!(
                capability = %slot,
                provider = %cfg.provider,
                key_env = %env,
                "API key not set; stage will use fallback content"
            );
            Ok(Resolved::Missing(Unconfigured::missing_key(
                cfg.provider.as_str(),
                &env,
            )))
        }
    }
}

fn research(cfg: &ProviderConfig) -> Result<Arc<dyn ResearchCapability>> {
    let key = match resolve(Slot::Research, cfg)? {
        Resolved::Key(key) => key,
        Resolved::Missing(stand_in) => return Ok(Arc::new(stand_in)),
    };
    let base = cfg.base_url.as_deref();
    Ok(match cfg.provider {
        ProviderKind::Firecrawl => Arc::new(FirecrawlResearch::new(key, base)?),
        _ => Arc::new(PerplexityResearch::new(key, base, cfg.model.as_deref())?),
    })
}

fn generation(cfg: &ProviderConfig) -> Result<Arc<dyn TextGeneration>> {
    let key = match resolve(Slot::Generation, cfg)? {
        Resolved::Key(key) => key,
        Resolved::Missing(stand_in) => return Ok(Arc::new(stand_in)),
    };
    let (base, model) = (cfg.base_url.as_deref(), cfg.model.as_deref());
    Ok(match cfg.provider {
        ProviderKind::Gemini => Arc::new(GeminiClient::new(key, base, model)?),
        _ => Arc::new(OpenAiClient::new(key, base, model)?),
    })
}

fn enhancement(cfg: &ProviderConfig) -> Result<Arc<dyn EnhancementCapability>> {
    let key = match resolve(Slot::Enhancement, cfg)? {
        Resolved::Key(key) => key,
        Resolved::Missing(stand_in) => return Ok(Arc::new(stand_in)),
    };
    let (base, model) = (cfg.base_url.as_deref(), cfg.model.as_deref());
    Ok(match cfg.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(key, base, model)?),
        _ => Arc::new(GeminiClient::new(key, base, model)?),
    })
}

fn localization(cfg: &ProviderConfig) -> Result<Option<Arc<dyn LocalizationCapability>>> {
    if cfg.provider == ProviderKind::None {
        return Ok(None);
    }
    let key = match resolve(Slot::Localization, cfg)? {
        Resolved::Key(key) => key,
        Resolved::Missing(stand_in) => return Ok(Some(Arc::new(stand_in))),
    };
    Ok(Some(Arc::new(LingoTranslator::new(
        key,
        cfg.base_url.as_deref(),
    )?)))
}

/// Construct every capability from configuration.
///
/// Missing API keys never fail construction: the affected slot gets an
/// [`Unconfigured`] adapter and its stage degrades to fallback. A provider
/// that cannot serve its slot, or an invalid base URL, is a config error.
pub fn build_capabilities(config: &AppConfig) -> Result<Capabilities> {
    let capabilities = Capabilities {
        research: research(&config.research)?,
        generation: generation(&config.generation)?,
        enhancement: enhancement(&config.enhancement)?,
        localization: localization(&config.localization)?,
    };
    info!(?capabilities, "capabilities constructed");
    Ok(capabilities)
}

// ---------------------------------------------------------------------------
// Doctor report
// ---------------------------------------------------------------------------

/// Offline status of one capability slot.
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub slot: Slot,
    pub provider: ProviderKind,
    /// Env var the key is read from, if the provider needs one.
    pub key_env: Option<String>,
    pub key_present: bool,
    pub supported: bool,
}

impl ProviderStatus {
    /// Whether the slot will make live calls.
    pub fn is_live(&self) -> bool {
        self.supported && self.provider != ProviderKind::None && self.key_present
    }
}

/// Describe each slot's provider and key availability without any network I/O.
pub fn provider_report(config: &AppConfig) -> Vec<ProviderStatus> {
    Slot::ALL
        .iter()
        .map(|&slot| {
            let cfg = slot.provider(config);
            let key_env = key_env(cfg);
            let key_present = key_env
                .as_deref()
                .is_some_and(|env| api_key_from_env(env).is_some());
            ProviderStatus {
                slot,
                provider: cfg.provider,
                key_env,
                key_present,
                supported: slot.supports(cfg.provider),
            }
        })
        .collect()
}
