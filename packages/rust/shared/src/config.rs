//! Application configuration for PitchCraft.
//!
//! User config lives at `~/.pitchcraft/pitchcraft.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored here, only the names of the env vars holding them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PitchcraftError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pitchcraft.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pitchcraft";

// ---------------------------------------------------------------------------
// Config structs (matching pitchcraft.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Research capability vendor.
    #[serde(default = "default_research")]
    pub research: ProviderConfig,

    /// Slide generation vendor.
    #[serde(default = "default_generation")]
    pub generation: ProviderConfig,

    /// Enhancement / summary / validation vendor.
    #[serde(default = "default_enhancement")]
    pub enhancement: ProviderConfig,

    /// Optional translation vendor.
    #[serde(default = "default_localization")]
    pub localization: ProviderConfig,

    /// Stage budgets and generation tuning.
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            research: default_research(),
            generation: default_generation(),
            enhancement: default_enhancement(),
            localization: default_localization(),
            pipeline: PipelineSettings::default(),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Target language for generated decks.
    #[serde(default = "default_language")]
    pub language: String,

    /// Path of the local pitch database. `~/` is expanded.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Owner recorded on saved pitches when none is given.
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            database_path: default_database_path(),
            owner_id: default_owner_id(),
        }
    }
}

fn default_language() -> String {
    "en".into()
}
fn default_database_path() -> String {
    "~/.pitchcraft/pitchcraft.db".into()
}
fn default_owner_id() -> String {
    "local".into()
}

/// Known vendors. Which capabilities each one can serve is decided by the
/// provider factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Perplexity,
    Firecrawl,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
    Lingo,
    /// Capability disabled; its stage always degrades to fallback.
    None,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perplexity => "perplexity",
            Self::Firecrawl => "firecrawl",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Lingo => "lingo",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[research]`, `[generation]`, `[enhancement]`, `[localization]` sections.
///
/// Unset optional fields fall back to the vendor's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderKind,

    /// Name of the env var holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            api_key_env: None,
            base_url: None,
            model: None,
        }
    }
}

fn default_research() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::Perplexity)
}
fn default_generation() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::OpenAi)
}
fn default_enhancement() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::Gemini)
}
fn default_localization() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::None)
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_research_timeout")]
    pub research_timeout_ms: u64,
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_ms: u64,
    #[serde(default = "default_enhancement_timeout")]
    pub enhancement_timeout_ms: u64,
    #[serde(default = "default_short_timeout")]
    pub summary_timeout_ms: u64,
    #[serde(default = "default_short_timeout")]
    pub localization_timeout_ms: u64,
    #[serde(default = "default_short_timeout")]
    pub validation_timeout_ms: u64,

    /// Maximum hits requested from the research vendor.
    #[serde(default = "default_result_limit")]
    pub research_result_limit: usize,

    #[serde(default = "default_max_tokens")]
    pub generation_max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub generation_temperature: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            research_timeout_ms: default_research_timeout(),
            generation_timeout_ms: default_generation_timeout(),
            enhancement_timeout_ms: default_enhancement_timeout(),
            summary_timeout_ms: default_short_timeout(),
            localization_timeout_ms: default_short_timeout(),
            validation_timeout_ms: default_short_timeout(),
            research_result_limit: default_result_limit(),
            generation_max_tokens: default_max_tokens(),
            generation_temperature: default_temperature(),
        }
    }
}

fn default_research_timeout() -> u64 {
    8_000
}
fn default_generation_timeout() -> u64 {
    8_000
}
fn default_enhancement_timeout() -> u64 {
    6_000
}
fn default_short_timeout() -> u64 {
    5_000
}
fn default_result_limit() -> usize {
    5
}
fn default_max_tokens() -> u32 {
    2_000
}
fn default_temperature() -> f32 {
    0.7
}

// ---------------------------------------------------------------------------
// Stage budgets (runtime, derived from config)
// ---------------------------------------------------------------------------

/// Per-stage timeout budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudgets {
    pub research: Duration,
    pub generation: Duration,
    pub enhancement: Duration,
    pub summary: Duration,
    pub localization: Duration,
    pub validation: Duration,
}

impl StageBudgets {
    /// Upper bound on a full run's wall-clock time spent waiting on vendors.
    ///
    /// Research and generation run side by side, so only the longer counts.
    pub fn total(&self) -> Duration {
        self.research.max(self.generation)
            + self.enhancement
            + self.summary
            + self.localization
            + self.validation
    }
}

impl Default for StageBudgets {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for StageBudgets {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            research: Duration::from_millis(settings.research_timeout_ms),
            generation: Duration::from_millis(settings.generation_timeout_ms),
            enhancement: Duration::from_millis(settings.enhancement_timeout_ms),
            summary: Duration::from_millis(settings.summary_timeout_ms),
            localization: Duration::from_millis(settings.localization_timeout_ms),
            validation: Duration::from_millis(settings.validation_timeout_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pitchcraft/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PitchcraftError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pitchcraft/pitchcraft.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PitchcraftError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PitchcraftError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PitchcraftError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PitchcraftError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PitchcraftError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| PitchcraftError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Read an API key from the named env var. Empty values count as missing.
pub fn api_key_from_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}
