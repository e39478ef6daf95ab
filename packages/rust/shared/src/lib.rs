//! Shared types, error model, capability traits, and configuration for PitchCraft.
//!
//! This crate is the foundation depended on by all other PitchCraft crates.
//! It provides:
//! - [`PitchcraftError`], the unified error type
//! - Domain types ([`PitchArtifact`], [`SlideDeck`], [`ResearchResult`], [`Idea`])
//! - Capability traits implemented by vendor adapters ([`Capabilities`])
//! - Configuration ([`AppConfig`], [`StageBudgets`], config loading)

pub mod capability;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use capability::{
    Capabilities, EnhancementCapability, LocalizationCapability, ResearchCapability,
    TextGeneration,
};
pub use config::{
    AppConfig, DefaultsConfig, PipelineSettings, ProviderConfig, ProviderKind, StageBudgets,
    api_key_from_env, config_dir, config_file_path, expand_home, init_config, load_config,
    load_config_from,
};
pub use error::{PitchcraftError, Result};
pub use types::{
    Analysis, Idea, LanguageAnalysis, MAX_SCORE, PitchArtifact, PitchId, PitchSummary,
    QualityAssessment, ResearchResult, SearchHit, Slide, SlideDeck, SlideTitle, clamp_score,
};
