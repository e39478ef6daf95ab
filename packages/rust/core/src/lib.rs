//! Pitch pipeline orchestration and domain logic for PitchCraft.
//!
//! This crate ties the research, generation, enhancement and localization
//! capabilities together into one degrading pipeline that always yields a
//! complete [`PitchArtifact`](pitchcraft_shared::PitchArtifact).

pub mod analysis;
pub mod assembler;
pub mod enhancement;
pub mod export;
pub mod fallback;
pub mod generation;
pub mod localization;
pub mod pipeline;
pub mod research;
pub mod sections;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

pub use fallback::{Outcome, SilentObserver, Stage, StageEvent, StageObserver, TracingObserver};
pub use pipeline::{GenerateRequest, GenerateResponse, Pipeline, PipelineConfig};
