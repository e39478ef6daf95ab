//! Timeout/fallback wrapper and stage diagnostics.
//!
//! Every vendor call in the pipeline goes through [`guarded`]: the call is
//! raced against its stage budget, and on timeout, error, or a malformed
//! reply the caller's fallback value is substituted. Failures never escape.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use pitchcraft_shared::{PitchcraftError, Result};

// ---------------------------------------------------------------------------
// Stage / Outcome
// ---------------------------------------------------------------------------

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Research,
    Generation,
    Enhancement,
    Summary,
    Localization,
    Validation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Generation => "generation",
            Self::Enhancement => "enhancement",
            Self::Summary => "summary",
            Self::Localization => "localization",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a guarded call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The live result was used.
    Success,
    /// The budget elapsed first; fallback used.
    Timeout,
    /// The call failed; fallback used.
    Error,
    /// The call returned, but its payload was unusable; fallback used.
    Fallback,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::Fallback => "fallback",
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Diagnostic record emitted once per guarded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    pub stage: Stage,
    pub outcome: Outcome,
    pub elapsed_ms: u64,
}

/// Side channel for per-stage diagnostics. Must not block.
pub trait StageObserver: Send + Sync {
    fn stage_finished(&self, event: &StageEvent);
}

/// Emits each stage event as a structured `tracing` record.
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn stage_finished(&self, event: &StageEvent) {
        info!(
            stage = %event.stage,
            outcome = %event.outcome,
            elapsed_ms = event.elapsed_ms,
            "stage finished"
        );
    }
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl StageObserver for SilentObserver {
    fn stage_finished(&self, _event: &StageEvent) {}
}

// ---------------------------------------------------------------------------
// Wrapper
// ---------------------------------------------------------------------------

/// Value produced by a guarded call, plus how it was produced.
#[derive(Debug, Clone)]
pub struct Guarded<T> {
    pub value: T,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

/// Classify a failed call. `Malformed` means the vendor answered but the
/// payload failed the shape check.
fn failure_outcome(err: &PitchcraftError) -> Outcome {
    match err {
        PitchcraftError::Malformed { .. } => Outcome::Fallback,
        _ => Outcome::Error,
    }
}

/// Race `call` against `budget`; substitute `fallback()` on timeout or failure.
///
/// An `Ok` value is always kept, even if it is empty: shape checks belong
/// inside `call` and surface as `Malformed`. On timeout the call future is
/// dropped, which abandons any in-flight request.
pub async fn guarded<T, F>(
    stage: Stage,
    budget: Duration,
    call: F,
    fallback: impl FnOnce() -> T,
    observer: &dyn StageObserver,
) -> Guarded<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();

    let (value, outcome) = match tokio::time::timeout(budget, call).await {
        Ok(Ok(value)) => (value, Outcome::Success),
        Ok(Err(err)) => {
            let outcome = failure_outcome(&err);
            warn!(%stage, %outcome, error = %err, "stage failed, using fallback");
            (fallback(), outcome)
        }
        Err(_) => {
            warn!(
                %stage,
                budget_ms = budget.as_millis() as u64,
                "stage timed out, using fallback"
            );
            (fallback(), Outcome::Timeout)
        }
    };

    let elapsed = start.elapsed();
    if !outcome.is_degraded() {
        debug!(%stage, elapsed_ms = elapsed.as_millis() as u64, "stage succeeded");
    }

    observer.stage_finished(&StageEvent {
        stage,
        outcome,
        elapsed_ms: elapsed.as_millis() as u64,
    });

    Guarded {
        value,
        outcome,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingObserver;

    fn fallback() -> String {
        "fallback".to_string()
    }

    #[tokio::test]
    async fn success_keeps_value() {
        let observer = RecordingObserver::default();
        let out = guarded(
            Stage::Summary,
            Duration::from_secs(1),
            async { Ok("live".to_string()) },
            fallback,
            &observer,
        )
        .await;
        assert_eq!(out.value, "live");
        assert_eq!(out.outcome, Outcome::Success);
        assert_eq!(observer.outcomes(), vec![(Stage::Summary, Outcome::Success)]);
    }

    #[tokio::test]
    async fn empty_ok_value_is_not_replaced() {
        let out = guarded(
            Stage::Summary,
            Duration::from_secs(1),
            async { Ok(String::new()) },
            fallback,
            &SilentObserver,
        )
        .await;
        assert_eq!(out.value, "");
        assert_eq!(out.outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn error_uses_fallback() {
        let out = guarded(
            Stage::Research,
            Duration::from_secs(1),
            async { Err::<String, _>(PitchcraftError::Upstream("HTTP 500".into())) },
            fallback,
            &SilentObserver,
        )
        .await;
        assert_eq!(out.value, "fallback");
        assert_eq!(out.outcome, Outcome::Error);
    }

    #[tokio::test]
    async fn malformed_reports_fallback_outcome() {
        let out = guarded(
            Stage::Validation,
            Duration::from_secs(1),
            async { Err::<String, _>(PitchcraftError::malformed("no score")) },
            fallback,
            &SilentObserver,
        )
        .await;
        assert_eq!(out.value, "fallback");
        assert_eq!(out.outcome, Outcome::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_returns_at_budget() {
        let observer = RecordingObserver::default();
        let start = Instant::now();
        let out = guarded(
            Stage::Generation,
            Duration::from_secs(8),
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("too late".to_string())
            },
            fallback,
            &observer,
        )
        .await;

        assert_eq!(out.value, "fallback");
        assert_eq!(out.outcome, Outcome::Timeout);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(8));
        assert!(waited < Duration::from_millis(8_050));
        let elapsed_ms = observer.events()[0].elapsed_ms;
        assert!((8_000..8_050).contains(&elapsed_ms));
    }

    #[test]
    fn stage_event_serializes_camel_case() {
        let event = StageEvent {
            stage: Stage::Enhancement,
            outcome: Outcome::Timeout,
            elapsed_ms: 6000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"stage": "enhancement", "outcome": "timeout", "elapsedMs": 6000})
        );
    }
}
