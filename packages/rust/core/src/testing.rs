//! Test doubles for the capability traits and the stage observer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pitchcraft_shared::{
    EnhancementCapability, LocalizationCapability, PitchcraftError, ResearchCapability, Result,
    SearchHit, SlideTitle, TextGeneration,
};

use crate::fallback::{Outcome, Stage, StageEvent, StageObserver};

/// Scripted behavior of a mock capability.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Transport-style failure.
    Fail,
    /// Vendor answered with an unusable payload.
    Malformed,
    /// Never resolves.
    Hang,
    Panic,
}

async fn resolve<T: Clone>(reply: &Reply<T>) -> Result<T> {
    match reply {
        Reply::Ok(value) => Ok(value.clone()),
        Reply::Fail => Err(PitchcraftError::Upstream("mock upstream failure".into())),
        Reply::Malformed => Err(PitchcraftError::malformed("mock malformed reply")),
        Reply::Hang => std::future::pending().await,
        Reply::Panic => panic!("mock capability panicked"),
    }
}

/// Nine numbered sections whose bodies read `"{tag} content for {Title}"`.
pub fn numbered_deck_text(tag: &str) -> String {
    SlideTitle::ALL
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {title}\n{tag} content for {title}", i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn market_hits() -> Vec<SearchHit> {
    vec![SearchHit {
        content: "The pet care market size is $5.4 billion.\n\
                  1. Rover - leading competitor\n\
                  Key trend: premium in-home care\n\
                  Rover raised $155M in funding."
            .into(),
        url: "https://research.example/pets".into(),
    }]
}

// ---------------------------------------------------------------------------
// Mocks
// ---------------------------------------------------------------------------

pub struct MockResearch {
    reply: Reply<Vec<SearchHit>>,
    calls: AtomicUsize,
    last_query: Mutex<Option<String>>,
}

impl MockResearch {
    pub fn new(reply: Reply<Vec<SearchHit>>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResearchCapability for MockResearch {
    fn name(&self) -> &str {
        "mock-research"
    }

    async fn search(&self, query: &str, _result_limit: usize) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.to_string());
        resolve(&self.reply).await
    }
}

pub struct MockGeneration {
    reply: Reply<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockGeneration {
    pub fn new(reply: Reply<String>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGeneration for MockGeneration {
    fn name(&self) -> &str {
        "mock-generation"
    }

    async fn generate(&self, prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        resolve(&self.reply).await
    }
}

/// Enhancement mock. `healthy()` answers each prompt family with a plausible
/// reply; `new(reply)` answers every prompt the same way.
pub struct MockEnhancement {
    reply: Option<Reply<String>>,
    calls: AtomicUsize,
}

impl MockEnhancement {
    pub fn new(reply: Reply<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn healthy_reply(prompt: &str) -> Result<String> {
        if prompt.starts_with("Enhance") {
            Ok("Executive Summary: Enhanced executive summary for investors.".into())
        } else if prompt.starts_with("Create a compelling") {
            Ok("A live executive summary.".into())
        } else if prompt.starts_with("Analyze and score") {
            Ok(r#"{"score": 8.2, "feedback": "Solid structure.", "suggestions": ["Add traction metrics"]}"#.into())
        } else {
            Err(PitchcraftError::malformed("unexpected prompt"))
        }
    }
}

#[async_trait]
impl EnhancementCapability for MockEnhancement {
    fn name(&self) -> &str {
        "mock-enhancement"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => resolve(reply).await,
            None => Self::healthy_reply(prompt),
        }
    }
}

/// Localization mock; `Reply::Ok(())` prefixes text with `[lang] `.
pub struct MockLocalization {
    reply: Reply<()>,
    calls: AtomicUsize,
}

impl MockLocalization {
    pub fn new(reply: Reply<()>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalizationCapability for MockLocalization {
    fn name(&self) -> &str {
        "mock-localization"
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        resolve(&self.reply).await?;
        Ok(format!("[{target_language}] {text}"))
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StageEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<(Stage, Outcome)> {
        self.events().iter().map(|e| (e.stage, e.outcome)).collect()
    }
}

impl StageObserver for RecordingObserver {
    fn stage_finished(&self, event: &StageEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
