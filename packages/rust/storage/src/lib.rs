//! Embedded libSQL persistence for assembled pitches.
//!
//! [`PitchStore`] keeps each [`PitchArtifact`] as a JSON document next to the
//! few columns needed for listing. Artifacts are immutable: saving the same id
//! twice is an error, and there is no update path.

mod migrations;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database, Row, params};
use tracing::{debug, info, instrument};

use pitchcraft_shared::{PitchArtifact, PitchId, PitchSummary, PitchcraftError, Result};

fn storage_err(e: impl std::fmt::Display) -> PitchcraftError {
    PitchcraftError::Storage(e.to_string())
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Handle to the pitch database.
pub struct PitchStore {
    _db: Database,
    conn: Connection,
}

impl PitchStore {
    /// Open or create the database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PitchcraftError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;
        let conn = db.connect().map_err(storage_err)?;

        let store = Self { _db: db, conn };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        let current = self.schema_version().await;
        for migration in migrations::all_migrations() {
            if migration.version > current {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    PitchcraftError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// 0 when no migration has run yet.
    async fn schema_version(&self) -> u32 {
        let Ok(mut rows) = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await
        else {
            return 0;
        };
        match rows.next().await {
            Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
            _ => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Pitches
    // -----------------------------------------------------------------------

    /// Persist an artifact for `owner_id` and return its id.
    #[instrument(skip_all, fields(owner_id = %owner_id, id = %artifact.id))]
    pub async fn save(&self, owner_id: &str, artifact: &PitchArtifact) -> Result<PitchId> {
        let json = serde_json::to_string(artifact)
            .map_err(|e| PitchcraftError::Storage(format!("serializing pitch: {e}")))?;
        let id = artifact.id.to_string();

        self.conn
            .execute(
                "INSERT INTO pitches
                   (id, owner_id, idea, language, quality_score, artifact_json, generated_at, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.as_str(),
                    owner_id,
                    artifact.idea.as_str(),
                    artifact.language.as_str(),
                    f64::from(artifact.analysis.quality.score),
                    json,
                    timestamp(artifact.generated_at),
                    timestamp(Utc::now()),
                ],
            )
            .await
            .map_err(|e| PitchcraftError::Storage(format!("saving pitch {id}: {e}")))?;

        debug!("pitch saved");
        Ok(artifact.id.clone())
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn get(&self, id: &PitchId) -> Result<Option<PitchArtifact>> {
        let mut rows = self
            .conn
            .query(
                "SELECT artifact_json FROM pitches WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => {
                let json = row.get::<String>(0).map_err(storage_err)?;
                let artifact = serde_json::from_str(&json).map_err(|e| {
                    PitchcraftError::parse(format!("stored pitch {id} is not valid: {e}"))
                })?;
                Ok(Some(artifact))
            }
            None => Ok(None),
        }
    }

    /// Pitches saved by `owner_id`, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, owner_id: &str) -> Result<Vec<PitchSummary>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, idea, language, quality_score, generated_at
                 FROM pitches WHERE owner_id = ?1
                 ORDER BY generated_at DESC, id DESC",
                params![owner_id],
            )
            .await
            .map_err(storage_err)?;

        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            summaries.push(row_to_summary(&row)?);
        }
        Ok(summaries)
    }
}

fn row_to_summary(row: &Row) -> Result<PitchSummary> {
    let id = row.get::<String>(0).map_err(storage_err)?;
    let generated_at = row.get::<String>(4).map_err(storage_err)?;

    Ok(PitchSummary {
        id: id
            .parse()
            .map_err(|e| PitchcraftError::parse(format!("stored pitch id '{id}': {e}")))?,
        idea: row.get::<String>(1).map_err(storage_err)?,
        language: row.get::<String>(2).map_err(storage_err)?,
        quality_score: row.get::<f64>(3).map_err(storage_err)? as f32,
        generated_at: DateTime::parse_from_rfc3339(&generated_at)
            .map_err(|e| PitchcraftError::parse(format!("stored timestamp '{generated_at}': {e}")))?
            .with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pitchcraft_shared::{
        Analysis, Idea, LanguageAnalysis, QualityAssessment, ResearchResult, SlideDeck,
    };
    use uuid::Uuid;

    async fn test_store() -> PitchStore {
        let tmp = std::env::temp_dir().join(format!("pitchcraft_test_{}.db", Uuid::now_v7()));
        PitchStore::open(&tmp).await.expect("open test db")
    }

    fn artifact(idea: &str, score: f32, generated_at: DateTime<Utc>) -> PitchArtifact {
        PitchArtifact {
            id: PitchId::new(),
            idea: Idea::new(idea).unwrap(),
            language: "en".into(),
            executive_summary: format!("{idea} in one line."),
            slides: SlideDeck::build(|t| format!("{t} body")),
            research: ResearchResult {
                market_size: "$1B".into(),
                competitors: vec!["Acme".into()],
                trends: vec!["Growth".into()],
                funding: "Seed rounds".into(),
                sources: vec!["https://example.com".into()],
            },
            analysis: Analysis {
                quality: QualityAssessment::new(score, "ok", vec!["more data".into()]),
                language: LanguageAnalysis {
                    word_count: 20,
                    sentence_count: 2,
                    readability: 6.5,
                    engagement: 4.0,
                },
                processing_time_ms: 812,
            },
            generated_at,
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let store = test_store().await;
        assert_eq!(store.schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("pitchcraft_test_{}.db", Uuid::now_v7()));
        let first = PitchStore::open(&tmp).await.expect("first open");
        drop(first);
        let second = PitchStore::open(&tmp).await.expect("second open");
        assert_eq!(second.schema_version().await, 1);
    }

    #[tokio::test]
    async fn save_then_get_returns_identical_artifact() {
        let store = test_store().await;
        let original = artifact("drone pharmacy", 8.0, Utc::now());

        let id = store.save("local", &original).await.expect("save");
        assert_eq!(id, original.id);

        let loaded = store.get(&id).await.expect("get").expect("present");
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn saving_twice_is_rejected() {
        let store = test_store().await;
        let pitch = artifact("drone pharmacy", 8.0, Utc::now());
        store.save("local", &pitch).await.expect("first save");

        let err = store.save("local", &pitch).await.unwrap_err();
        assert!(matches!(err, PitchcraftError::Storage(_)));
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let store = test_store().await;
        assert!(store.get(&PitchId::new()).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn list_is_per_owner_and_newest_first() {
        let store = test_store().await;
        let now = Utc::now();
        let older = artifact("older idea", 6.0, now - Duration::hours(2));
        let newer = artifact("newer idea", 9.0, now);
        let other = artifact("someone else", 5.0, now);

        store.save("alice", &older).await.unwrap();
        store.save("alice", &newer).await.unwrap();
        store.save("bob", &other).await.unwrap();

        let listed = store.list("alice").await.expect("list");
        let ideas: Vec<&str> = listed.iter().map(|s| s.idea.as_str()).collect();
        assert_eq!(ideas, ["newer idea", "older idea"]);
        assert_eq!(listed[0].quality_score, 9.0);
        assert_eq!(listed[0].id, newer.id);

        assert!(store.list("carol").await.unwrap().is_empty());
    }
}
