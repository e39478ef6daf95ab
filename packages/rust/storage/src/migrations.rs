//! SQL migrations for the PitchCraft database, applied in version order on
//! open.

pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: pitches",
        sql: r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per assembled pitch. Rows are never updated.
CREATE TABLE IF NOT EXISTS pitches (
    id            TEXT PRIMARY KEY,
    owner_id      TEXT NOT NULL,
    idea          TEXT NOT NULL,
    language      TEXT NOT NULL,
    quality_score REAL NOT NULL,
    artifact_json TEXT NOT NULL,
    generated_at  TEXT NOT NULL,
    saved_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pitches_owner ON pitches(owner_id, generated_at);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
