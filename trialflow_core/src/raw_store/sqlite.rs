//! SQLite-backed raw repository.
//!
//! Single-file store for self-hosted pipelines. The table is append-only:
//! triggers reject `UPDATE` and `DELETE`, and inserts resolve uniqueness
//! conflicts with `DO NOTHING`.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::canonical::content_hash;
use super::models::RawStudyRecord;
use super::traits::RawRepository;
use crate::{Error, Result};

#[derive(Clone)]
pub struct SqliteRawRepository {
    pool: SqlitePool,
}

impl SqliteRawRepository {
    /// Open (creating if missing) the database file at `path`.
    ///
    /// Does not create the schema; call `initialize()` before use.
    #[tracing::instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::storage("raw_store mkdir", e))?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Wal)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|e| Error::storage("raw_store connect", e))?;

        tracing::info!("connected to raw store");
        Ok(Self { pool })
    }

    /// Private in-memory database. Lives as long as this repository (and its
    /// clones) hold the single pooled connection.
    pub async fn in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| Error::storage("raw_store memory options", e))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|e| Error::storage("raw_store memory connect", e))?;
        Ok(Self { pool })
    }

    /// Underlying pool, for read-only downstream queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections. Idempotent.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!("raw store closed");
        }
    }
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS raw_studies (
  sequence_id INTEGER PRIMARY KEY AUTOINCREMENT,
  nct_id TEXT NOT NULL,
  source TEXT NOT NULL,
  raw_json TEXT NOT NULL,
  content_hash TEXT NOT NULL,
  ingested_at TEXT NOT NULL,
  UNIQUE (nct_id, content_hash)
);
CREATE INDEX IF NOT EXISTS rs_nct_ingested_idx
  ON raw_studies(nct_id, ingested_at DESC, sequence_id DESC);
CREATE INDEX IF NOT EXISTS rs_ingested_idx ON raw_studies(ingested_at);

CREATE TRIGGER IF NOT EXISTS raw_studies_no_update
BEFORE UPDATE ON raw_studies
BEGIN
  SELECT RAISE(ABORT, 'raw_studies is append-only');
END;

CREATE TRIGGER IF NOT EXISTS raw_studies_no_delete
BEFORE DELETE ON raw_studies
BEGIN
  SELECT RAISE(ABORT, 'raw_studies is append-only');
END;
"#;

// `ingested_at` is clamped to the newest stored timestamp so it never goes
// backwards in insertion order, even if the wall clock does. Timestamps are
// fixed-width RFC 3339 so text comparison matches time order.
const INSERT_SQL: &str = r#"
INSERT INTO raw_studies (nct_id, source, raw_json, content_hash, ingested_at)
SELECT ?1, ?2, ?3, ?4,
       MAX(?5, COALESCE((SELECT MAX(ingested_at) FROM raw_studies), ?5))
WHERE true
ON CONFLICT(nct_id, content_hash) DO NOTHING
"#;

const SELECT_COLUMNS: &str =
    "sequence_id, nct_id, source, raw_json, content_hash, ingested_at";

#[async_trait]
impl RawRepository for SqliteRawRepository {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn initialize(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::storage("raw_store schema", e))?;
        tracing::info!("raw_studies table initialized");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, payload))]
    async fn insert_record(&self, identity: &str, payload: &Value, source: &str) -> Result<bool> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(Error::InvalidInput("identity is empty".to_string()));
        }
        if source.trim().is_empty() {
            return Err(Error::InvalidInput("source is empty".to_string()));
        }

        let hash = content_hash(payload);
        let raw_json = serde_json::to_string(payload)
            .map_err(|e| Error::serialization("serialize raw payload", e))?;
        let now = format_ts(Utc::now());

        let rows = sqlx::query(INSERT_SQL)
            .bind(identity)
            .bind(source)
            .bind(raw_json)
            .bind(&hash)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::storage("raw_store insert", e))?;

        if rows.rows_affected() == 0 {
            tracing::debug!(identity, hash = &hash[..8], "skipped duplicate content");
            return Ok(false);
        }

        tracing::debug!(identity, "inserted raw study");
        Ok(true)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn versions_by_identity(&self, identity: &str) -> Result<Vec<RawStudyRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM raw_studies WHERE nct_id = ?1 \
             ORDER BY ingested_at DESC, sequence_id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(identity)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::storage("raw_store versions", e))?;
        rows.iter().map(row_to_record).collect()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn latest_version(&self, identity: &str) -> Result<Option<RawStudyRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM raw_studies WHERE nct_id = ?1 \
             ORDER BY ingested_at DESC, sequence_id DESC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::storage("raw_store latest", e))?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn count_all(&self) -> Result<u64> {
        let n: i64 = sqlx::query("SELECT COUNT(*) AS n FROM raw_studies")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::storage("raw_store count", e))?
            .get("n");
        Ok(n.max(0) as u64)
    }

    async fn count_distinct_identities(&self) -> Result<u64> {
        let n: i64 = sqlx::query("SELECT COUNT(DISTINCT nct_id) AS n FROM raw_studies")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::storage("raw_store count distinct", e))?
            .get("n");
        Ok(n.max(0) as u64)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn scan(&self, after_sequence_id: i64, limit: u32) -> Result<Vec<RawStudyRecord>> {
        if limit == 0 {
            return Err(Error::InvalidInput("scan limit must be > 0".to_string()));
        }
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM raw_studies WHERE sequence_id > ?1 \
             ORDER BY sequence_id ASC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(after_sequence_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::storage("raw_store scan", e))?;
        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: &SqliteRow) -> Result<RawStudyRecord> {
    let raw_json: String = row.get("raw_json");
    let ingested_at: String = row.get("ingested_at");
    Ok(RawStudyRecord {
        sequence_id: row.get("sequence_id"),
        identity: row.get("nct_id"),
        source: row.get("source"),
        payload: serde_json::from_str(&raw_json)
            .map_err(|e| Error::serialization("decode raw payload", e))?,
        content_hash: row.get("content_hash"),
        ingested_at: parse_ts(&ingested_at)?,
    })
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::serialization("parse ingested_at", e))
}
