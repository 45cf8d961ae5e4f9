use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored version of a registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStudyRecord {
    /// Store-assigned row identity; strictly increasing, never reused.
    pub sequence_id: i64,
    /// Registry identifier (NCT id). Shared by all versions of a study.
    pub identity: String,
    /// Provenance tag of the feed that produced the row.
    pub source: String,
    /// Document exactly as received.
    pub payload: serde_json::Value,
    /// Hex SHA-256 of the canonicalized payload.
    pub content_hash: String,
    pub ingested_at: DateTime<Utc>,
}

/// Per-batch insert tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub inserted: u64,
    /// Duplicates plus records without an identity.
    pub skipped: u64,
}
