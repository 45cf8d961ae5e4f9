use crate::raw_store::identity::extract_identity;
use crate::raw_store::models::{BatchOutcome, RawStudyRecord};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Append-only, content-addressed store for raw registry documents.
///
/// Uniqueness of `(identity, content_hash)` is the only dedup mechanism. A
/// conflicting insert is reported as `Ok(false)`, never as an error, so that
/// concurrent writers racing on the same content are benign.
#[async_trait]
pub trait RawRepository: Send + Sync {
    /// Create the backing table and indexes if they do not exist.
    async fn initialize(&self) -> Result<()>;

    /// Append one version. Returns `false` when identical content already
    /// exists for `identity`.
    async fn insert_record(&self, identity: &str, payload: &Value, source: &str)
        -> Result<bool>;

    /// Insert documents in order, each committed on its own.
    ///
    /// Documents without an identity are counted as skipped and never reach
    /// the store. A storage error aborts the batch; earlier rows stay written.
    #[tracing::instrument(level = "debug", skip(self, records), fields(batch_len = records.len()))]
    async fn insert_batch(&self, records: &[Value], source: &str) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for record in records {
            let Some(identity) = extract_identity(record) else {
                tracing::warn!(source, "record missing identity, skipping");
                outcome.skipped += 1;
                continue;
            };

            if self.insert_record(&identity, record, source).await? {
                outcome.inserted += 1;
            } else {
                outcome.skipped += 1;
            }
        }

        tracing::info!(
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            "batch insert complete"
        );
        Ok(outcome)
    }

    /// All versions of `identity`, newest first (ties by `sequence_id` desc).
    async fn versions_by_identity(&self, identity: &str) -> Result<Vec<RawStudyRecord>>;

    async fn latest_version(&self, identity: &str) -> Result<Option<RawStudyRecord>>;

    async fn count_all(&self) -> Result<u64>;

    async fn count_distinct_identities(&self) -> Result<u64>;

    /// Rows with `sequence_id > after_sequence_id` in ascending order, for
    /// downstream transformation layers reading the raw layer incrementally.
    async fn scan(&self, after_sequence_id: i64, limit: u32) -> Result<Vec<RawStudyRecord>>;
}
