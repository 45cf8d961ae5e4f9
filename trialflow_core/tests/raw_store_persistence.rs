use serde_json::json;
use trialflow_core::{content_hash, RawRepository, SqliteRawRepository};

#[tokio::test]
async fn rows_survive_reopen_and_reinitialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.db");
    let doc = json!({"protocolSection": {"identificationModule": {"nctId": "NCT1"}}});

    {
        let repo = SqliteRawRepository::open(&path).await.unwrap();
        repo.initialize().await.unwrap();
        assert!(repo.insert_record("NCT1", &doc, "test").await.unwrap());
        repo.close().await;
    }

    let repo = SqliteRawRepository::open(&path).await.unwrap();
    repo.initialize().await.unwrap();
    repo.initialize().await.unwrap();

    assert_eq!(repo.count_all().await.unwrap(), 1);
    assert!(!repo.insert_record("NCT1", &doc, "test").await.unwrap());

    let latest = repo.latest_version("NCT1").await.unwrap().unwrap();
    assert_eq!(latest.content_hash, content_hash(&doc));
    repo.close().await;
}

#[tokio::test]
async fn sequence_ids_keep_growing_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.db");

    let repo = SqliteRawRepository::open(&path).await.unwrap();
    repo.initialize().await.unwrap();
    repo.insert_record("A", &json!({"v": 1}), "test").await.unwrap();
    repo.close().await;

    let repo = SqliteRawRepository::open(&path).await.unwrap();
    repo.insert_record("A", &json!({"v": 2}), "test").await.unwrap();

    let rows = repo.scan(0, 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].sequence_id < rows[1].sequence_id);
    assert!(rows[0].ingested_at <= rows[1].ingested_at);
    repo.close().await;
}
