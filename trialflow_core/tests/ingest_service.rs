use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trialflow_core::{
    Error, IngestConfig, IngestService, PageRequest, PageResult, PageToken, RawRepository,
    RegistryClient, RegistryFetchError, SqliteRawRepository, StopReason,
};

/// Serves `pages` pages of `per_page` studies, then ends the collection.
/// Study content depends on `revision` so a later run can observe new versions.
struct FakeRegistry {
    pages: usize,
    per_page: usize,
    revision: u32,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult, RegistryFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let index: usize = match &request.page_token {
            None => 0,
            Some(token) => token
                .as_str()
                .parse()
                .map_err(|_| RegistryFetchError::InvalidRequest("bad token".to_string()))?,
        };

        let records = (0..self.per_page)
            .map(|i| {
                json!({
                    "protocolSection": {
                        "identificationModule": {"nctId": format!("NCT{index:03}{i:02}")},
                        "statusModule": {"revision": self.revision}
                    }
                })
            })
            .collect();
        let next = index + 1;
        Ok(PageResult {
            records,
            next_page_token: (next < self.pages)
                .then(|| PageToken::new(next.to_string()))
                .flatten(),
        })
    }
}

fn config_in(dir: &tempfile::TempDir) -> IngestConfig {
    let mut cfg = IngestConfig::default();
    cfg.store.db_path = dir.path().join("nested").join("raw.db");
    cfg.registry.page_size = 3;
    cfg
}

fn registry(revision: u32) -> (FakeRegistry, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        FakeRegistry {
            pages: 3,
            per_page: 3,
            revision,
            calls: calls.clone(),
        },
        calls,
    )
}

#[tokio::test]
async fn service_creates_store_and_ingests_all_pages() {
    let dir = tempfile::tempdir().unwrap();
    let service = IngestService::new(config_in(&dir)).unwrap();
    let (client, calls) = registry(1);

    let result = service
        .run(|_| Ok(client), &service.default_request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.pages, 3);
    assert_eq!(result.inserted, 9);
    assert_eq!(result.stop_reason, StopReason::Exhausted);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(dir.path().join("nested").join("raw.db").exists());
}

#[tokio::test]
async fn rerun_against_existing_store_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let service = IngestService::new(config_in(&dir)).unwrap();
    let request = service.default_request();

    let (client, _) = registry(1);
    let first = service
        .run(|_| Ok(client), &request, &CancellationToken::new())
        .await
        .unwrap();
    let (client, _) = registry(1);
    let second = service
        .run(|_| Ok(client), &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(first.inserted, 9);
    assert_eq!((second.inserted, second.skipped), (0, 9));

    let repo = SqliteRawRepository::open(&service.config().store.db_path)
        .await
        .unwrap();
    repo.initialize().await.unwrap();
    assert_eq!(repo.count_all().await.unwrap(), 9);
    repo.close().await;
}

#[tokio::test]
async fn changed_upstream_content_adds_versions() {
    let dir = tempfile::tempdir().unwrap();
    let service = IngestService::new(config_in(&dir)).unwrap();
    let request = service.default_request().with_max_pages(1);

    let (client, _) = registry(1);
    service
        .run(|_| Ok(client), &request, &CancellationToken::new())
        .await
        .unwrap();
    let (client, _) = registry(2);
    let second = service
        .run(|_| Ok(client), &request, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.inserted, 3);

    let repo = SqliteRawRepository::open(&service.config().store.db_path)
        .await
        .unwrap();
    assert_eq!(repo.count_all().await.unwrap(), 6);
    assert_eq!(repo.count_distinct_identities().await.unwrap(), 3);

    let versions = repo.versions_by_identity("NCT00000").await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(
        versions[0].payload["protocolSection"]["statusModule"]["revision"],
        json!(2)
    );
    repo.close().await;
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut cfg = IngestConfig::default();
    cfg.source = String::new();
    assert!(IngestService::new(cfg).is_err());
}

#[tokio::test]
async fn failing_client_factory_leaves_no_store_behind() {
    let dir = tempfile::tempdir().unwrap();
    let service = IngestService::new(config_in(&dir)).unwrap();

    let err = service
        .run(
            |_| Err::<FakeRegistry, _>(Error::Config("no client".to_string())),
            &service.default_request(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(!service.config().store.db_path.exists());
}
