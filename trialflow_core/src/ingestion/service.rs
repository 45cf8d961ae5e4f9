use crate::config::{IngestConfig, RegistryConfig};
use crate::ingestion::engine::Ingestor;
use crate::ingestion::models::{IngestRequest, IngestResult};
use crate::raw_store::{RawRepository, SqliteRawRepository};
use crate::registry::RegistryClient;
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Owns the resources of a run: opens the raw store, runs the `Ingestor`
/// against the given client, and releases both on every exit path.
#[derive(Debug, Clone)]
pub struct IngestService {
    config: IngestConfig,
}

impl IngestService {
    pub fn new(config: IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Request populated from the configured page size and source tag.
    pub fn default_request(&self) -> IngestRequest {
        IngestRequest::new(self.config.registry.page_size, self.config.source.clone())
    }

    /// Run one ingestion.
    ///
    /// `make_client` builds the registry client from the configured registry
    /// settings before the store is opened. The client is dropped when the
    /// run ends.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(db_path = %self.config.store.db_path.display())
    )]
    pub async fn run<F, C>(
        &self,
        make_client: F,
        request: &IngestRequest,
        cancel: &CancellationToken,
    ) -> Result<IngestResult>
    where
        F: FnOnce(&RegistryConfig) -> Result<C>,
        C: RegistryClient,
    {
        let client = make_client(&self.config.registry)?;
        let repo = SqliteRawRepository::open(&self.config.store.db_path).await?;

        let outcome = async {
            repo.initialize().await?;
            Ingestor::new(&repo, &client).run(request, cancel).await
        }
        .await;

        repo.close().await;
        drop(client);
        outcome
    }
}
