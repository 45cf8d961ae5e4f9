use crate::cli::{IngestArgs, StoreArgs};
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trialflow_core::{
    IngestConfig, IngestResult, IngestService, RawRepository, SqliteRawRepository,
};
use trialflow_integrations::ClinicalTrialsClient;

/// Layer command line flags over the environment-derived config.
pub fn apply_ingest_overrides(mut config: IngestConfig, args: &IngestArgs) -> IngestConfig {
    config = apply_store_override(config, &args.store);
    if let Some(page_size) = args.page_size {
        config.registry.page_size = page_size;
    }
    if let Some(base_url) = &args.base_url {
        config.registry.base_url = base_url.clone();
    }
    if let Some(ms) = args.timeout_ms {
        config.registry.timeout = Duration::from_millis(ms);
    }
    if let Some(source) = &args.source {
        config.source = source.clone();
    }
    config
}

pub fn apply_store_override(mut config: IngestConfig, args: &StoreArgs) -> IngestConfig {
    if let Some(path) = &args.db_path {
        config.store.db_path = path.clone();
    }
    config
}

#[tracing::instrument(level = "info", skip_all)]
pub async fn ingest(
    config: IngestConfig,
    args: &IngestArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<IngestResult> {
    let config = apply_ingest_overrides(config, args);
    let service = IngestService::new(config)?;

    let mut request = service.default_request();
    request.max_studies = args.max_studies;
    request.max_pages = args.max_pages;

    tracing::info!(
        base_url = %service.config().registry.base_url,
        db_path = %service.config().store.db_path.display(),
        "starting ingestion"
    );
    Ok(service.run(ClinicalTrialsClient::new, &request, cancel).await?)
}

pub fn write_summary(out: &mut impl Write, result: &IngestResult) -> std::io::Result<()> {
    writeln!(out, "{result}")?;
    writeln!(out, "  inserted:    {}", result.inserted)?;
    writeln!(out, "  skipped:     {}", result.skipped)?;
    writeln!(out, "  pages:       {}", result.pages)?;
    writeln!(out, "  stop reason: {}", result.stop_reason)?;
    for err in &result.errors {
        writeln!(out, "  error: {err}")?;
    }
    Ok(())
}

async fn open_store(config: &IngestConfig) -> anyhow::Result<SqliteRawRepository> {
    let repo = SqliteRawRepository::open(&config.store.db_path).await?;
    repo.initialize().await?;
    Ok(repo)
}

pub async fn stats(config: &IngestConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let repo = open_store(config).await?;
    let counts = async {
        let rows = repo.count_all().await?;
        let studies = repo.count_distinct_identities().await?;
        Ok::<_, trialflow_core::Error>((rows, studies))
    }
    .await;
    repo.close().await;

    let (rows, studies) = counts?;
    writeln!(out, "db_path: {}", config.store.db_path.display())?;
    writeln!(out, "rows:    {rows}")?;
    writeln!(out, "studies: {studies}")?;
    Ok(())
}

pub async fn versions(
    config: &IngestConfig,
    nct_id: &str,
    out: &mut impl Write,
) -> anyhow::Result<usize> {
    let repo = open_store(config).await?;
    let found = repo.versions_by_identity(nct_id).await;
    repo.close().await;

    let found = found?;
    for record in &found {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(found.len())
}
