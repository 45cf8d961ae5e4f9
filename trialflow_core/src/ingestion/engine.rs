use crate::ingestion::models::{IngestRequest, IngestResult, StopReason};
use crate::raw_store::RawRepository;
use crate::registry::{PageRequest, PageToken, RegistryClient};
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Drives the fetch -> insert loop for one run.
///
/// Pages are fetched strictly one at a time. A fetch failure ends the run and
/// is recorded in the result; a storage failure is returned as `Err`.
pub struct Ingestor<'a> {
    repo: &'a dyn RawRepository,
    client: &'a dyn RegistryClient,
}

impl<'a> Ingestor<'a> {
    pub fn new(repo: &'a dyn RawRepository, client: &'a dyn RegistryClient) -> Self {
        Self { repo, client }
    }

    /// Run until exhaustion, a cap, cancellation, or a fetch error.
    ///
    /// `cancel` is checked before each page; an in-flight page is finished.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(client = self.client.id(), source = %request.source)
    )]
    pub async fn run(
        &self,
        request: &IngestRequest,
        cancel: &CancellationToken,
    ) -> Result<IngestResult> {
        request.validate()?;

        let mut result = IngestResult::default();
        let mut page_token: Option<PageToken> = None;

        let stop = loop {
            if cancel.is_cancelled() {
                tracing::info!("ingestion cancelled");
                break StopReason::Cancelled;
            }

            if let Some(max_pages) = request.max_pages {
                if result.pages >= max_pages {
                    tracing::info!(max_pages, "reached max pages limit");
                    break StopReason::MaxPages;
                }
            }

            if let Some(max_studies) = request.max_studies {
                if result.total_processed() >= max_studies {
                    tracing::info!(max_studies, "reached max studies limit");
                    break StopReason::MaxStudies;
                }
            }

            let page_number = result.pages + 1;
            let page_request = PageRequest {
                page_size: request.next_page_size(result.total_processed()),
                page_token: page_token.take(),
            };

            let page = match self.client.fetch_page(page_request).await {
                Ok(page) => page,
                Err(e) => {
                    let message = format!("registry error on page {page_number}: {e}");
                    tracing::error!(page = page_number, error = %e, "page fetch failed");
                    result.errors.push(message);
                    break StopReason::FetchFailed;
                }
            };

            if page.records.is_empty() {
                tracing::info!(page = page_number, "no more studies to fetch");
                break StopReason::EmptyPage;
            }

            let outcome = self
                .repo
                .insert_batch(&page.records, &request.source)
                .await?;
            result.record_page(outcome);

            tracing::info!(
                page = result.pages,
                inserted = outcome.inserted,
                skipped = outcome.skipped,
                total = result.total_processed(),
                "page ingested"
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => {
                    tracing::info!("no more pages available");
                    break StopReason::Exhausted;
                }
            }
        };

        result.stop_reason = stop;
        tracing::info!(stop_reason = %stop, "ingestion complete: {result}");
        Ok(result)
    }
}
