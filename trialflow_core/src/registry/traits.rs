use crate::registry::error::RegistryFetchError;
use crate::registry::models::{PageRequest, PageResult};
use async_trait::async_trait;

/// Fetches one page of a remote collection per call.
///
/// Implementations do not retry; a failed call is reported once and the caller
/// decides what to do. Network resources are owned by the implementation and
/// released when it is dropped.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Stable identifier for logs (e.g. `clinicaltrials`).
    fn id(&self) -> &'static str;

    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult, RegistryFetchError>;
}
