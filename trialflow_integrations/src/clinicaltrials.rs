//! ClinicalTrials.gov connector.
//!
//! Pages through `GET {base_url}/studies` (API v2). Pagination is driven by the
//! opaque `nextPageToken` returned with each page; the last page omits it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;
use trialflow_core::registry::{
    PageRequest, PageResult, PageToken, RegistryClient, RegistryFetchError,
};
use trialflow_core::{Error, RegistryConfig, Result};

#[derive(Debug, Deserialize)]
struct StudiesResponse {
    #[serde(default)]
    studies: Vec<serde_json::Value>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct StudiesQuery<'a> {
    #[serde(rename = "pageSize")]
    page_size: u32,
    #[serde(rename = "pageToken", skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
}

/// Client for the ClinicalTrials.gov v2 `studies` collection.
///
/// Holds one pooled `reqwest::Client` for its lifetime; connections are
/// released when the value is dropped.
#[derive(Debug, Clone)]
pub struct ClinicalTrialsClient {
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl ClinicalTrialsClient {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        if config.timeout.is_zero() {
            return Err(Error::Config("registry.timeout must be > 0".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("trialflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            api_base: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn studies_url(&self) -> String {
        format!("{}/studies", self.api_base)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> RegistryFetchError {
        if e.is_timeout() {
            RegistryFetchError::Timeout {
                after: self.timeout,
            }
        } else {
            RegistryFetchError::connection(self.api_base.clone(), e.to_string())
        }
    }
}

#[async_trait]
impl RegistryClient for ClinicalTrialsClient {
    fn id(&self) -> &'static str {
        "clinicaltrials"
    }

    #[instrument(level = "debug", skip(self), fields(page_size = request.page_size))]
    async fn fetch_page(&self, request: PageRequest) -> std::result::Result<PageResult, RegistryFetchError> {
        if request.page_size == 0 {
            return Err(RegistryFetchError::InvalidRequest(
                "page_size must be > 0".to_string(),
            ));
        }

        let url = self.studies_url();
        let query = StudiesQuery {
            page_size: request.page_size,
            page_token: request.page_token.as_ref().map(PageToken::as_str),
        };
        tracing::debug!(%url, ?query, "fetching studies");

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(RegistryFetchError::http_status(status.as_u16(), &text));
        }

        let text = resp.text().await.map_err(|e| self.map_transport_error(e))?;
        let body: StudiesResponse = serde_json::from_str(&text)
            .map_err(|e| RegistryFetchError::InvalidResponse(e.to_string()))?;

        tracing::info!(count = body.studies.len(), "fetched studies");
        Ok(PageResult {
            records: body.studies,
            next_page_token: body.next_page_token.and_then(PageToken::new),
        })
    }
}
