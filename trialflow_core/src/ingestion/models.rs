use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_SOURCE};
use crate::raw_store::BatchOutcome;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Stop once this many records were processed (inserted + skipped).
    pub max_studies: Option<u64>,
    /// Stop once this many non-empty pages were ingested.
    pub max_pages: Option<u64>,
    pub page_size: u32,
    /// Provenance tag stored on every record.
    pub source: String,
}

impl Default for IngestRequest {
    fn default() -> Self {
        Self {
            max_studies: None,
            max_pages: None,
            page_size: DEFAULT_PAGE_SIZE,
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl IngestRequest {
    pub fn new(page_size: u32, source: impl Into<String>) -> Self {
        Self {
            page_size,
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_max_studies(mut self, max_studies: u64) -> Self {
        self.max_studies = Some(max_studies);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidInput("page_size must be > 0".to_string()));
        }
        if self.max_studies == Some(0) {
            return Err(Error::InvalidInput("max_studies must be > 0".to_string()));
        }
        if self.max_pages == Some(0) {
            return Err(Error::InvalidInput("max_pages must be > 0".to_string()));
        }
        if self.source.trim().is_empty() {
            return Err(Error::InvalidInput("source is empty".to_string()));
        }
        Ok(())
    }

    /// Page size for the next request: never more than `max_studies` still needs.
    pub(crate) fn next_page_size(&self, processed: u64) -> u32 {
        match self.max_studies {
            Some(max) => {
                let remaining = max.saturating_sub(processed);
                u64::from(self.page_size).min(remaining) as u32
            }
            None => self.page_size,
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The registry returned no next-page token.
    #[default]
    Exhausted,
    /// The registry returned a page with no records.
    EmptyPage,
    MaxPages,
    MaxStudies,
    Cancelled,
    /// A page fetch failed; see `IngestResult::errors`.
    FetchFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Exhausted => "exhausted",
            StopReason::EmptyPage => "empty_page",
            StopReason::MaxPages => "max_pages",
            StopReason::MaxStudies => "max_studies",
            StopReason::Cancelled => "cancelled",
            StopReason::FetchFailed => "fetch_failed",
        };
        f.write_str(s)
    }
}

/// Outcome of one run.
///
/// A run with a non-empty `errors` list is degraded; callers check
/// `is_success()` rather than expecting an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngestResult {
    pub inserted: u64,
    pub skipped: u64,
    pub pages: u64,
    pub errors: Vec<String>,
    pub stop_reason: StopReason,
}

impl IngestResult {
    pub fn total_processed(&self) -> u64 {
        self.inserted + self.skipped
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn record_page(&mut self, outcome: BatchOutcome) {
        self.inserted += outcome.inserted;
        self.skipped += outcome.skipped;
        self.pages += 1;
    }
}

impl fmt::Display for IngestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IngestResult(inserted={}, skipped={}, pages={}, errors={})",
            self.inserted,
            self.skipped,
            self.pages,
            self.errors.len()
        )
    }
}
