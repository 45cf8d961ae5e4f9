//! trialflow core: content-addressed raw store, registry client seam and the
//! paginated ingestion engine.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod o11y;
pub mod raw_store;
pub mod registry;

pub use config::{IngestConfig, RegistryConfig, StoreConfig};
pub use error::{Error, Result};
pub use ingestion::{IngestRequest, IngestResult, IngestService, Ingestor, StopReason};
pub use raw_store::{
    canonical_json, content_hash, extract_identity, BatchOutcome, RawRepository, RawStudyRecord,
    SqliteRawRepository,
};
pub use registry::{PageRequest, PageResult, PageToken, RegistryClient, RegistryFetchError};
