//! Seam between the ingestion engine and a remote paginated collection.
//!
//! Concrete HTTP clients live in `trialflow_integrations`.

pub mod error;
pub mod models;
pub mod traits;

pub use error::{truncate_excerpt, RegistryFetchError, BODY_EXCERPT_MAX_CHARS};
pub use models::{PageRequest, PageResult, PageToken};
pub use traits::RegistryClient;
