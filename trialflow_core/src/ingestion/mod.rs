//! Ingestion coordinator: pages through the registry and appends every page to
//! the raw store.
//!
//! - `Ingestor` is the loop itself, borrowing a `RawRepository` and a
//!   `RegistryClient`.
//! - `IngestService` opens the SQLite store from config and guarantees it is
//!   closed after the run.

pub mod engine;
pub mod models;
pub mod service;

pub use engine::Ingestor;
pub use models::{IngestRequest, IngestResult, StopReason};
pub use service::IngestService;
