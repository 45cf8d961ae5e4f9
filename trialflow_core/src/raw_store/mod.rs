//! Raw layer: append-only, content-addressed storage of every distinct payload
//! version observed from the registry.
//!
//! Rows are keyed by `(identity, content_hash)`. Re-inserting identical content
//! for the same identity is a no-op reported as a skip; changed content for the
//! same identity becomes a new version. Nothing is ever updated or deleted.

pub mod canonical;
pub mod identity;
pub mod models;
pub mod sqlite;
pub mod traits;

pub use canonical::{canonical_json, content_hash};
pub use identity::extract_identity;
pub use models::{BatchOutcome, RawStudyRecord};
pub use sqlite::SqliteRawRepository;
pub use traits::RawRepository;
