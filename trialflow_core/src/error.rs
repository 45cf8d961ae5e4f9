use std::error::Error as StdError;

/// Common error type for `trialflow_core`.
///
/// Storage and serialization failures keep the underlying error chain via
/// `Error::storage` / `Error::serialization`. Remote fetch failures are not
/// represented here; see `registry::RegistryFetchError`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {context}")]
    Storage {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

impl Error {
    #[tracing::instrument(level = "debug", name = "trialflow.error.storage", skip(source))]
    pub fn storage(
        context: impl Into<String> + std::fmt::Debug,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn serialization(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for failures of the backing store (disk, permissions, driver).
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
