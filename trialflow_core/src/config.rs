use crate::o11y::LogConfig;
use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "data/clinical_trials.db";
pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SOURCE: &str = "clinicaltrials_api_v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite file backing the raw layer. Parent directories are created on open.
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// API root, e.g. `https://clinicaltrials.gov/api/v2`.
    pub base_url: String,
    /// Per-request deadline.
    pub timeout: Duration,
    /// Page size requested when the caller does not cap it further.
    pub page_size: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY_BASE_URL.to_string(),
            timeout: DEFAULT_REGISTRY_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Process-level configuration for an ingestion deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub store: StoreConfig,
    pub registry: RegistryConfig,
    /// Provenance tag written to every raw record.
    pub source: String,
    pub log: LogConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            registry: RegistryConfig::default(),
            source: DEFAULT_SOURCE.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Build from `TRIALFLOW_*` environment variables, falling back to defaults.
    ///
    /// Values are parsed but not validated: callers layer their overrides on
    /// top and then call `validate`, which `IngestService::new` does.
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let db_path = env_string("TRIALFLOW_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store.db_path);
        let base_url =
            env_string("TRIALFLOW_REGISTRY_BASE_URL").unwrap_or(defaults.registry.base_url);
        let timeout = env_parse::<u64>("TRIALFLOW_REGISTRY_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.registry.timeout);
        let page_size =
            env_parse::<u32>("TRIALFLOW_PAGE_SIZE")?.unwrap_or(defaults.registry.page_size);
        let source = env_string("TRIALFLOW_SOURCE").unwrap_or(defaults.source);
        let log = LogConfig::from_env()?;

        Ok(Self {
            store: StoreConfig { db_path },
            registry: RegistryConfig {
                base_url,
                timeout,
                page_size,
            },
            source,
            log,
        })
    }

    #[tracing::instrument(level = "debug")]
    pub fn validate(&self) -> Result<()> {
        if self.store.db_path.as_os_str().is_empty() {
            return Err(Error::Config("store.db_path is empty".to_string()));
        }

        let base_url = self.registry.base_url.trim();
        if base_url.is_empty() {
            return Err(Error::Config("registry.base_url is empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "registry.base_url must be http(s): {base_url}"
            )));
        }
        if self.registry.timeout.is_zero() {
            return Err(Error::Config("registry.timeout must be > 0".to_string()));
        }
        if self.registry.page_size == 0 {
            return Err(Error::Config("registry.page_size must be > 0".to_string()));
        }

        if self.source.trim().is_empty() {
            return Err(Error::Config("source is empty".to_string()));
        }

        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid {key}={raw}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_registry() {
        let cfg = IngestConfig::default();
        assert_eq!(cfg.registry.base_url, "https://clinicaltrials.gov/api/v2");
        assert_eq!(cfg.registry.timeout, Duration::from_secs(30));
        assert_eq!(cfg.registry.page_size, 100);
        assert_eq!(cfg.source, "clinicaltrials_api_v2");
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_zero_page_size() {
        let mut cfg = IngestConfig::default();
        cfg.registry.page_size = 0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("page_size")));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut cfg = IngestConfig::default();
        cfg.registry.base_url = "ftp://example.org".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_blank_source() {
        let mut cfg = IngestConfig::default();
        cfg.source = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn from_env_leaves_validation_to_the_caller() {
        std::env::set_var("TRIALFLOW_PAGE_SIZE", "0");
        let parsed = IngestConfig::from_env();
        std::env::set_var("TRIALFLOW_PAGE_SIZE", "ten");
        let unparsable = IngestConfig::from_env();
        std::env::remove_var("TRIALFLOW_PAGE_SIZE");

        let cfg = parsed.unwrap();
        assert_eq!(cfg.registry.page_size, 0);
        assert!(cfg.validate().is_err());
        assert!(
            matches!(unparsable, Err(Error::Config(msg)) if msg.contains("TRIALFLOW_PAGE_SIZE"))
        );
    }
}
