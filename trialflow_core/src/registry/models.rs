use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque continuation marker returned by the registry.
///
/// Never parsed; only handed back on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    /// `None` for an empty token, which the registry uses to mean "no more pages".
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Must be > 0. The registry may clamp large values.
    pub page_size: u32,
    /// `None` for the first page.
    pub page_token: Option<PageToken>,
}

impl PageRequest {
    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            page_token: None,
        }
    }
}

/// One page of raw documents plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResult {
    pub records: Vec<serde_json::Value>,
    /// `None` once the collection is exhausted.
    pub next_page_token: Option<PageToken>,
}
