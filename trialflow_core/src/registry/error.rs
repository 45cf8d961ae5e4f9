use std::time::Duration;
use thiserror::Error;

/// Upper bound on the response body carried inside `HttpStatus`.
pub const BODY_EXCERPT_MAX_CHARS: usize = 200;

/// Why a single page could not be fetched.
///
/// One type for every transport-level failure so callers match on the reason
/// instead of on error sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryFetchError {
    #[error("request timed out after {}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    #[error("failed to connect to {endpoint}: {message}")]
    ConnectionFailure { endpoint: String, message: String },

    #[error("registry returned status {status}: {body_excerpt}")]
    HttpStatus { status: u16, body_excerpt: String },

    #[error("invalid registry response: {0}")]
    InvalidResponse(String),

    #[error("invalid registry request: {0}")]
    InvalidRequest(String),
}

impl RegistryFetchError {
    /// Build an `HttpStatus` error, truncating `body` to the excerpt limit.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self::HttpStatus {
            status,
            body_excerpt: truncate_excerpt(body),
        }
    }

    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailure {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

/// First `BODY_EXCERPT_MAX_CHARS` characters of `body` (never splits a char).
pub fn truncate_excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_MAX_CHARS) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_is_bounded() {
        let body = "x".repeat(1_000);
        let RegistryFetchError::HttpStatus { body_excerpt, .. } =
            RegistryFetchError::http_status(500, &body)
        else {
            panic!("expected HttpStatus");
        };
        assert_eq!(body_excerpt.len(), BODY_EXCERPT_MAX_CHARS);
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let body = "é".repeat(300);
        let excerpt = truncate_excerpt(&body);
        assert_eq!(excerpt.chars().count(), BODY_EXCERPT_MAX_CHARS);
    }

    #[test]
    fn short_bodies_are_kept_whole() {
        assert_eq!(truncate_excerpt("Internal Server Error"), "Internal Server Error");
    }

    #[test]
    fn messages_name_the_reason() {
        let timeout = RegistryFetchError::Timeout {
            after: Duration::from_secs(30),
        };
        assert!(timeout.to_string().contains("timed out after 30s"));

        let status = RegistryFetchError::http_status(503, "busy");
        assert!(status.to_string().contains("503"));
    }
}
