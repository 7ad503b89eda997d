use std::time::Duration;

use mentionwatch_core::ParseEnumError;
use mentionwatch_db::DbError;
use thiserror::Error;

/// Failure fetching from one upstream source. Never fatal to a cycle: the
/// orchestrator logs it and treats the source as empty for that brand.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("rate limited by upstream (HTTP 429)")]
    RateLimited,

    #[error("upstream rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl FetchError {
    /// Whether a later attempt could plausibly succeed.
    ///
    /// Network failures, timeouts, 429 and 5xx are transient. Credential
    /// problems, other 4xx and malformed bodies are not.
    #[must_use]
    pub fn retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Timeout(_) | FetchError::RateLimited => true,
            FetchError::Status(code) => *code >= 500,
            FetchError::Unauthorized(_)
            | FetchError::Decode { .. }
            | FetchError::InvalidBaseUrl(_) => false,
        }
    }
}

/// Failure reading from or writing to the mention store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("stored row is not a valid mention: {0}")]
    Corrupt(#[from] ParseEnumError),
}

/// Failure handing an event to the pub/sub transport. Logged and swallowed
/// by the orchestrator; never undoes persistence.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_matches_status_classes() {
        assert!(FetchError::RateLimited.retryable());
        assert!(FetchError::Status(503).retryable());
        assert!(FetchError::Timeout(Duration::from_secs(10)).retryable());
        assert!(!FetchError::Status(404).retryable());
        assert!(!FetchError::Unauthorized(401).retryable());
    }

    #[test]
    fn decode_errors_are_not_retryable() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FetchError::Decode {
            context: "reddit search",
            source,
        };
        assert!(!err.retryable());
        assert!(err.to_string().contains("reddit search"));
    }
}
