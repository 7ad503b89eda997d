//! Source adapters: fetch raw items for a brand from one upstream and
//! normalize them into [`RawItem`]s.

mod news;
mod reddit;
mod twitter;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionwatch_core::{AppConfig, RawItem, Source, TrackedBrand};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::FetchError;

pub use news::NewsAdapter;
pub use reddit::RedditAdapter;
pub use twitter::TwitterAdapter;

/// Longest text kept for a single mention, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

/// One upstream content source.
///
/// "No results" is an empty vector, never an error. Implementations perform
/// no writes.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    async fn fetch(&self, brand: &TrackedBrand) -> Result<Vec<RawItem>, FetchError>;
}

/// Build the shared HTTP client every adapter uses.
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the client cannot be constructed.
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client, FetchError> {
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Build the enabled adapters in their fixed order: Twitter, Reddit, News.
///
/// # Errors
///
/// Returns [`FetchError`] if the HTTP client cannot be constructed.
pub fn build_adapters(config: &AppConfig) -> Result<Vec<Arc<dyn SourceAdapter>>, FetchError> {
    let client = build_http_client(
        Duration::from_secs(config.source_timeout_secs),
        &config.user_agent,
    )?;

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    if config.sources.twitter {
        adapters.push(Arc::new(TwitterAdapter::new(
            client.clone(),
            config.twitter_bearer_token.clone(),
        )));
    }
    if config.sources.reddit {
        adapters.push(Arc::new(RedditAdapter::new(client.clone())));
    }
    if config.sources.news {
        adapters.push(Arc::new(NewsAdapter::new(
            client,
            config.news_api_key.clone(),
        )));
    }

    Ok(adapters)
}

/// Map a non-success HTTP status onto the fetch error taxonomy.
pub(crate) fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        429 => Err(FetchError::RateLimited),
        code @ (401 | 403) => Err(FetchError::Unauthorized(code)),
        code => Err(FetchError::Status(code)),
    }
}

/// Send `request`, check the status and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &'static str,
) -> Result<T, FetchError> {
    let response = request.send().await?;
    check_status(response.status())?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode { context, source })
}

/// Validate and normalize an adapter base URL (no trailing slash).
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, FetchError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed).map_err(|_| FetchError::InvalidBaseUrl(base_url.to_string()))?;
    Ok(trimmed.to_string())
}

/// Trim and cap mention text. Returns `None` when nothing is left.
pub(crate) fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let capped: String = trimmed.chars().take(MAX_TEXT_CHARS).collect();
    Some(capped.trim_end().to_string())
}

/// Join an optional headline and body with a single space.
pub(crate) fn join_text(head: Option<&str>, body: Option<&str>) -> String {
    format!("{} {}", head.unwrap_or_default(), body.unwrap_or_default())
}

/// Parse an RFC 3339 timestamp, falling back to `fallback` when absent or malformed.
pub(crate) fn parse_timestamp(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or(fallback, |dt| dt.with_timezone(&Utc))
}

/// Treat empty or whitespace-only strings as missing.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_status_classifies_failures() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(FetchError::RateLimited)
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN),
            Err(FetchError::Unauthorized(403))
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY),
            Err(FetchError::Status(502))
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND),
            Err(FetchError::Status(404))
        ));
    }

    #[test]
    fn clean_text_trims_caps_and_drops_empty() {
        assert_eq!(clean_text("  hello  ").as_deref(), Some("hello"));
        assert!(clean_text("   \n ").is_none());

        let long = "é".repeat(MAX_TEXT_CHARS + 20);
        let cleaned = clean_text(&long).unwrap();
        assert_eq!(cleaned.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn parse_timestamp_falls_back_on_garbage() {
        let fallback = Utc::now();
        assert_eq!(parse_timestamp(Some("yesterday"), fallback), fallback);
        assert_eq!(parse_timestamp(None, fallback), fallback);

        let parsed = parse_timestamp(Some("2026-03-01T12:00:00Z"), fallback);
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T12:00:00+00:00");
    }

    #[test]
    fn normalize_base_url_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8080/").unwrap(),
            "http://127.0.0.1:8080"
        );
        assert!(normalize_base_url("not a url").is_err());
    }
}
