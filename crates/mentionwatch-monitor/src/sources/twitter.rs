//! Twitter/X recent-search adapter (API v2, bearer token).
//!
//! Returns an empty vec when no bearer token is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use mentionwatch_core::{Engagement, RawItem, Source, TrackedBrand};
use reqwest::Client;
use serde::Deserialize;

use super::{clean_text, get_json, non_blank, normalize_base_url, parse_timestamp, SourceAdapter};
use crate::error::FetchError;

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";
const MAX_RESULTS: &str = "100";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
}

#[derive(Debug, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    username: Option<String>,
}

pub struct TwitterAdapter {
    client: Client,
    bearer_token: Option<String>,
    base_url: String,
}

impl TwitterAdapter {
    #[must_use]
    pub fn new(client: Client, bearer_token: Option<String>) -> Self {
        Self {
            client,
            bearer_token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a different API host (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        bearer_token: Option<String>,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            bearer_token,
            base_url: normalize_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl SourceAdapter for TwitterAdapter {
    fn source(&self) -> Source {
        Source::Twitter
    }

    async fn fetch(&self, brand: &TrackedBrand) -> Result<Vec<RawItem>, FetchError> {
        let Some(token) = self.bearer_token.as_deref() else {
            tracing::debug!(brand = %brand, "twitter bearer token not configured; skipping");
            return Ok(vec![]);
        };

        let query = format!("\"{}\" -is:retweet lang:en", brand.name());
        let request = self
            .client
            .get(format!("{}/2/tweets/search/recent", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", MAX_RESULTS),
                ("tweet.fields", "created_at,public_metrics,author_id,lang"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ]);

        let body: SearchResponse = get_json(request, "twitter recent search").await?;
        Ok(normalize(body))
    }
}

fn normalize(body: SearchResponse) -> Vec<RawItem> {
    let fetched_at = Utc::now();
    let usernames: HashMap<String, String> = body
        .includes
        .map(|i| i.users)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|u| u.username.map(|name| (u.id, name)))
        .collect();

    body.data
        .into_iter()
        .filter_map(|tweet| {
            let text = clean_text(&tweet.text)?;
            let author = tweet
                .author_id
                .as_deref()
                .and_then(|id| usernames.get(id))
                .and_then(|name| non_blank(Some(name.as_str())))
                .unwrap_or("Unknown")
                .to_string();
            let metrics = tweet.public_metrics;

            Some(RawItem {
                source: Source::Twitter,
                text,
                author_handle: Some(format!("@{author}")),
                url: Some(format!("https://twitter.com/{author}/status/{}", tweet.id)),
                author,
                occurred_at: parse_timestamp(tweet.created_at.as_deref(), fetched_at),
                engagement: Engagement {
                    likes: metrics.like_count,
                    shares: metrics.retweet_count,
                    comments: metrics.reply_count,
                },
                reach: metrics.like_count.saturating_add(metrics.retweet_count),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_joins_authors_and_sums_reach() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "data": [{
                "id": "42",
                "text": "  Tesla service was quick today  ",
                "author_id": "7",
                "created_at": "2026-03-01T10:00:00.000Z",
                "public_metrics": { "like_count": 5, "retweet_count": 2, "reply_count": 1 }
            }],
            "includes": { "users": [{ "id": "7", "username": "driver" }] }
        }))
        .unwrap();

        let items = normalize(body);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.text, "Tesla service was quick today");
        assert_eq!(item.author, "driver");
        assert_eq!(item.author_handle.as_deref(), Some("@driver"));
        assert_eq!(item.reach, 7);
        assert_eq!(item.engagement.comments, 1);
        assert_eq!(
            item.url.as_deref(),
            Some("https://twitter.com/driver/status/42")
        );
    }

    #[test]
    fn normalize_falls_back_to_unknown_author_and_zero_metrics() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "data": [{ "id": "1", "text": "hello tesla" }]
        }))
        .unwrap();

        let items = normalize(body);
        assert_eq!(items[0].author, "Unknown");
        assert_eq!(items[0].engagement, Engagement::default());
        assert_eq!(items[0].reach, 0);
    }

    #[test]
    fn normalize_drops_blank_tweets() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "data": [{ "id": "1", "text": "   " }]
        }))
        .unwrap();
        assert!(normalize(body).is_empty());
    }

    #[test]
    fn empty_response_has_no_data_key() {
        let body: SearchResponse =
            serde_json::from_value(serde_json::json!({ "meta": { "result_count": 0 } })).unwrap();
        assert!(normalize(body).is_empty());
    }
}
