//! Reddit search adapter (public, unauthenticated JSON listing).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentionwatch_core::{Engagement, RawItem, Source, TrackedBrand};
use reqwest::Client;
use serde::Deserialize;

use super::{
    clean_text, get_json, join_text, non_blank, normalize_base_url, SourceAdapter,
};
use crate::error::FetchError;

const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
const PAGE_LIMIT: &str = "50";

/// Reddit search listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    selftext: Option<String>,
    author: Option<String>,
    created_utc: Option<f64>,
    #[serde(default)]
    ups: i64,
    #[serde(default)]
    num_comments: u64,
    permalink: Option<String>,
}

pub struct RedditAdapter {
    client: Client,
    base_url: String,
}

impl RedditAdapter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a different host (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(client: Client, base_url: &str) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn source(&self) -> Source {
        Source::Reddit
    }

    async fn fetch(&self, brand: &TrackedBrand) -> Result<Vec<RawItem>, FetchError> {
        let request = self
            .client
            .get(format!("{}/r/all/search.json", self.base_url))
            .query(&[
                ("q", brand.name()),
                ("limit", PAGE_LIMIT),
                ("sort", "new"),
                ("t", "week"),
            ]);

        let listing: Listing = get_json(request, "reddit search").await?;
        Ok(normalize(listing))
    }
}

fn normalize(listing: Listing) -> Vec<RawItem> {
    let fetched_at = Utc::now();

    listing
        .data
        .children
        .into_iter()
        .filter_map(|post| {
            let data = post.data;
            let text = clean_text(&join_text(
                data.title.as_deref(),
                data.selftext.as_deref(),
            ))?;
            let author = non_blank(data.author.as_deref())
                .unwrap_or("deleted")
                .to_string();
            let ups = u64::try_from(data.ups).unwrap_or(0);

            Some(RawItem {
                source: Source::Reddit,
                text,
                author_handle: Some(format!("u/{author}")),
                author,
                occurred_at: data
                    .created_utc
                    .and_then(epoch_seconds)
                    .unwrap_or(fetched_at),
                engagement: Engagement {
                    likes: ups,
                    shares: ups / 10,
                    comments: data.num_comments,
                },
                reach: ups.saturating_add(data.num_comments),
                url: data
                    .permalink
                    .map(|p| format!("https://reddit.com{p}")),
            })
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(children: serde_json::Value) -> Listing {
        serde_json::from_value(serde_json::json!({ "data": { "children": children } })).unwrap()
    }

    #[test]
    fn normalize_derives_shares_and_reach_from_ups() {
        let items = normalize(listing(serde_json::json!([{
            "data": {
                "title": "Apple pricing",
                "selftext": "is getting expensive",
                "author": "fruitfan",
                "created_utc": 1_772_000_000.0,
                "ups": 57,
                "num_comments": 9,
                "permalink": "/r/apple/comments/abc/apple_pricing/"
            }
        }])));

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.text, "Apple pricing is getting expensive");
        assert_eq!(item.author_handle.as_deref(), Some("u/fruitfan"));
        assert_eq!(item.engagement.likes, 57);
        assert_eq!(item.engagement.shares, 5);
        assert_eq!(item.reach, 66);
        assert_eq!(item.occurred_at.timestamp(), 1_772_000_000);
        assert_eq!(
            item.url.as_deref(),
            Some("https://reddit.com/r/apple/comments/abc/apple_pricing/")
        );
    }

    #[test]
    fn normalize_defaults_missing_author_to_deleted() {
        let items = normalize(listing(serde_json::json!([
            { "data": { "title": "Google maps", "author": null } }
        ])));
        assert_eq!(items[0].author, "deleted");
        assert_eq!(items[0].reach, 0);
    }

    #[test]
    fn normalize_drops_posts_without_text() {
        let items = normalize(listing(serde_json::json!([
            { "data": { "title": "", "selftext": "  " } }
        ])));
        assert!(items.is_empty());
    }

    #[test]
    fn negative_score_counts_as_zero() {
        let items = normalize(listing(serde_json::json!([
            { "data": { "title": "downvoted", "ups": -4, "num_comments": 2 } }
        ])));
        assert_eq!(items[0].engagement.likes, 0);
        assert_eq!(items[0].reach, 2);
    }
}
