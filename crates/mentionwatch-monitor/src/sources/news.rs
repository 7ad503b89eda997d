//! `NewsAPI` `/v2/everything` adapter. Requires an API key; returns an empty
//! vec when none is configured.

use async_trait::async_trait;
use chrono::Utc;
use mentionwatch_core::{Engagement, RawItem, Source, TrackedBrand};
use reqwest::Client;
use serde::Deserialize;

use super::{
    clean_text, get_json, join_text, non_blank, normalize_base_url, parse_timestamp,
    SourceAdapter,
};
use crate::error::FetchError;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const PAGE_SIZE: &str = "50";
/// News articles carry no engagement data; assume a fixed audience.
const ARTICLE_REACH: u64 = 5000;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    source: Option<ArticleSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

pub struct NewsAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsAdapter {
    #[must_use]
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at a different host (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        api_key: Option<String>,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            api_key,
            base_url: normalize_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl SourceAdapter for NewsAdapter {
    fn source(&self) -> Source {
        Source::News
    }

    async fn fetch(&self, brand: &TrackedBrand) -> Result<Vec<RawItem>, FetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(brand = %brand, "news api key not configured; skipping");
            return Ok(vec![]);
        };

        let request = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .header("X-Api-Key", api_key)
            .query(&[
                ("q", brand.name()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", PAGE_SIZE),
            ]);

        let body: EverythingResponse = get_json(request, "news everything").await?;
        Ok(normalize(body))
    }
}

fn normalize(body: EverythingResponse) -> Vec<RawItem> {
    let fetched_at = Utc::now();

    body.articles
        .into_iter()
        .filter_map(|article| {
            let text = clean_text(&join_text(
                article.title.as_deref(),
                article.description.as_deref(),
            ))?;
            let source_name = non_blank(
                article
                    .source
                    .as_ref()
                    .and_then(|s| s.name.as_deref()),
            );
            let author = non_blank(article.author.as_deref())
                .or(source_name)
                .unwrap_or("Unknown")
                .to_string();

            Some(RawItem {
                source: Source::News,
                text,
                author,
                author_handle: Some(source_name.unwrap_or("News Source").to_string()),
                occurred_at: parse_timestamp(article.published_at.as_deref(), fetched_at),
                engagement: Engagement::default(),
                reach: ARTICLE_REACH,
                url: article.url,
            })
        })
        .collect()
}
