//! Database operations for the `mentions` table.

use chrono::{DateTime, Utc};
use mentionwatch_core::{
    Engagement, EnrichedMention, ParseEnumError, PersistedMention, RawItem, Sentiment,
    TimeWindow, TrackedBrand,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{to_bigint, DbError};

const MENTION_COLUMNS: &str = "id, public_id, brand, source, text, author, author_handle, \
     occurred_at, sentiment, sentiment_score, topic, keywords, likes, shares, comments, \
     reach, url, language, created_at";

/// A row from the `mentions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MentionRow {
    pub id: i64,
    pub public_id: Uuid,
    pub brand: String,
    pub source: String,
    pub text: String,
    pub author: String,
    pub author_handle: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub topic: String,
    pub keywords: Vec<String>,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
    pub reach: i64,
    pub url: Option<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl MentionRow {
    /// Convert the stored row back into the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`ParseEnumError`] if `source`, `sentiment` or `topic` hold a
    /// value the domain enums do not know.
    pub fn into_persisted(self) -> Result<PersistedMention, ParseEnumError> {
        let count = |v: i64| u64::try_from(v).unwrap_or(0);

        Ok(PersistedMention {
            id: self.id,
            public_id: self.public_id,
            created_at: self.created_at,
            mention: EnrichedMention {
                brand: TrackedBrand::new(self.brand),
                item: RawItem {
                    source: self.source.parse()?,
                    text: self.text,
                    author: self.author,
                    author_handle: self.author_handle,
                    occurred_at: self.occurred_at,
                    engagement: Engagement {
                        likes: count(self.likes),
                        shares: count(self.shares),
                        comments: count(self.comments),
                    },
                    reach: count(self.reach),
                    url: self.url,
                },
                sentiment: Sentiment::restore(self.sentiment.parse()?, self.sentiment_score),
                topic: self.topic.parse()?,
                keywords: self.keywords,
            },
        })
    }
}

/// Insert payload borrowed from an enriched mention.
pub struct NewMention<'a> {
    pub mention: &'a EnrichedMention,
}

impl<'a> From<&'a EnrichedMention> for NewMention<'a> {
    fn from(mention: &'a EnrichedMention) -> Self {
        Self { mention }
    }
}

/// Look up a mention by its dedup key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_mention_by_text_author(
    pool: &PgPool,
    text: &str,
    author: &str,
) -> Result<Option<MentionRow>, DbError> {
    let sql = format!("SELECT {MENTION_COLUMNS} FROM mentions WHERE text = $1 AND author = $2");
    let row = sqlx::query_as::<_, MentionRow>(&sql)
        .bind(text)
        .bind(author)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Insert a mention unless one with the same `(text, author)` already exists.
///
/// Returns `None` when the unique constraint rejected the row, which is how
/// a concurrent writer that got there first shows up.
///
/// # Errors
///
/// Returns [`DbError::OutOfRange`] if a counter does not fit in `BIGINT`, or
/// [`DbError::Sqlx`] if the insert fails for any other reason.
pub async fn insert_mention(
    pool: &PgPool,
    new: &NewMention<'_>,
) -> Result<Option<MentionRow>, DbError> {
    let m = new.mention;
    let item = &m.item;

    let likes = to_bigint("likes", item.engagement.likes)?;
    let shares = to_bigint("shares", item.engagement.shares)?;
    let comments = to_bigint("comments", item.engagement.comments)?;
    let reach = to_bigint("reach", item.reach)?;

    let sql = format!(
        "INSERT INTO mentions \
           (public_id, brand, source, text, author, author_handle, occurred_at, \
            sentiment, sentiment_score, topic, keywords, likes, shares, comments, reach, url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         ON CONFLICT (text, author) DO NOTHING \
         RETURNING {MENTION_COLUMNS}"
    );

    let row = sqlx::query_as::<_, MentionRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(m.brand.name())
        .bind(item.source.as_str())
        .bind(&item.text)
        .bind(&item.author)
        .bind(item.author_handle.as_deref())
        .bind(item.occurred_at)
        .bind(m.sentiment.label().as_str())
        .bind(m.sentiment.score())
        .bind(m.topic.as_str())
        .bind(&m.keywords)
        .bind(likes)
        .bind(shares)
        .bind(comments)
        .bind(reach)
        .bind(item.url.as_deref())
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Count mentions of `brand` (case-insensitive) whose `occurred_at` falls in `window`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_mentions_in_window(
    pool: &PgPool,
    brand: &TrackedBrand,
    window: &TimeWindow,
) -> Result<u64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM mentions \
         WHERE lower(brand) = $1 \
           AND occurred_at >= $2 \
           AND (occurred_at < $3 OR ($4 AND occurred_at = $3))",
    )
    .bind(brand.key())
    .bind(window.start)
    .bind(window.end)
    .bind(window.end_inclusive)
    .fetch_one(pool)
    .await?;

    Ok(u64::try_from(count).unwrap_or(0))
}
