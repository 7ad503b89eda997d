use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::policy::{SentimentThresholds, SpikePolicy};

/// A brand under observation.
///
/// Names compare case-insensitively: `Tesla`, `tesla` and `TESLA` are the
/// same brand. The configured spelling is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedBrand(String);

impl TrackedBrand {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Lower-cased name used for lookups and topic naming.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Pub/sub topic for this brand, e.g. `brand_tesla`.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("brand_{}", self.key())
    }
}

impl PartialEq for TrackedBrand {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TrackedBrand {}

impl Hash for TrackedBrand {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for TrackedBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returned when a stored string does not name a known enum variant.
#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Content source a mention was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Twitter,
    Reddit,
    News,
}

impl Source {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Twitter => "Twitter",
            Source::Reddit => "Reddit",
            Source::News => "News",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Twitter" => Ok(Source::Twitter),
            "Reddit" => Ok(Source::Reddit),
            "News" => Ok(Source::News),
            other => Err(ParseEnumError {
                kind: "source",
                value: other.to_string(),
            }),
        }
    }
}

/// Engagement counters. Sources that do not report a counter leave it at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

/// A normalized item produced by a source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub source: Source,
    pub text: String,
    pub author: String,
    pub author_handle: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub engagement: Engagement,
    /// Estimated audience size; meaning varies per source.
    pub reach: u64,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(ParseEnumError {
                kind: "sentiment label",
                value: other.to_string(),
            }),
        }
    }
}

/// Sentiment score plus the label derived from it.
///
/// Only constructible through [`Sentiment::from_score`], so the label always
/// agrees with the thresholds it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    label: SentimentLabel,
    score: f64,
}

impl Sentiment {
    #[must_use]
    pub fn from_score(score: f64, thresholds: &SentimentThresholds) -> Self {
        Self {
            label: thresholds.label(score),
            score,
        }
    }

    /// Rebuild a sentiment read back from storage, keeping the label it was
    /// stored with even if thresholds have since changed.
    #[must_use]
    pub fn restore(label: SentimentLabel, score: f64) -> Self {
        Self { label, score }
    }

    #[must_use]
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }

    #[must_use]
    pub fn label(&self) -> SentimentLabel {
        self.label
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Product,
    #[serde(rename = "Customer Service")]
    CustomerService,
    Pricing,
    Innovation,
    Competition,
    General,
}

impl Topic {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Product => "Product",
            Topic::CustomerService => "Customer Service",
            Topic::Pricing => "Pricing",
            Topic::Innovation => "Innovation",
            Topic::Competition => "Competition",
            Topic::General => "General",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Product" => Ok(Topic::Product),
            "Customer Service" => Ok(Topic::CustomerService),
            "Pricing" => Ok(Topic::Pricing),
            "Innovation" => Ok(Topic::Innovation),
            "Competition" => Ok(Topic::Competition),
            "General" => Ok(Topic::General),
            other => Err(ParseEnumError {
                kind: "topic",
                value: other.to_string(),
            }),
        }
    }
}

/// A raw item plus the metadata produced by enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMention {
    pub brand: TrackedBrand,
    #[serde(flatten)]
    pub item: RawItem,
    pub sentiment: Sentiment,
    pub topic: Topic,
    /// At most ten tokens, in first-occurrence order.
    pub keywords: Vec<String>,
}

impl EnrichedMention {
    /// The `(text, author)` pair storage uses to reject duplicates.
    #[must_use]
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.item.text, &self.item.author)
    }
}

/// An enriched mention that the store has accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedMention {
    pub id: i64,
    pub public_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub mention: EnrichedMention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Spike,
}

impl AlertKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Spike => "spike",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub brand: TrackedBrand,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub triggered_at: DateTime<Utc>,
}

impl Alert {
    /// Build a volume-spike alert from the window counts that triggered it.
    #[must_use]
    pub fn spike(stat: &SpikeWindowStat, triggered_at: DateTime<Utc>) -> Self {
        Self {
            brand: stat.brand.clone(),
            kind: AlertKind::Spike,
            severity: Severity::Medium,
            message: format!(
                "Unusual spike in mentions detected for {}: {} in the last hour vs {} in the hour before",
                stat.brand, stat.current_hour_count, stat.previous_hour_count
            ),
            triggered_at,
        }
    }
}

/// Mention counts for two consecutive one-hour windows. Derived on demand,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpikeWindowStat {
    pub brand: TrackedBrand,
    pub current_hour_count: u64,
    pub previous_hour_count: u64,
}

impl SpikeWindowStat {
    #[must_use]
    pub fn is_spike(&self, policy: &SpikePolicy) -> bool {
        policy.is_spike(self.current_hour_count, self.previous_hour_count)
    }
}
