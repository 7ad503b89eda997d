use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::mention::SentimentLabel;

pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.2;
pub const DEFAULT_NEGATIVE_THRESHOLD: f64 = -0.2;
pub const DEFAULT_SPIKE_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_SPIKE_FLOOR: u64 = 10;

/// Score cut-offs that map a sentiment score to a label.
///
/// `score > positive` is positive, `score < negative` is negative, anything
/// in between (bounds included) is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentThresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: DEFAULT_POSITIVE_THRESHOLD,
            negative: DEFAULT_NEGATIVE_THRESHOLD,
        }
    }
}

impl SentimentThresholds {
    #[must_use]
    pub fn label(&self, score: f64) -> SentimentLabel {
        if score > self.positive {
            SentimentLabel::Positive
        } else if score < self.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// When does an hour-over-hour rise in mention volume count as a spike.
///
/// The absolute `floor` keeps brands with a near-zero baseline from
/// alerting on every handful of new mentions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikePolicy {
    pub multiplier: f64,
    pub floor: u64,
}

impl Default for SpikePolicy {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_SPIKE_MULTIPLIER,
            floor: DEFAULT_SPIKE_FLOOR,
        }
    }
}

impl SpikePolicy {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_spike(&self, current: u64, previous: u64) -> bool {
        current as f64 >= self.multiplier * previous as f64 && current > self.floor
    }
}

/// A time range `[start, end)` or `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_inclusive: bool,
}

impl TimeWindow {
    /// `[now - 1h, now]`
    #[must_use]
    pub fn current_hour(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::hours(1),
            end: now,
            end_inclusive: true,
        }
    }

    /// `[now - 2h, now - 1h)`
    #[must_use]
    pub fn previous_hour(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::hours(2),
            end: now - Duration::hours(1),
            end_inclusive: false,
        }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && (at < self.end || (self.end_inclusive && at == self.end))
    }
}
