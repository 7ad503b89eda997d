use std::sync::Arc;

use chrono::{DateTime, Utc};
use mentionwatch_core::{SpikePolicy, SpikeWindowStat, TimeWindow, TrackedBrand};

use crate::error::StoreError;
use crate::store::MentionStore;

/// Compares the last hour of mention volume against the hour before it.
/// Stateless; reads persisted mentions only.
#[derive(Clone)]
pub struct SpikeDetector {
    store: Arc<dyn MentionStore>,
    policy: SpikePolicy,
}

impl SpikeDetector {
    #[must_use]
    pub fn new(store: Arc<dyn MentionStore>, policy: SpikePolicy) -> Self {
        Self { store, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &SpikePolicy {
        &self.policy
    }

    /// Mention counts for `[now-1h, now]` and `[now-2h, now-1h)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either count fails.
    pub async fn window_stat(
        &self,
        brand: &TrackedBrand,
        now: DateTime<Utc>,
    ) -> Result<SpikeWindowStat, StoreError> {
        let current_hour_count = self
            .store
            .count_in_window(brand, &TimeWindow::current_hour(now))
            .await?;
        let previous_hour_count = self
            .store
            .count_in_window(brand, &TimeWindow::previous_hour(now))
            .await?;

        Ok(SpikeWindowStat {
            brand: brand.clone(),
            current_hour_count,
            previous_hour_count,
        })
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the window counts cannot be read.
    pub async fn check_spike(&self, brand: &TrackedBrand) -> Result<bool, StoreError> {
        let stat = self.window_stat(brand, Utc::now()).await?;
        Ok(stat.is_spike(&self.policy))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mentionwatch_core::{
        EnrichedMention, Engagement, RawItem, Sentiment, Source, Topic,
    };

    use super::*;
    use crate::store::MemoryStore;

    fn seed(store: &MemoryStore, brand: &str, count: usize, at: DateTime<Utc>) {
        for i in 0..count {
            store.seed(EnrichedMention {
                brand: TrackedBrand::new(brand),
                item: RawItem {
                    source: Source::News,
                    text: format!("{brand} mention {i} at {at}"),
                    author: "desk".to_string(),
                    author_handle: None,
                    occurred_at: at,
                    engagement: Engagement::default(),
                    reach: 0,
                    url: None,
                },
                sentiment: Sentiment::neutral(),
                topic: Topic::General,
                keywords: vec![],
            });
        }
    }

    async fn verdict(previous: usize, current: usize) -> bool {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        seed(&store, "Tesla", previous, now - Duration::minutes(90));
        seed(&store, "Tesla", current, now - Duration::minutes(10));

        let detector = SpikeDetector::new(store, SpikePolicy::default());
        let stat = detector
            .window_stat(&TrackedBrand::new("tesla"), now)
            .await
            .unwrap();
        assert_eq!(stat.current_hour_count, current as u64);
        assert_eq!(stat.previous_hour_count, previous as u64);
        stat.is_spike(detector.policy())
    }

    #[tokio::test]
    async fn eleven_after_six_is_not_a_spike() {
        assert!(!verdict(6, 11).await);
    }

    #[tokio::test]
    async fn eleven_after_five_is_a_spike() {
        assert!(verdict(5, 11).await);
    }

    #[tokio::test]
    async fn quiet_brand_never_spikes() {
        assert!(!verdict(0, 10).await);
    }

    #[tokio::test]
    async fn other_brands_do_not_count() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        seed(&store, "Apple", 30, now - Duration::minutes(5));

        let detector = SpikeDetector::new(store, SpikePolicy::default());
        assert!(!detector
            .check_spike(&TrackedBrand::new("Tesla"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn mentions_older_than_two_hours_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        seed(&store, "Tesla", 40, now - Duration::hours(3));

        let detector = SpikeDetector::new(store, SpikePolicy::default());
        let stat = detector
            .window_stat(&TrackedBrand::new("Tesla"), now)
            .await
            .unwrap();
        assert_eq!(stat.current_hour_count, 0);
        assert_eq!(stat.previous_hour_count, 0);
    }
}
