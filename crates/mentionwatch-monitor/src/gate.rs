use std::sync::Arc;

use mentionwatch_core::{EnrichedMention, PersistedMention};

use crate::error::StoreError;
use crate::store::{InsertOutcome, MentionStore};

/// Outcome of offering a candidate to the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Admitted(PersistedMention),
    Duplicate,
}

/// Decides whether an enriched mention is new and, if so, commits it.
#[derive(Clone)]
pub struct DedupGate {
    store: Arc<dyn MentionStore>,
}

impl DedupGate {
    #[must_use]
    pub fn new(store: Arc<dyn MentionStore>) -> Self {
        Self { store }
    }

    /// Look the candidate up by `(text, author)` and insert it if absent.
    ///
    /// A concurrent writer winning the insert race is reported as
    /// [`Admission::Duplicate`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup or insert fails.
    pub async fn admit(&self, candidate: EnrichedMention) -> Result<Admission, StoreError> {
        let (text, author) = candidate.dedup_key();
        if self.store.find(text, author).await?.is_some() {
            return Ok(Admission::Duplicate);
        }

        match self.store.insert(&candidate).await? {
            InsertOutcome::Inserted(persisted) => Ok(Admission::Admitted(persisted)),
            InsertOutcome::Conflict => Ok(Admission::Duplicate),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use mentionwatch_core::{
        Alert, Engagement, RawItem, Sentiment, Source, TimeWindow, Topic, TrackedBrand,
    };

    use super::*;
    use crate::store::MemoryStore;

    fn candidate(text: &str, author: &str) -> EnrichedMention {
        EnrichedMention {
            brand: TrackedBrand::new("Tesla"),
            item: RawItem {
                source: Source::Twitter,
                text: text.to_string(),
                author: author.to_string(),
                author_handle: None,
                occurred_at: Utc::now(),
                engagement: Engagement::default(),
                reach: 0,
                url: None,
            },
            sentiment: Sentiment::neutral(),
            topic: Topic::General,
            keywords: vec![],
        }
    }

    /// Store whose lookup never sees anything, so every admit reaches insert.
    struct BlindStore(MemoryStore);

    #[async_trait]
    impl MentionStore for BlindStore {
        async fn find(
            &self,
            _text: &str,
            _author: &str,
        ) -> Result<Option<PersistedMention>, StoreError> {
            Ok(None)
        }

        async fn insert(&self, mention: &EnrichedMention) -> Result<InsertOutcome, StoreError> {
            self.0.insert(mention).await
        }

        async fn count_in_window(
            &self,
            brand: &TrackedBrand,
            window: &TimeWindow,
        ) -> Result<u64, StoreError> {
            self.0.count_in_window(brand, window).await
        }

        async fn record_alert(&self, alert: &Alert) -> Result<(), StoreError> {
            self.0.record_alert(alert).await
        }
    }

    #[tokio::test]
    async fn first_admit_persists_second_is_duplicate() {
        let store = Arc::new(MemoryStore::new());
        let gate = DedupGate::new(store.clone());

        let first = gate.admit(candidate("hello tesla", "u1")).await.unwrap();
        let second = gate.admit(candidate("hello tesla", "u1")).await.unwrap();

        assert!(matches!(first, Admission::Admitted(_)));
        assert_eq!(second, Admission::Duplicate);
        assert_eq!(store.mentions().len(), 1);
    }

    #[tokio::test]
    async fn same_text_by_other_author_is_admitted() {
        let gate = DedupGate::new(Arc::new(MemoryStore::new()));
        gate.admit(candidate("hello tesla", "u1")).await.unwrap();
        let other = gate.admit(candidate("hello tesla", "u2")).await.unwrap();
        assert!(matches!(other, Admission::Admitted(_)));
    }

    #[tokio::test]
    async fn lost_insert_race_maps_to_duplicate() {
        let gate = DedupGate::new(Arc::new(BlindStore(MemoryStore::new())));
        gate.admit(candidate("race", "u1")).await.unwrap();
        let loser = gate.admit(candidate("race", "u1")).await.unwrap();
        assert_eq!(loser, Admission::Duplicate);
    }
}
