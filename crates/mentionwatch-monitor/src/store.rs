//! Persistence seam for the pipeline.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use mentionwatch_core::{Alert, EnrichedMention, PersistedMention, TimeWindow, TrackedBrand};
use mentionwatch_db::{NewAlert, NewMention};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

/// Result of an insert against the `(text, author)` uniqueness rule.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(PersistedMention),
    /// Another writer already stored this `(text, author)` pair.
    Conflict,
}

#[async_trait]
pub trait MentionStore: Send + Sync {
    async fn find(&self, text: &str, author: &str) -> Result<Option<PersistedMention>, StoreError>;

    async fn insert(&self, mention: &EnrichedMention) -> Result<InsertOutcome, StoreError>;

    /// Mentions of `brand` (case-insensitive) with `occurred_at` inside `window`.
    async fn count_in_window(
        &self,
        brand: &TrackedBrand,
        window: &TimeWindow,
    ) -> Result<u64, StoreError>;

    async fn record_alert(&self, alert: &Alert) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

pub struct PgMentionStore {
    pool: PgPool,
}

impl PgMentionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MentionStore for PgMentionStore {
    async fn find(&self, text: &str, author: &str) -> Result<Option<PersistedMention>, StoreError> {
        let row = mentionwatch_db::find_mention_by_text_author(&self.pool, text, author).await?;
        Ok(row.map(mentionwatch_db::MentionRow::into_persisted).transpose()?)
    }

    async fn insert(&self, mention: &EnrichedMention) -> Result<InsertOutcome, StoreError> {
        let row = mentionwatch_db::insert_mention(&self.pool, &NewMention::from(mention)).await?;
        match row {
            Some(row) => Ok(InsertOutcome::Inserted(row.into_persisted()?)),
            None => Ok(InsertOutcome::Conflict),
        }
    }

    async fn count_in_window(
        &self,
        brand: &TrackedBrand,
        window: &TimeWindow,
    ) -> Result<u64, StoreError> {
        Ok(mentionwatch_db::count_mentions_in_window(&self.pool, brand, window).await?)
    }

    async fn record_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        mentionwatch_db::insert_alert(&self.pool, &NewAlert::from(alert)).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    mentions: Vec<PersistedMention>,
    alerts: Vec<Alert>,
}

/// Process-local store with the same uniqueness rule as Postgres. Used for
/// dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a mention directly, bypassing the gate.
    pub fn seed(&self, mention: EnrichedMention) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let persisted = persist(&state, mention);
        state.mentions.push(persisted);
    }

    #[must_use]
    pub fn mentions(&self) -> Vec<PersistedMention> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mentions
            .clone()
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .alerts
            .clone()
    }
}

fn persist(state: &MemoryState, mention: EnrichedMention) -> PersistedMention {
    let id = i64::try_from(state.mentions.len()).map_or(i64::MAX, |n| n + 1);
    PersistedMention {
        id,
        public_id: Uuid::new_v4(),
        created_at: Utc::now(),
        mention,
    }
}

#[async_trait]
impl MentionStore for MemoryStore {
    async fn find(&self, text: &str, author: &str) -> Result<Option<PersistedMention>, StoreError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .mentions
            .iter()
            .find(|m| m.mention.dedup_key() == (text, author))
            .cloned())
    }

    async fn insert(&self, mention: &EnrichedMention) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state
            .mentions
            .iter()
            .any(|m| m.mention.dedup_key() == mention.dedup_key())
        {
            return Ok(InsertOutcome::Conflict);
        }
        let persisted = persist(&state, mention.clone());
        state.mentions.push(persisted.clone());
        Ok(InsertOutcome::Inserted(persisted))
    }

    async fn count_in_window(
        &self,
        brand: &TrackedBrand,
        window: &TimeWindow,
    ) -> Result<u64, StoreError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let count = state
            .mentions
            .iter()
            .filter(|m| m.mention.brand == *brand && window.contains(m.mention.item.occurred_at))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn record_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .alerts
            .push(alert.clone());
        Ok(())
    }
}
