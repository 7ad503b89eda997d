//! Brand-scoped event fan-out.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use mentionwatch_core::{Alert, PersistedMention, TrackedBrand};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::PublishError;

/// Default per-topic buffer; slow subscribers past this lag and skip events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BrandEvent {
    NewMention(PersistedMention),
    SpikeDetected(Alert),
}

impl BrandEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BrandEvent::NewMention(_) => "new_mention",
            BrandEvent::SpikeDetected(_) => "spike_detected",
        }
    }
}

/// Fire-and-forget delivery to the brand's topic. A topic with no
/// subscribers is not an error.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, brand: &TrackedBrand, event: BrandEvent) -> Result<(), PublishError>;

    async fn publish_mention(
        &self,
        brand: &TrackedBrand,
        mention: PersistedMention,
    ) -> Result<(), PublishError> {
        self.publish(brand, BrandEvent::NewMention(mention)).await
    }

    async fn publish_alert(&self, brand: &TrackedBrand, alert: Alert) -> Result<(), PublishError> {
        self.publish(brand, BrandEvent::SpikeDetected(alert)).await
    }
}

// ---------------------------------------------------------------------------
// In-process broadcast
// ---------------------------------------------------------------------------

/// One bounded broadcast channel per brand topic, created on first use.
pub struct BroadcastPublisher {
    capacity: usize,
    topics: RwLock<HashMap<String, broadcast::Sender<Arc<BrandEvent>>>>,
}

impl BroadcastPublisher {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to every event published for `brand` from now on.
    #[must_use]
    pub fn subscribe(&self, brand: &TrackedBrand) -> broadcast::Receiver<Arc<BrandEvent>> {
        let topic = brand.topic();
        if let Some(sender) = self
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&topic)
        {
            return sender.subscribe();
        }

        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Live subscribers on `brand`'s topic.
    #[must_use]
    pub fn subscriber_count(&self, brand: &TrackedBrand) -> usize {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&brand.topic())
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, brand: &TrackedBrand, event: BrandEvent) -> Result<(), PublishError> {
        let topic = brand.topic();
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = topics.get(&topic) else {
            tracing::trace!(topic = %topic, event = event.name(), "no subscribers; event dropped");
            return Ok(());
        };

        // `send` only fails when every receiver is gone.
        if sender.send(Arc::new(event)).is_err() {
            tracing::trace!(topic = %topic, "all subscribers left; event dropped");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Log-only
// ---------------------------------------------------------------------------

/// Writes each event to the log as JSON. Used by one-off CLI runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, brand: &TrackedBrand, event: BrandEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(topic = %brand.topic(), event = event.name(), %payload, "event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mentionwatch_core::SpikeWindowStat;

    use super::*;

    fn alert(brand: &str) -> Alert {
        Alert::spike(
            &SpikeWindowStat {
                brand: TrackedBrand::new(brand),
                current_hour_count: 22,
                previous_hour_count: 3,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let publisher = BroadcastPublisher::default();
        let brand = TrackedBrand::new("Tesla");
        publisher.publish_alert(&brand, alert("Tesla")).await.unwrap();
        assert_eq!(publisher.subscriber_count(&brand), 0);
    }

    #[tokio::test]
    async fn subscribers_only_see_their_brand() {
        let publisher = BroadcastPublisher::default();
        let tesla = TrackedBrand::new("Tesla");
        let apple = TrackedBrand::new("Apple");
        let mut tesla_rx = publisher.subscribe(&TrackedBrand::new("TESLA"));
        let mut apple_rx = publisher.subscribe(&apple);

        publisher.publish_alert(&tesla, alert("Tesla")).await.unwrap();

        let event = tesla_rx.try_recv().expect("tesla subscriber gets the alert");
        assert_eq!(event.name(), "spike_detected");
        assert!(apple_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_after_subscriber_dropped_succeeds() {
        let publisher = BroadcastPublisher::default();
        let brand = TrackedBrand::new("Tesla");
        drop(publisher.subscribe(&brand));
        publisher.publish_alert(&brand, alert("Tesla")).await.unwrap();
    }

    #[test]
    fn events_serialize_with_tag_and_payload() {
        let json = serde_json::to_value(BrandEvent::SpikeDetected(alert("Apple"))).unwrap();
        assert_eq!(json["event"], "spike_detected");
        assert_eq!(json["data"]["kind"], "spike");
        assert_eq!(json["data"]["brand"], "Apple");
    }

    #[tokio::test]
    async fn log_publisher_accepts_events() {
        LogPublisher
            .publish_alert(&TrackedBrand::new("Apple"), alert("Apple"))
            .await
            .unwrap();
    }
}
