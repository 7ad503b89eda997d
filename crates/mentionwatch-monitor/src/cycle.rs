//! One monitoring cycle: fetch, enrich, admit, publish, spike-check.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use mentionwatch_core::{Alert, AppConfig, RawItem, Source, SpikePolicy, TrackedBrand};
use serde::Serialize;

use crate::enrich::{EnrichmentConfig, Enricher, Scorer};
use crate::error::FetchError;
use crate::gate::{Admission, DedupGate};
use crate::publish::EventPublisher;
use crate::sources::SourceAdapter;
use crate::spike::SpikeDetector;
use crate::store::MentionStore;

/// Tunables for [`Monitor`].
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub enrichment: EnrichmentConfig,
    pub spike_policy: SpikePolicy,
    pub fetch_timeout: Duration,
    pub max_concurrent_brands: usize,
}

impl MonitorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            enrichment: EnrichmentConfig {
                thresholds: config.sentiment_thresholds,
                ..EnrichmentConfig::default()
            },
            spike_policy: config.spike_policy,
            fetch_timeout: Duration::from_secs(config.source_timeout_secs),
            max_concurrent_brands: config.max_concurrent_brands,
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            enrichment: EnrichmentConfig::default(),
            spike_policy: SpikePolicy::default(),
            fetch_timeout: Duration::from_secs(10),
            max_concurrent_brands: 4,
        }
    }
}

/// Per-brand outcome of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandReport {
    pub brand: String,
    pub fetched: usize,
    pub admitted: usize,
    pub duplicates: usize,
    pub failed_items: usize,
    pub failed_sources: Vec<Source>,
    pub spike: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// In the order the brands were given.
    pub brands: Vec<BrandReport>,
}

impl CycleReport {
    #[must_use]
    pub fn admitted(&self) -> usize {
        self.brands.iter().map(|b| b.admitted).sum()
    }

    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.brands.iter().map(|b| b.duplicates).sum()
    }

    #[must_use]
    pub fn spikes(&self) -> usize {
        self.brands.iter().filter(|b| b.spike).count()
    }

    #[must_use]
    pub fn failed_items(&self) -> usize {
        self.brands.iter().map(|b| b.failed_items).sum()
    }
}

/// Drives monitoring cycles over a fixed set of adapters and collaborators.
pub struct Monitor {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    enricher: Enricher,
    gate: DedupGate,
    spike: SpikeDetector,
    store: Arc<dyn MentionStore>,
    publisher: Arc<dyn EventPublisher>,
    fetch_timeout: Duration,
    max_concurrent_brands: usize,
}

impl Monitor {
    /// Monitor with the bundled lexicon scorer.
    #[must_use]
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn MentionStore>,
        publisher: Arc<dyn EventPublisher>,
        settings: MonitorSettings,
    ) -> Self {
        let enricher = Enricher::with_lexicon(settings.enrichment.clone());
        Self::with_enricher(adapters, store, publisher, settings, enricher)
    }

    #[must_use]
    pub fn with_scorer(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn MentionStore>,
        publisher: Arc<dyn EventPublisher>,
        settings: MonitorSettings,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        let enricher = Enricher::new(settings.enrichment.clone(), scorer);
        Self::with_enricher(adapters, store, publisher, settings, enricher)
    }

    fn with_enricher(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn MentionStore>,
        publisher: Arc<dyn EventPublisher>,
        settings: MonitorSettings,
        enricher: Enricher,
    ) -> Self {
        Self {
            adapters,
            enricher,
            gate: DedupGate::new(Arc::clone(&store)),
            spike: SpikeDetector::new(Arc::clone(&store), settings.spike_policy),
            store,
            publisher,
            fetch_timeout: settings.fetch_timeout,
            max_concurrent_brands: settings.max_concurrent_brands.max(1),
        }
    }

    #[must_use]
    pub fn spike_detector(&self) -> &SpikeDetector {
        &self.spike
    }

    /// Run one cycle over `brands`. Never fails: every error is contained
    /// at the item, source or brand that produced it.
    pub async fn run_cycle(&self, brands: &[TrackedBrand]) -> CycleReport {
        let started = std::time::Instant::now();

        let mut indexed: Vec<(usize, BrandReport)> = stream::iter(0..brands.len())
            .map(|idx| async move { (idx, self.run_brand(&brands[idx]).await) })
            .buffer_unordered(self.max_concurrent_brands)
            .collect()
            .await;
        indexed.sort_by_key(|(idx, _)| *idx);

        let report = CycleReport {
            brands: indexed.into_iter().map(|(_, r)| r).collect(),
        };

        tracing::info!(
            brands = report.brands.len(),
            admitted = report.admitted(),
            duplicates = report.duplicates(),
            failed_items = report.failed_items(),
            spikes = report.spikes(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "monitor cycle complete"
        );

        report
    }

    /// Fetch from every adapter concurrently, then enrich, admit and publish
    /// each item, then check the brand for a volume spike.
    pub async fn run_brand(&self, brand: &TrackedBrand) -> BrandReport {
        let mut report = BrandReport {
            brand: brand.name().to_string(),
            ..BrandReport::default()
        };

        let fetches = self
            .adapters
            .iter()
            .map(|adapter| self.fetch_with_timeout(adapter.as_ref(), brand));
        let results = join_all(fetches).await;

        let mut items: Vec<RawItem> = Vec::new();
        for (adapter, result) in self.adapters.iter().zip(results) {
            match result {
                Ok(batch) => {
                    tracing::debug!(
                        brand = %brand,
                        source = %adapter.source(),
                        count = batch.len(),
                        "fetched items"
                    );
                    items.extend(batch);
                }
                Err(e) => {
                    tracing::warn!(
                        brand = %brand,
                        source = %adapter.source(),
                        retryable = e.retryable(),
                        error = %e,
                        "source fetch failed"
                    );
                    report.failed_sources.push(adapter.source());
                }
            }
        }
        report.fetched = items.len();

        for item in items {
            self.process_item(brand, item, &mut report).await;
        }

        report.spike = self.check_spike(brand).await;

        tracing::info!(
            brand = %brand,
            fetched = report.fetched,
            admitted = report.admitted,
            duplicates = report.duplicates,
            failed_sources = report.failed_sources.len(),
            spike = report.spike,
            "brand processed"
        );

        report
    }

    async fn fetch_with_timeout(
        &self,
        adapter: &dyn SourceAdapter,
        brand: &TrackedBrand,
    ) -> Result<Vec<RawItem>, FetchError> {
        tokio::time::timeout(self.fetch_timeout, adapter.fetch(brand))
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))?
    }

    async fn process_item(&self, brand: &TrackedBrand, item: RawItem, report: &mut BrandReport) {
        let source = item.source;
        let candidate = self.enricher.enrich(brand, item);

        match self.gate.admit(candidate).await {
            Ok(Admission::Admitted(persisted)) => {
                report.admitted += 1;
                tracing::info!(
                    brand = %brand,
                    source = %source,
                    id = persisted.id,
                    sentiment = %persisted.mention.sentiment.label(),
                    topic = %persisted.mention.topic,
                    "mention admitted"
                );
                if let Err(e) = self.publisher.publish_mention(brand, persisted).await {
                    tracing::warn!(brand = %brand, error = %e, "failed to publish mention");
                }
            }
            Ok(Admission::Duplicate) => {
                report.duplicates += 1;
                tracing::debug!(brand = %brand, source = %source, "duplicate mention skipped");
            }
            Err(e) => {
                report.failed_items += 1;
                tracing::error!(
                    brand = %brand,
                    source = %source,
                    error = %e,
                    "failed to persist mention"
                );
            }
        }
    }

    /// Returns whether a spike was detected. Alert persistence and publish
    /// are best effort.
    async fn check_spike(&self, brand: &TrackedBrand) -> bool {
        let now = Utc::now();
        let stat = match self.spike.window_stat(brand, now).await {
            Ok(stat) => stat,
            Err(e) => {
                tracing::warn!(brand = %brand, error = %e, "spike check failed");
                return false;
            }
        };

        if !stat.is_spike(self.spike.policy()) {
            return false;
        }

        let alert = Alert::spike(&stat, now);
        tracing::info!(
            brand = %brand,
            current = stat.current_hour_count,
            previous = stat.previous_hour_count,
            "mention spike detected"
        );

        if let Err(e) = self.store.record_alert(&alert).await {
            tracing::error!(brand = %brand, error = %e, "failed to persist spike alert");
        }
        if let Err(e) = self.publisher.publish_alert(brand, alert).await {
            tracing::warn!(brand = %brand, error = %e, "failed to publish spike alert");
        }

        true
    }
}
