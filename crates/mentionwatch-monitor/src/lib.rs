//! Mention ingestion and analysis pipeline.
//!
//! Pulls brand mentions from Twitter, Reddit and a news search API, scores
//! sentiment, classifies topic and extracts keywords, admits each mention
//! exactly once per `(text, author)`, fans admitted mentions out to
//! per-brand subscribers, and raises an alert when hourly volume spikes.

pub mod cycle;
pub mod enrich;
pub mod error;
pub mod gate;
pub mod publish;
pub mod sources;
pub mod spike;
pub mod store;

pub use cycle::{BrandReport, CycleReport, Monitor, MonitorSettings};
pub use enrich::{EnrichmentConfig, Enricher, LexiconScorer, Scorer, TextAnalysis};
pub use error::{FetchError, PublishError, StoreError};
pub use gate::{Admission, DedupGate};
pub use publish::{BrandEvent, BroadcastPublisher, EventPublisher, LogPublisher};
pub use sources::{build_adapters, build_http_client, SourceAdapter};
pub use spike::SpikeDetector;
pub use store::{InsertOutcome, MemoryStore, MentionStore, PgMentionStore};
