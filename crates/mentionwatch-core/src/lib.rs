//! Shared domain types and configuration for mentionwatch.
//!
//! Everything the pipeline passes between stages lives here: tracked brands,
//! raw and enriched mentions, alerts, and the tunable policies (sentiment
//! thresholds, spike detection) that the pipeline reads from configuration.

mod app_config;
mod brands;
mod config;
mod error;
mod mention;
mod policy;

pub use app_config::{AppConfig, SourceToggles};
pub use brands::{load_brands, parse_brands, BrandConfig, BrandsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use mention::{
    Alert, AlertKind, Engagement, EnrichedMention, ParseEnumError, PersistedMention, RawItem,
    Sentiment, SentimentLabel, Severity, Source, SpikeWindowStat, Topic, TrackedBrand,
};
pub use policy::{SentimentThresholds, SpikePolicy, TimeWindow};
