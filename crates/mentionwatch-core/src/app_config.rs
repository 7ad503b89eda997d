use std::net::SocketAddr;
use std::path::PathBuf;

use crate::policy::{SentimentThresholds, SpikePolicy};

/// Per-source enable flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SourceToggles {
    pub twitter: bool,
    pub reddit: bool,
    pub news: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            twitter: true,
            reddit: true,
            news: true,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub brands_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub monitor_interval_secs: u64,
    pub source_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_brands: usize,
    pub sources: SourceToggles,
    pub twitter_bearer_token: Option<String>,
    pub news_api_key: Option<String>,
    pub sentiment_thresholds: SentimentThresholds,
    pub spike_policy: SpikePolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("brands_path", &self.brands_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("monitor_interval_secs", &self.monitor_interval_secs)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_brands", &self.max_concurrent_brands)
            .field("sources", &self.sources)
            .field(
                "twitter_bearer_token",
                &self.twitter_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("sentiment_thresholds", &self.sentiment_thresholds)
            .field("spike_policy", &self.spike_policy)
            .finish()
    }
}
