//! Offline unit tests for mentionwatch-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use mentionwatch_core::{
    AppConfig, SentimentLabel, SentimentThresholds, Source, SourceToggles,
    SpikePolicy, Topic,
};
use mentionwatch_db::{MentionRow, MonitorRunRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use uuid::Uuid;

fn mention_row() -> MentionRow {
    MentionRow {
        id: 7,
        public_id: Uuid::new_v4(),
        brand: "Tesla".to_string(),
        source: "Reddit".to_string(),
        text: "Tesla support was great today".to_string(),
        author: "u1".to_string(),
        author_handle: Some("u/u1".to_string()),
        occurred_at: Utc::now(),
        sentiment: "positive".to_string(),
        sentiment_score: 0.6,
        topic: "Customer Service".to_string(),
        keywords: vec!["tesla".to_string(), "support".to_string()],
        likes: 12,
        shares: 1,
        comments: 3,
        reach: 15,
        url: Some("https://reddit.com/r/teslamotors/abc".to_string()),
        language: "en".to_string(),
        created_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000),
        log_level: "info".to_string(),
        brands_path: PathBuf::from("./config/brands.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        monitor_interval_secs: 600,
        source_timeout_secs: 10,
        user_agent: "ua".to_string(),
        max_concurrent_brands: 1,
        sources: SourceToggles::default(),
        twitter_bearer_token: None,
        news_api_key: None,
        sentiment_thresholds: SentimentThresholds::default(),
        spike_policy: SpikePolicy::default(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn mention_row_converts_to_domain_type() {
    let row = mention_row();
    let id = row.id;
    let persisted = row.into_persisted().expect("row holds known enum values");

    assert_eq!(persisted.id, id);
    assert_eq!(persisted.mention.item.source, Source::Reddit);
    assert_eq!(persisted.mention.topic, Topic::CustomerService);
    assert_eq!(persisted.mention.sentiment.label(), SentimentLabel::Positive);
    assert_eq!(persisted.mention.item.engagement.likes, 12);
    assert_eq!(persisted.mention.item.reach, 15);
    assert_eq!(persisted.mention.brand.name(), "Tesla");
}

#[test]
fn mention_row_keeps_stored_label() {
    let mut row = mention_row();
    row.sentiment = "neutral".to_string();
    row.sentiment_score = 0.9;
    let persisted = row.into_persisted().unwrap();
    assert_eq!(persisted.mention.sentiment.label(), SentimentLabel::Neutral);
}

#[test]
fn mention_row_with_unknown_topic_is_rejected() {
    let mut row = mention_row();
    row.topic = "Weather".to_string();
    let err = row.into_persisted().unwrap_err();
    assert_eq!(err.kind, "topic");
}

/// Compile-time smoke test: confirm that [`MonitorRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn monitor_run_row_has_expected_fields() {
    let row = MonitorRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        trigger_source: "scheduler".to_string(),
        status: "queued".to_string(),
        brands_processed: 0_i32,
        mentions_persisted: 0_i32,
        alerts_raised: 0_i32,
        error_message: None,
        started_at: None,
        completed_at: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.trigger_source, "scheduler");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.error_message.is_none());
}
