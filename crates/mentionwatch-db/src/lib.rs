use mentionwatch_core::AppConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/mentionwatch-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error("monitor run {id} is not in expected status '{expected_status}'")]
    InvalidMonitorRunTransition {
        id: i64,
        expected_status: &'static str,
    },
    #[error("value out of range for column {column}: {value}")]
    OutOfRange { column: &'static str, value: u64 },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Open a pool against `database_url` sized by `config`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if no connection can be established within the
/// acquire timeout.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Apply pending migrations from `<workspace>/migrations` and report how many
/// ran.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    let before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let after = applied_migrations(pool).await;

    Ok(usize::try_from(after.saturating_sub(before)).unwrap_or(0))
}

/// Successful rows in `_sqlx_migrations`; zero on a fresh database where the
/// table does not exist yet.
async fn applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// [`ping`] with the failure folded into [`DbError`], for the server's
/// health endpoint.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the database does not answer.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}

/// Convert an unsigned counter to the `BIGINT` the schema stores.
pub(crate) fn to_bigint(column: &'static str, value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|_| DbError::OutOfRange { column, value })
}


pub mod alerts;
pub mod mentions;
pub mod monitor_runs;

pub use alerts::{insert_alert, list_alerts, AlertRow, NewAlert};
pub use mentions::{
    count_mentions_in_window, find_mention_by_text_author, insert_mention, MentionRow,
    NewMention,
};
pub use monitor_runs::{
    complete_monitor_run, create_monitor_run, fail_monitor_run, get_monitor_run,
    list_monitor_runs, start_monitor_run, MonitorRunCounts, MonitorRunRow,
};
