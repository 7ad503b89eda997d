//! Database operations for `monitor_runs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `monitor_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonitorRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub brands_processed: i32,
    pub mentions_persisted: i32,
    pub alerts_raised: i32,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Totals recorded when a run succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorRunCounts {
    pub brands_processed: i32,
    pub mentions_persisted: i32,
    pub alerts_raised: i32,
}

const RUN_COLUMNS: &str = "id, public_id, trigger_source, status, brands_processed, \
     mentions_persisted, alerts_raised, error_message, started_at, completed_at, created_at";

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Creates a new monitor run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_monitor_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<MonitorRunRow, DbError> {
    let sql = format!(
        "INSERT INTO monitor_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {RUN_COLUMNS}"
    );
    let row = sqlx::query_as::<_, MonitorRunRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(trigger_source)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidMonitorRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_monitor_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE monitor_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidMonitorRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` and records its totals.
///
/// # Errors
///
/// Returns [`DbError::InvalidMonitorRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_monitor_run(
    pool: &PgPool,
    id: i64,
    counts: MonitorRunCounts,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE monitor_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             brands_processed = $1, mentions_persisted = $2, alerts_raised = $3 \
         WHERE id = $4 AND status = 'running'",
    )
    .bind(counts.brands_processed)
    .bind(counts.mentions_persisted)
    .bind(counts.alerts_raised)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidMonitorRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidMonitorRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_monitor_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE monitor_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidMonitorRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_monitor_run(pool: &PgPool, id: i64) -> Result<MonitorRunRow, DbError> {
    let sql = format!("SELECT {RUN_COLUMNS} FROM monitor_runs WHERE id = $1");
    let row = sqlx::query_as::<_, MonitorRunRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_monitor_runs(pool: &PgPool, limit: i64) -> Result<Vec<MonitorRunRow>, DbError> {
    let sql = format!(
        "SELECT {RUN_COLUMNS} FROM monitor_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    );
    let rows = sqlx::query_as::<_, MonitorRunRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
