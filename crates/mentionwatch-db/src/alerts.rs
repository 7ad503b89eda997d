use chrono::{DateTime, Utc};
use mentionwatch_core::{Alert, TrackedBrand};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertRow {
    pub id: i64,
    pub public_id: Uuid,
    pub brand: String,
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub is_read: bool,
    pub triggered_at: DateTime<Utc>,
}

pub struct NewAlert<'a> {
    pub brand: &'a str,
    pub kind: &'a str,
    pub severity: &'a str,
    pub message: &'a str,
    pub triggered_at: DateTime<Utc>,
}

impl<'a> From<&'a Alert> for NewAlert<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            brand: alert.brand.name(),
            kind: alert.kind.as_str(),
            severity: alert.severity.as_str(),
            message: &alert.message,
            triggered_at: alert.triggered_at,
        }
    }
}

/// Persist an alert. Returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including check-constraint
/// violations on `kind` or `severity`).
pub async fn insert_alert(pool: &PgPool, alert: &NewAlert<'_>) -> Result<AlertRow, DbError> {
    let row = sqlx::query_as::<_, AlertRow>(
        "INSERT INTO alerts (public_id, brand, kind, severity, message, triggered_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, public_id, brand, kind, severity, message, is_read, triggered_at",
    )
    .bind(Uuid::new_v4())
    .bind(alert.brand)
    .bind(alert.kind)
    .bind(alert.severity)
    .bind(alert.message)
    .bind(alert.triggered_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Most recent alerts, newest first, optionally restricted to one brand
/// (case-insensitive).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_alerts(
    pool: &PgPool,
    brand: Option<&TrackedBrand>,
    limit: i64,
) -> Result<Vec<AlertRow>, DbError> {
    let rows = sqlx::query_as::<_, AlertRow>(
        "SELECT id, public_id, brand, kind, severity, message, is_read, triggered_at \
         FROM alerts \
         WHERE ($1::TEXT IS NULL OR lower(brand) = $1) \
         ORDER BY triggered_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(brand.map(TrackedBrand::key))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
