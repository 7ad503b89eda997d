use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct MonitorRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct MonitorRunItem {
    monitor_run_id: Uuid,
    trigger_source: String,
    status: String,
    brands_processed: i32,
    mentions_persisted: i32,
    alerts_raised: i32,
    error_message: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

pub(super) async fn list_monitor_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MonitorRunsQuery>,
) -> Result<Json<ApiResponse<Vec<MonitorRunItem>>>, ApiError> {
    let rows = mentionwatch_db::list_monitor_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| MonitorRunItem {
            monitor_run_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            brands_processed: row.brands_processed,
            mentions_persisted: row.mentions_persisted,
            alerts_raised: row.alerts_raised,
            error_message: row.error_message,
            started_at: row.started_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
