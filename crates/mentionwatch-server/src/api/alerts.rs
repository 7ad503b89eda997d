use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use mentionwatch_core::TrackedBrand;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AlertsQuery {
    pub brand: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct AlertItem {
    alert_id: Uuid,
    brand: String,
    kind: String,
    severity: String,
    message: String,
    is_read: bool,
    triggered_at: DateTime<Utc>,
}

pub(super) async fn list_alerts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<ApiResponse<Vec<AlertItem>>>, ApiError> {
    let brand = query
        .brand
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(TrackedBrand::new);

    let rows =
        mentionwatch_db::list_alerts(&state.pool, brand.as_ref(), normalize_limit(query.limit))
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| AlertItem {
            alert_id: row.public_id,
            brand: row.brand,
            kind: row.kind,
            severity: row.severity,
            message: row.message,
            is_read: row.is_read,
            triggered_at: row.triggered_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::AlertItem;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn alert_item_is_serializable() {
        let item = AlertItem {
            alert_id: Uuid::new_v4(),
            brand: "Tesla".to_string(),
            kind: "spike".to_string(),
            severity: "medium".to_string(),
            message: "Unusual spike in mentions detected for Tesla".to_string(),
            is_read: false,
            triggered_at: Utc::now(),
        };

        let json = serde_json::to_string(&item).expect("serialize alert");
        assert!(json.contains("\"kind\":\"spike\""));
        assert!(json.contains("\"is_read\":false"));
    }
}
