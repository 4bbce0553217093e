use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct HealthData {
    pub status: &'static str,
    pub service: &'static str,
    pub dataset: DatasetHealth,
}

#[derive(Debug, Serialize)]
pub(super) struct DatasetHealth {
    pub available: bool,
    pub records: usize,
    pub dropped_rows: usize,
    pub built_at: Option<DateTime<Utc>>,
    pub last_reload: Option<DateTime<Utc>>,
    pub reload_due: bool,
    pub last_error: Option<String>,
}

/// Liveness plus an honest report of dataset availability. Always 200.
pub(super) async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<HealthData>> {
    let status = state.store.status();
    let reload_due = state
        .store
        .due_for_reload(Utc::now(), state.reload_interval);

    Json(ApiResponse {
        data: HealthData {
            status: "healthy",
            service: "Food Truck Search API",
            dataset: DatasetHealth {
                available: status.available,
                records: status.records,
                dropped_rows: status.dropped_rows,
                built_at: status.built_at,
                last_reload: status.last_reload,
                reload_due,
                last_error: status.last_error,
            },
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
