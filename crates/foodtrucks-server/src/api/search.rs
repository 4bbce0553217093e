use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use foodtrucks_core::{Record, SearchMetadata, SearchRequest, MAX_LIMIT};
use foodtrucks_engine::{build_query, execute, ErrorKind};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Record>,
    pub metadata: SearchMetadata,
    pub meta: ResponseMeta,
}

/// Schema checks that run before the engine sees the request.
fn check_request_schema(request: &SearchRequest) -> Result<(), String> {
    if let Some(latitude) = request.latitude {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude must be between -90 and 90, got {latitude}"));
        }
    }
    if let Some(longitude) = request.longitude {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!(
                "longitude must be between -180 and 180, got {longitude}"
            ));
        }
    }
    if let Some(limit) = request.limit {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(format!("limit must be between 1 and {MAX_LIMIT}, got {limit}"));
        }
    }
    Ok(())
}

pub(super) async fn search_food_trucks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;
    check_request_schema(&request)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let query = build_query(&request)
        .map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.to_string()))?;

    // A first snapshot reads the source, which must stay off the async workers.
    let snapshot = if state.store.load_attempted() {
        state.store.current_snapshot()
    } else {
        let store = Arc::clone(&state.store);
        tokio::task::spawn_blocking(move || store.current_snapshot())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "initial dataset load task failed");
                ApiError::new(req_id.0.clone(), "internal_error", "dataset load failed")
            })?
    };
    if !state.store.is_available() {
        return Err(ApiError::new(
            req_id.0,
            "data_unavailable",
            "Data not available",
        ));
    }

    let result = execute(&snapshot, &query).map_err(|e| match e.kind() {
        ErrorKind::ValidationError => ApiError::new(req_id.0.clone(), "bad_request", e.to_string()),
        _ => {
            tracing::error!(error = %e, "search failed");
            ApiError::new(req_id.0.clone(), "internal_error", "search failed")
        }
    })?;

    let total = result.data.len();
    Ok(Json(SearchResponse {
        success: true,
        message: format!("Search completed successfully. Found {total} results."),
        data: result.data,
        metadata: result.metadata,
        meta: ResponseMeta::new(req_id.0),
    }))
}
