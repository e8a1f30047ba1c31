//! HTTP handlers for the four map endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use libmapmark_core::protocol::{
    BatchResponse, DeleteResponse, BATCH_PATH, MARKERS_PATH, SNAPSHOTS_PATH, USER_HEADER,
};
use libmapmark_core::types::lenient;
use libmapmark_core::{Marker, Snapshot};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::state::AppState;

/// Routes relative to the API prefix. A known path with the wrong method
/// answers 404, same as an unknown path.
pub fn api_routes() -> Router<AppState> {
    let marker_path = format!("{}/{{id}}", MARKERS_PATH);

    Router::new()
        .route(SNAPSHOTS_PATH, get(list_snapshots).fallback(not_found))
        .route(MARKERS_PATH, post(add_marker).fallback(not_found))
        .route(&marker_path, delete(delete_marker).fallback(not_found))
        .route(BATCH_PATH, post(upload_batch).fallback(not_found))
}

pub async fn not_found() -> ServerError {
    ServerError::RouteNotFound
}

async fn list_snapshots(State(state): State<AppState>) -> Json<Vec<Snapshot>> {
    let snapshots = state.snapshots();
    debug!(count = snapshots.len(), "serving snapshots");
    Json(snapshots)
}

async fn add_marker(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Marker>), ServerError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ServerError::InvalidJson)?;
    if !value.is_object() {
        return Err(ServerError::InvalidJson);
    }
    let marker: Marker = serde_json::from_value(value).map_err(|_| ServerError::InvalidJson)?;

    let stored = state.add_marker(marker, actor(&headers)).await?;
    info!(marker_id = %stored.id, "marker added");
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn delete_marker(
    State(state): State<AppState>,
    Path(marker_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, ServerError> {
    state.delete_marker(&marker_id, actor(&headers)).await?;
    info!(marker_id = %marker_id, "marker deleted");
    Ok(Json(DeleteResponse { marker_id }))
}

async fn upload_batch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<BatchResponse>), ServerError> {
    let value: Value =
        serde_json::from_slice(&body).map_err(|_| ServerError::InvalidJsonArray)?;
    let snapshots: Vec<Snapshot> =
        lenient::records(value).map_err(|_| ServerError::InvalidJsonArray)?;

    let count = state.append_batch(snapshots).await;
    info!(count, "snapshot batch uploaded");
    Ok((StatusCode::CREATED, Json(BatchResponse::uploaded(count))))
}

/// Advisory user label from `X-User`, empty when absent
fn actor(headers: &HeaderMap) -> &str {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or("")
}
