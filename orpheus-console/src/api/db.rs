//! Datastore API Handlers

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orpheus_core::domain::metrics::LiveStatus;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /db/live-status
/// Connections, ping latency and counter deltas since the previous poll
pub async fn live_status(State(state): State<AppState>) -> ApiResult<Json<LiveStatus>> {
    let status = state.metrics.live_status().await?;
    Ok(Json(status))
}

/// GET /db/metadata
pub async fn metadata(State(state): State<AppState>) -> Response {
    match state.metrics.metadata().await {
        Ok(metadata) => (StatusCode::OK, Json(metadata)).into_response(),
        Err(e) => {
            tracing::error!("Datastore metadata query failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "status": "error", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
