//! Health Check API Handlers
//!
//! Liveness of the console itself and connectivity to the cluster.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::AppState;

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /k8s-health
/// Lists namespaces to prove the cluster is reachable with the configured credentials
pub async fn cluster_health(State(state): State<AppState>) -> Response {
    match state.jobs.cluster_health().await {
        Ok(health) => (StatusCode::OK, Json(health)).into_response(),
        Err(e) => {
            tracing::error!("Cluster health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "status": "error", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
