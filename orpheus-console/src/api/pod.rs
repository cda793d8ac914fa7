//! Pod API Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use orpheus_core::domain::pod::PodRecord;
use orpheus_core::dto::job::PodLogsRequest;

use crate::api::AppState;
use crate::api::error::{ApiResult, require_name};

/// GET /pods
/// Pods in the jobs namespace
pub async fn list_pods(State(state): State<AppState>) -> ApiResult<Json<Vec<PodRecord>>> {
    let pods = state.jobs.list_pods().await?;
    Ok(Json(pods))
}

/// POST /pods/logs
/// Plain-text output of the pod backing a job
pub async fn pod_logs(
    State(state): State<AppState>,
    payload: Result<Json<PodLogsRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(req) = payload?;
    require_name("jobName", &req.job_name)?;

    tracing::debug!("Fetching logs for job: {}", req.job_name);

    let logs = state.jobs.fetch_logs_for_job(&req.job_name).await?;

    Ok(logs)
}
