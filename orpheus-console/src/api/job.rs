//! Job API Handlers
//!
//! HTTP endpoints for launching and controlling cluster jobs.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use orpheus_core::domain::workload::{WorkloadRequest, WorkloadStatus};
use orpheus_core::dto::job::{
    BulkItemResult, BulkRequest, JobAck, JobNameRequest, RelaunchResponse, RunJobResponse,
};

use crate::api::AppState;
use crate::api::error::{ApiResult, require_name};
use crate::service::bulk;

/// POST /run-job
/// Build a job from a function request and submit it
pub async fn run_job(
    State(state): State<AppState>,
    payload: Result<Json<WorkloadRequest>, JsonRejection>,
) -> ApiResult<Json<RunJobResponse>> {
    let Json(req) = payload?;
    tracing::info!("Launching {}.{} on {}", req.module, req.function, req.image);

    let launched = state.jobs.launch(req).await?;

    Ok(Json(RunJobResponse::from(launched)))
}

/// GET /jobs
/// List jobs with their derived phase
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<WorkloadStatus>>> {
    tracing::debug!("Listing jobs in {}", state.jobs.namespace());

    let jobs = state.jobs.list_with_status().await?;

    Ok(Json(jobs))
}

/// POST /jobs/delete
pub async fn delete_job(
    State(state): State<AppState>,
    payload: Result<Json<JobNameRequest>, JsonRejection>,
) -> ApiResult<Json<JobAck>> {
    let Json(req) = payload?;
    require_name("name", &req.name)?;

    let ack = state.jobs.delete(&req.name).await?;

    Ok(Json(ack))
}

/// POST /jobs/restart
/// Deletes the job; nothing is resubmitted
pub async fn restart_job(
    State(state): State<AppState>,
    payload: Result<Json<JobNameRequest>, JsonRejection>,
) -> ApiResult<Json<JobAck>> {
    let Json(req) = payload?;
    require_name("name", &req.name)?;

    let ack = state.jobs.restart(&req.name).await?;

    Ok(Json(ack))
}

/// POST /jobs/relaunch
/// Delete the job and resubmit its original request under a new name
pub async fn relaunch_job(
    State(state): State<AppState>,
    payload: Result<Json<JobNameRequest>, JsonRejection>,
) -> ApiResult<Json<RelaunchResponse>> {
    let Json(req) = payload?;
    require_name("name", &req.name)?;

    let relaunched = state.jobs.relaunch(&req.name).await?;

    Ok(Json(relaunched))
}

/// POST /jobs/bulk
/// Apply one operation to each selected job; item failures are reported, not raised
pub async fn bulk_jobs(
    State(state): State<AppState>,
    payload: Result<Json<BulkRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<BulkItemResult>>> {
    let Json(req) = payload?;

    let results = bulk::run(&state.jobs, req.names, req.operation).await;

    Ok(Json(results))
}
