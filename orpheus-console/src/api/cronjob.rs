//! Cron Job API Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use orpheus_core::domain::cronjob::CronJobRecord;
use orpheus_core::dto::job::CreateCronJobRequest;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /cronjobs
pub async fn list_cron_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<CronJobRecord>>> {
    let cron_jobs = state.jobs.list_cron_jobs().await?;
    Ok(Json(cron_jobs))
}

/// POST /cronjobs/create
/// Submit a caller-supplied CronJob manifest into the jobs namespace
pub async fn create_cron_job(
    State(state): State<AppState>,
    payload: Result<Json<CreateCronJobRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CronJobRecord>)> {
    let Json(req) = payload?;

    let created = state.jobs.create_cron_job(&req.cron_job_manifest).await?;

    Ok((StatusCode::CREATED, Json(created)))
}
