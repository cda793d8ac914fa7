//! API Module
//!
//! HTTP API layer for the console.
//! Each submodule handles endpoints for a specific domain.

pub mod cronjob;
pub mod db;
pub mod error;
pub mod health;
pub mod job;
pub mod pod;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::{LifecycleService, MetricsService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<LifecycleService>,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(jobs: LifecycleService, metrics: MetricsService) -> Self {
        Self {
            jobs: Arc::new(jobs),
            metrics: Arc::new(metrics),
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health checks
        .route("/health", get(health::health_check))
        .route("/k8s-health", get(health::cluster_health))
        // Job endpoints
        .route("/run-job", post(job::run_job))
        .route("/jobs", get(job::list_jobs))
        .route("/jobs/delete", post(job::delete_job))
        .route("/jobs/restart", post(job::restart_job))
        .route("/jobs/relaunch", post(job::relaunch_job))
        .route("/jobs/bulk", post(job::bulk_jobs))
        // Cron job endpoints
        .route("/cronjobs", get(cronjob::list_cron_jobs))
        .route("/cronjobs/create", post(cronjob::create_cron_job))
        // Pod endpoints
        .route("/pods", get(pod::list_pods))
        .route("/pods/logs", post(pod::pod_logs))
        // Datastore endpoints
        .route("/db/live-status", get(db::live_status))
        .route("/db/metadata", get(db::metadata))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
