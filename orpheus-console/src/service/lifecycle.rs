//! Job Lifecycle Service
//!
//! Composes the job spec builder and the cluster gateway. Every operation
//! here is all-or-nothing; partial failure across several jobs is handled by
//! the bulk coordinator.

use std::sync::Arc;

use orpheus_core::domain::cronjob::{self, CronJobRecord};
use orpheus_core::domain::pod::PodRecord;
use orpheus_core::domain::workload::{LaunchedWorkload, WorkloadRequest, WorkloadStatus};
use orpheus_core::dto::cluster::ClusterHealth;
use orpheus_core::dto::job::{JobAck, RelaunchResponse};
use orpheus_core::{ValidationError, builder};
use thiserror::Error;

use crate::gateway::{ClusterGateway, GatewayError};

/// Status reported by a successful connectivity check
pub const CONNECTED: &str = "connected";

/// Service error type
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("pod {0} has no containers")]
    NoContainer(String),

    #[error("job {0} was not launched with a retained request and cannot be relaunched")]
    NotRelaunchable(String),
}

/// Launch, inspect and control workloads in one namespace
pub struct LifecycleService {
    gateway: Arc<dyn ClusterGateway>,
    namespace: String,
}

impl LifecycleService {
    pub fn new(gateway: Arc<dyn ClusterGateway>, namespace: impl Into<String>) -> Self {
        Self {
            gateway,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Build and submit a workload.
    ///
    /// Returns the orchestrator's echo, so timestamps and names reflect what
    /// the cluster accepted rather than what was built locally.
    pub async fn launch(&self, request: WorkloadRequest) -> Result<LaunchedWorkload, JobError> {
        let descriptor = builder::build(&request, &self.namespace)?;
        let launched = self.gateway.submit(&descriptor).await?;

        tracing::info!(
            "Job launched: {} in {} (image {})",
            launched.name,
            launched.namespace,
            launched.image
        );
        tracing::debug!("Job {} code: {}", launched.name, launched.command);

        Ok(launched)
    }

    /// List workloads with their derived status, in orchestrator order
    pub async fn list_with_status(&self) -> Result<Vec<WorkloadStatus>, JobError> {
        let records = self.gateway.list(&self.namespace).await?;
        Ok(records.into_iter().map(WorkloadStatus::from).collect())
    }

    /// Request deletion of a job.
    ///
    /// The acknowledgement means the orchestrator accepted the deletion; the
    /// job may still show up in listings for a short while.
    pub async fn delete(&self, name: &str) -> Result<JobAck, JobError> {
        self.gateway.delete(name, &self.namespace).await?;
        tracing::info!("Job delete accepted: {}", name);

        Ok(JobAck {
            job: name.to_string(),
        })
    }

    /// Restart a job.
    ///
    /// This only deletes the job; nothing is resubmitted. Callers wanting a
    /// fresh run of the same request use [`LifecycleService::relaunch`].
    pub async fn restart(&self, name: &str) -> Result<JobAck, JobError> {
        tracing::warn!(
            "Restart of {} deletes the job without resubmitting it",
            name
        );
        self.delete(name).await
    }

    /// Delete a job and resubmit its retained request under a new name
    pub async fn relaunch(&self, name: &str) -> Result<RelaunchResponse, JobError> {
        let record = self.gateway.get(name, &self.namespace).await.map_err(|e| {
            if e.is_not_found() {
                JobError::NotFound(format!("job {}", name))
            } else {
                JobError::Gateway(e)
            }
        })?;

        let request = record
            .request
            .ok_or_else(|| JobError::NotRelaunchable(name.to_string()))?;

        // Validate before deleting so a bad retained request keeps the old job.
        let descriptor = builder::build(&request, &self.namespace)?;

        self.gateway.delete(name, &self.namespace).await?;
        let launched = self.gateway.submit(&descriptor).await?;

        tracing::info!("Job {} relaunched as {}", name, launched.name);

        Ok(RelaunchResponse {
            job: name.to_string(),
            job_name: launched.name,
        })
    }

    /// Fetch the buffered output of the pod backing `job_name`.
    ///
    /// The first pod named `<job_name>-...` wins; logs come from its first
    /// container.
    pub async fn fetch_logs_for_job(&self, job_name: &str) -> Result<String, JobError> {
        let pods = self.gateway.list_pods(&self.namespace).await?;

        let pod = pods
            .into_iter()
            .find(|pod| pod.belongs_to(job_name))
            .ok_or_else(|| JobError::NotFound(format!("no pod for job {}", job_name)))?;

        let container = pod
            .containers
            .first()
            .ok_or_else(|| JobError::NoContainer(pod.name.clone()))?;

        tracing::debug!("Fetching logs of {}/{}", pod.name, container);

        let logs = self
            .gateway
            .fetch_logs(&pod.name, &self.namespace, container)
            .await?;
        Ok(logs)
    }

    /// Pods in the namespace, in orchestrator order
    pub async fn list_pods(&self) -> Result<Vec<PodRecord>, JobError> {
        let pods = self.gateway.list_pods(&self.namespace).await?;
        tracing::debug!("Listed {} pods in {}", pods.len(), self.namespace);
        Ok(pods)
    }

    pub async fn list_cron_jobs(&self) -> Result<Vec<CronJobRecord>, JobError> {
        Ok(self.gateway.list_cron_jobs(&self.namespace).await?)
    }

    /// Create a CronJob from a caller-supplied manifest.
    ///
    /// The manifest is not built here; it only has to name its CronJob.
    pub async fn create_cron_job(
        &self,
        manifest: &serde_json::Value,
    ) -> Result<CronJobRecord, JobError> {
        let name = cronjob::manifest_name(manifest)?;
        let created = self.gateway.create_cron_job(&self.namespace, manifest).await?;

        tracing::info!(
            "Cron job created: {} ({}) in {}",
            name,
            created.schedule,
            self.namespace
        );

        Ok(created)
    }

    /// Check cluster connectivity.
    ///
    /// A cluster that lists no namespaces at all counts as unreachable.
    pub async fn cluster_health(&self) -> Result<ClusterHealth, JobError> {
        let reachability = self.gateway.health_check().await?;

        if reachability.namespaces.is_empty() {
            return Err(JobError::Gateway(GatewayError::decode(format!(
                "no namespaces returned by context {}",
                reachability.context
            ))));
        }

        Ok(ClusterHealth {
            status: CONNECTED.to_string(),
            context: reachability.context,
            namespaces: reachability.namespaces,
        })
    }
}
