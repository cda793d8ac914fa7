//! Cluster Gateway
//!
//! Access layer for the cluster orchestrator. The lifecycle service only
//! talks to the [`ClusterGateway`] trait; [`KubeGateway`] is the Kubernetes
//! implementation used in production.

mod error;
pub mod kubernetes;

pub use self::error::{GatewayCause, GatewayError};
pub use self::kubernetes::KubeGateway;

use async_trait::async_trait;
use orpheus_core::domain::cronjob::CronJobRecord;
use orpheus_core::domain::pod::PodRecord;
use orpheus_core::domain::workload::{LaunchedWorkload, WorkloadDescriptor, WorkloadRecord};

/// Result of the connectivity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterReachability {
    pub context: String,
    pub namespaces: Vec<String>,
}

/// Batch and pod operations of the orchestrator, scoped by namespace
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// Submit a workload; returns the orchestrator's echo
    async fn submit(&self, descriptor: &WorkloadDescriptor)
    -> Result<LaunchedWorkload, GatewayError>;

    /// List every workload in the namespace, all or nothing
    async fn list(&self, namespace: &str) -> Result<Vec<WorkloadRecord>, GatewayError>;

    /// Fetch a single workload
    async fn get(&self, name: &str, namespace: &str) -> Result<WorkloadRecord, GatewayError>;

    /// Request deletion; returns once the orchestrator accepted it.
    /// Dependents (pods) are removed in the background.
    async fn delete(&self, name: &str, namespace: &str) -> Result<(), GatewayError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, GatewayError>;

    /// Snapshot of the buffered output of one container
    async fn fetch_logs(
        &self,
        pod: &str,
        namespace: &str,
        container: &str,
    ) -> Result<String, GatewayError>;

    async fn list_cron_jobs(&self, namespace: &str) -> Result<Vec<CronJobRecord>, GatewayError>;

    /// Create a CronJob from a caller-supplied manifest, forced into `namespace`
    async fn create_cron_job(
        &self,
        namespace: &str,
        manifest: &serde_json::Value,
    ) -> Result<CronJobRecord, GatewayError>;

    /// List namespaces as a connectivity check
    async fn health_check(&self) -> Result<ClusterReachability, GatewayError>;
}
