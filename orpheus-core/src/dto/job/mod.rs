//! Job DTOs for the console HTTP API

use serde::{Deserialize, Serialize};

use crate::domain::workload::LaunchedWorkload;

/// Response of `POST /run-job`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunJobResponse {
    pub job_name: String,
    pub namespace: String,
    pub image: String,
    pub code: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<LaunchedWorkload> for RunJobResponse {
    fn from(launched: LaunchedWorkload) -> Self {
        Self {
            job_name: launched.name,
            namespace: launched.namespace,
            image: launched.image,
            code: launched.command,
            created_at: launched.created_at,
        }
    }
}

/// Body of the single-job control endpoints (delete, restart, relaunch)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobNameRequest {
    pub name: String,
}

/// Acknowledgement that the orchestrator accepted an operation on a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAck {
    pub job: String,
}

/// Response of `POST /jobs/relaunch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaunchResponse {
    /// The deleted job
    pub job: String,
    /// Name of the replacement job
    pub job_name: String,
}

/// Body of `POST /pods/logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodLogsRequest {
    pub job_name: String,
}

/// Operation applied by `POST /jobs/bulk`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    Delete,
    Restart,
    Logs,
}

impl std::fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BulkOperation::Delete => "delete",
            BulkOperation::Restart => "restart",
            BulkOperation::Logs => "logs",
        };
        f.write_str(s)
    }
}

/// Body of `POST /jobs/bulk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub names: Vec<String>,
    pub operation: BulkOperation,
}

/// Outcome of one item of a bulk operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BulkOutcome {
    Succeeded {
        /// Log text for `logs`, absent otherwise
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BulkOutcome::Succeeded { .. })
    }
}

/// Per-name result of a bulk operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

/// Body of `POST /cronjobs/create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCronJobRequest {
    /// A `batch/v1` CronJob manifest; its namespace is replaced by the console's
    pub cron_job_manifest: serde_json::Value,
}
