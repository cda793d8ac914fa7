//! Workload domain types
//!
//! A workload is a single run-to-completion Job scheduled by the cluster.
//! The console never keeps an authoritative copy of a submitted workload:
//! everything past submission is re-read from the orchestrator and reshaped
//! into the views below.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the environment variable carrying the execution statement
pub const EXEC_CODE_ENV: &str = "EXEC_CODE";

/// Name of the single container in every workload pod
pub const RUNNER_CONTAINER: &str = "runner";

/// Label attached to the pod template so pods can be traced back to their Job
pub const JOB_LABEL: &str = "job";

/// Annotation holding the JSON-encoded originating request
pub const REQUEST_ANNOTATION: &str = "orpheus.dev/request";

/// A logical "run this function with these parameters" request
///
/// `params` keeps the declared key order of the incoming JSON object; the
/// rendered call arguments follow that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRequest {
    pub function: String,
    pub params: Map<String, Value>,
    pub image: String,
    pub module: String,
}

/// Restart policy of the workload pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    Never,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::Never => "Never",
        }
    }
}

/// A validated, uniquely named workload ready for submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadDescriptor {
    pub name: String,
    pub namespace: String,
    pub image: String,
    /// Opaque one-line execution statement handed to the runtime container
    pub command: String,
    pub restart_policy: RestartPolicy,
    pub backoff_limit: i32,
    /// The request this descriptor was built from, retained for relaunch
    pub request: WorkloadRequest,
}

/// The orchestrator's echo of an accepted submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchedWorkload {
    pub name: String,
    pub namespace: String,
    pub image: String,
    pub command: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A condition reported on a workload or pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// A workload record as decoded from the orchestrator listing
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadRecord {
    pub name: String,
    pub namespace: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub succeeded: i32,
    pub failed: i32,
    pub active: i32,
    pub conditions: Vec<Condition>,
    /// Originating request, when the Job was launched by this console
    pub request: Option<WorkloadRequest>,
}

/// Lifecycle phase derived from the workload counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl Phase {
    /// Derive the phase from pod counters.
    ///
    /// Succeeded wins over failed: a Job with one success and one failure
    /// is done.
    pub fn derive(succeeded: i32, failed: i32, active: i32) -> Self {
        if succeeded > 0 {
            Phase::Succeeded
        } else if failed > 0 {
            Phase::Failed
        } else if active > 0 {
            Phase::Running
        } else {
            Phase::Pending
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Pending => "Pending",
            Phase::Running => "Running",
            Phase::Succeeded => "Succeeded",
            Phase::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// Read-only status view of a workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    pub name: String,
    pub phase: Phase,
    pub succeeded: i32,
    pub failed: i32,
    pub active: i32,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub conditions: Vec<Condition>,
}

impl From<WorkloadRecord> for WorkloadStatus {
    fn from(record: WorkloadRecord) -> Self {
        Self {
            phase: Phase::derive(record.succeeded, record.failed, record.active),
            name: record.name,
            succeeded: record.succeeded,
            failed: record.failed,
            active: record.active,
            start_time: record.start_time,
            conditions: record.conditions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(succeeded: i32, failed: i32, active: i32) -> WorkloadRecord {
        WorkloadRecord {
            name: "job-plotchart-a1b2c".to_string(),
            namespace: "orpheus".to_string(),
            created_at: None,
            start_time: None,
            succeeded,
            failed,
            active,
            conditions: Vec::new(),
            request: None,
        }
    }

    #[test]
    fn test_succeeded_takes_precedence_over_failed() {
        assert_eq!(Phase::derive(1, 1, 0), Phase::Succeeded);
        assert_eq!(Phase::derive(3, 7, 1), Phase::Succeeded);
    }

    #[test]
    fn test_failed_without_success() {
        assert_eq!(Phase::derive(0, 1, 0), Phase::Failed);
        assert_eq!(Phase::derive(0, 1, 1), Phase::Failed);
    }

    #[test]
    fn test_not_done_phases() {
        assert_eq!(Phase::derive(0, 0, 1), Phase::Running);
        assert_eq!(Phase::derive(0, 0, 0), Phase::Pending);
        assert!(!Phase::Running.is_terminal());
        assert!(Phase::Failed.is_terminal());
    }

    #[test]
    fn test_status_from_record() {
        let status = WorkloadStatus::from(record(0, 2, 0));
        assert_eq!(status.name, "job-plotchart-a1b2c");
        assert_eq!(status.phase, Phase::Failed);
        assert_eq!(status.failed, 2);
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = WorkloadStatus::from(record(1, 0, 0));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["phase"], "Succeeded");
        assert!(json.get("startTime").is_some());
    }
}
