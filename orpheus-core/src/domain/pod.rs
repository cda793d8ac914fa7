//! Pod domain types

use serde::{Deserialize, Serialize};

use crate::domain::workload::Condition;

/// A pod as decoded from the orchestrator listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodRecord {
    pub name: String,
    pub phase: Option<String>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub containers: Vec<String>,
    pub conditions: Vec<Condition>,
}

impl PodRecord {
    /// Whether this pod backs the named Job.
    ///
    /// Pods created by the Job controller are named `<job>-<random>`.
    pub fn belongs_to(&self, job_name: &str) -> bool {
        self.name
            .strip_prefix(job_name)
            .is_some_and(|rest| rest.starts_with('-'))
    }
}
