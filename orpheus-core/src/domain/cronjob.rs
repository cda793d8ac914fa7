//! Scheduled workload types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// A CronJob as decoded from the orchestrator listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobRecord {
    pub name: String,
    pub schedule: String,
    pub suspend: bool,
    /// Jobs currently running for this schedule
    pub active: usize,
    pub last_schedule_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_successful_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Check the caller-supplied manifest is an object naming its CronJob.
///
/// Returns the name. Everything else is left to the orchestrator.
pub fn manifest_name(manifest: &Value) -> Result<&str, ValidationError> {
    let object = manifest
        .as_object()
        .ok_or_else(|| ValidationError::InvalidManifest("expected a JSON object".to_string()))?;

    if let Some(kind) = object.get("kind") {
        if kind.as_str() != Some("CronJob") {
            return Err(ValidationError::InvalidManifest(format!(
                "kind must be CronJob, got {}",
                kind
            )));
        }
    }

    object
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ValidationError::InvalidManifest("metadata.name is required".to_string()))
}
