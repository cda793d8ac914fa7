//! Cluster DTOs

use serde::{Deserialize, Serialize};

/// Connectivity check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub status: String,
    /// Kubeconfig context the console talks to
    pub context: String,
    pub namespaces: Vec<String>,
}
