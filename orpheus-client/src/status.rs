//! Cluster and datastore status endpoints

use crate::ConsoleClient;
use crate::error::Result;
use orpheus_core::domain::metrics::{DatastoreMetadata, LiveStatus};
use orpheus_core::dto::cluster::ClusterHealth;

impl ConsoleClient {
    /// Console liveness
    pub async fn health(&self) -> Result<String> {
        let response = self.client.get(self.url("/health")).send().await?;

        self.handle_text_response(response).await
    }

    /// Cluster connectivity check
    pub async fn cluster_health(&self) -> Result<ClusterHealth> {
        let response = self.client.get(self.url("/k8s-health")).send().await?;

        self.handle_response(response).await
    }

    /// Datastore rates since the previous poll.
    ///
    /// Every caller shares the console's baseline, so concurrent watchers
    /// split the deltas between them.
    pub async fn live_status(&self) -> Result<LiveStatus> {
        let response = self.client.get(self.url("/db/live-status")).send().await?;

        self.handle_response(response).await
    }

    pub async fn db_metadata(&self) -> Result<DatastoreMetadata> {
        let response = self.client.get(self.url("/db/metadata")).send().await?;

        self.handle_response(response).await
    }
}
