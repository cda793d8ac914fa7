//! Job-related API endpoints

use crate::ConsoleClient;
use crate::error::Result;
use orpheus_core::domain::cronjob::CronJobRecord;
use orpheus_core::domain::pod::PodRecord;
use orpheus_core::domain::workload::{WorkloadRequest, WorkloadStatus};
use orpheus_core::dto::job::{
    BulkItemResult, BulkOperation, BulkRequest, CreateCronJobRequest, JobAck, JobNameRequest,
    PodLogsRequest, RelaunchResponse, RunJobResponse,
};

impl ConsoleClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Build and launch a job
    ///
    /// # Example
    /// ```no_run
    /// # use orpheus_client::ConsoleClient;
    /// # use orpheus_core::domain::workload::WorkloadRequest;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ConsoleClient::new("http://localhost:3000");
    /// let mut params = serde_json::Map::new();
    /// params.insert("ticker".into(), "SPY".into());
    /// let job = client.run_job(&WorkloadRequest {
    ///     function: "plot_chart".into(),
    ///     params,
    ///     image: "registry.local/orpheus/runner:latest".into(),
    ///     module: "charts".into(),
    /// }).await?;
    /// println!("{}", job.job_name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_job(&self, req: &WorkloadRequest) -> Result<RunJobResponse> {
        let response = self.client.post(self.url("/run-job")).json(req).send().await?;

        self.handle_response(response).await
    }

    /// List jobs with their derived phase
    pub async fn list_jobs(&self) -> Result<Vec<WorkloadStatus>> {
        let response = self.client.get(self.url("/jobs")).send().await?;

        self.handle_response(response).await
    }

    pub async fn delete_job(&self, name: &str) -> Result<JobAck> {
        self.post_name("/jobs/delete", name).await
    }

    /// Restart a job (the console deletes it without resubmitting)
    pub async fn restart_job(&self, name: &str) -> Result<JobAck> {
        self.post_name("/jobs/restart", name).await
    }

    /// Delete a job and resubmit its original request under a new name
    pub async fn relaunch_job(&self, name: &str) -> Result<RelaunchResponse> {
        self.post_name("/jobs/relaunch", name).await
    }

    /// Apply one operation to several jobs; per-item failures are in the result
    pub async fn bulk(
        &self,
        names: Vec<String>,
        operation: BulkOperation,
    ) -> Result<Vec<BulkItemResult>> {
        let response = self
            .client
            .post(self.url("/jobs/bulk"))
            .json(&BulkRequest { names, operation })
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Cron Jobs
    // =============================================================================

    pub async fn list_cron_jobs(&self) -> Result<Vec<CronJobRecord>> {
        let response = self.client.get(self.url("/cronjobs")).send().await?;

        self.handle_response(response).await
    }

    /// Submit a CronJob manifest; it must carry `metadata.name`
    pub async fn create_cron_job(&self, manifest: serde_json::Value) -> Result<CronJobRecord> {
        let response = self
            .client
            .post(self.url("/cronjobs/create"))
            .json(&CreateCronJobRequest {
                cron_job_manifest: manifest,
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Pods
    // =============================================================================

    /// Pods in the console's jobs namespace
    pub async fn list_pods(&self) -> Result<Vec<PodRecord>> {
        let response = self.client.get(self.url("/pods")).send().await?;

        self.handle_response(response).await
    }

    /// Output of the pod backing a job
    pub async fn job_logs(&self, job_name: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/pods/logs"))
            .json(&PodLogsRequest {
                job_name: job_name.to_string(),
            })
            .send()
            .await?;

        self.handle_text_response(response).await
    }

    async fn post_name<T: serde::de::DeserializeOwned>(&self, path: &str, name: &str) -> Result<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(&JobNameRequest {
                name: name.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
