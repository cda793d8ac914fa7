//! Orpheus HTTP Client
//!
//! A type-safe HTTP client for the Orpheus console API.
//!
//! # Example
//!
//! ```no_run
//! use orpheus_client::ConsoleClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ConsoleClient::new("http://localhost:3000");
//!
//!     for job in client.list_jobs().await? {
//!         println!("{} {}", job.name, job.phase);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod status;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Orpheus console API
///
/// Methods are organized into logical groups:
/// - Job lifecycle (run, list, delete, restart, relaunch, bulk)
/// - Cron jobs (list, create)
/// - Pods and pod logs
/// - Cluster and datastore status
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    /// Base URL of the console (e.g., "http://localhost:3000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ConsoleClient {
    /// Create a new console client
    ///
    /// # Example
    /// ```
    /// use orpheus_client::ConsoleClient;
    ///
    /// let client = ConsoleClient::new("http://localhost:3000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new console client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the console
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code, then deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code, then return the body as text
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let response = Self::check_status(response).await?;

        Ok(response.text().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Console answered {}: {}", status, error_text);
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        Ok(response)
    }
}
