//! Repository Module
//!
//! Read-only access to the observed datastore. The console owns no tables;
//! it only reads server statistics.

pub mod stats;

pub use stats::PgDatastore;

use async_trait::async_trait;
use orpheus_core::domain::metrics::{CumulativeCounters, DatastoreMetadata};

/// Statistics queries the console runs against the datastore
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Trivial liveness query, timed by the caller
    async fn ping(&self) -> Result<(), sqlx::Error>;

    /// Cumulative transaction, insert and select counters
    async fn counters(&self) -> Result<CumulativeCounters, sqlx::Error>;

    /// Open backend connections across all databases
    async fn connections(&self) -> Result<i64, sqlx::Error>;

    async fn metadata(&self) -> Result<DatastoreMetadata, sqlx::Error>;
}
