//! Service Module
//!
//! Business logic layer for the console.
//! Services compose the cluster gateway and the datastore; handlers stay thin.

pub mod bulk;
pub mod lifecycle;
pub mod metrics;

pub use lifecycle::{JobError, LifecycleService};
pub use metrics::{DeltaEngine, MetricsBaseline, MetricsService};
