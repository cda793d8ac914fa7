//! Metrics Delta Engine
//!
//! Turns the datastore's cumulative counters into per-poll deltas. The
//! baseline is the only mutable state shared between requests.

use std::sync::Arc;
use std::time::Instant;

use orpheus_core::domain::metrics::{
    CounterDeltas, CumulativeCounters, DatastoreMetadata, LiveStatus, RateSnapshot,
};
use tokio::sync::Mutex;

use crate::repository::Datastore;

/// Counters observed at the previous poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsBaseline {
    pub transactions: u64,
    pub inserts: u64,
    pub selects: u64,
}

impl MetricsBaseline {
    /// Replace the baseline with `current` and return the increase.
    ///
    /// A counter that went backwards (statistics reset) yields 0.
    pub fn advance(&mut self, current: CumulativeCounters) -> CounterDeltas {
        let deltas = CounterDeltas {
            transactions: current.transactions.saturating_sub(self.transactions),
            inserts: current.inserts.saturating_sub(self.inserts),
            selects: current.selects.saturating_sub(self.selects),
        };

        self.transactions = current.transactions;
        self.inserts = current.inserts;
        self.selects = current.selects;

        deltas
    }
}

/// Serializes samples so each delta is computed against the baseline left by
/// the previous one
#[derive(Debug, Default)]
pub struct DeltaEngine {
    baseline: Mutex<MetricsBaseline>,
}

impl DeltaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ping, read counters and connections, then advance the baseline.
    ///
    /// The lock is held across every datastore call and the baseline only
    /// moves once all of them succeeded, so a failed poll loses no deltas.
    pub async fn sample(&self, datastore: &dyn Datastore) -> Result<RateSnapshot, sqlx::Error> {
        let mut baseline = self.baseline.lock().await;

        let started = Instant::now();
        datastore.ping().await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let current = datastore.counters().await?;
        let connections = datastore.connections().await?;
        let deltas = baseline.advance(current);

        Ok(RateSnapshot {
            deltas,
            connections,
            latency_ms,
        })
    }

    pub async fn baseline(&self) -> MetricsBaseline {
        *self.baseline.lock().await
    }
}

/// Datastore health views served by the `/db` routes
pub struct MetricsService {
    datastore: Arc<dyn Datastore>,
    engine: DeltaEngine,
}

impl MetricsService {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self {
            datastore,
            engine: DeltaEngine::new(),
        }
    }

    pub async fn live_status(&self) -> Result<LiveStatus, sqlx::Error> {
        let snapshot = self.engine.sample(self.datastore.as_ref()).await?;

        tracing::debug!(
            "Live status: {} connections, {} ms, {} tx since last poll",
            snapshot.connections,
            snapshot.latency_ms,
            snapshot.deltas.transactions
        );

        Ok(LiveStatus::new(snapshot))
    }

    pub async fn metadata(&self) -> Result<DatastoreMetadata, sqlx::Error> {
        self.datastore.metadata().await
    }
}
