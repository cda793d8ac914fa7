//! Datastore metrics domain types

use serde::{Deserialize, Serialize};

/// Cumulative counters read from the datastore at one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeCounters {
    /// Committed plus rolled back transactions
    pub transactions: u64,
    pub inserts: u64,
    pub selects: u64,
}

/// Per-poll increase of each counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDeltas {
    pub transactions: u64,
    pub inserts: u64,
    pub selects: u64,
}

/// Result of a single delta sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub deltas: CounterDeltas,
    /// Open backends at the time of the sample
    pub connections: i64,
    /// Round trip of the liveness query
    pub latency_ms: u64,
}

/// Body of `GET /db/live-status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub connections: i64,
    pub latency_ms: u64,
    /// Transactions since the previous poll
    pub qps: u64,
    pub inserts_per_sec: u64,
    pub selects_per_sec: u64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl LiveStatus {
    pub fn new(snapshot: RateSnapshot) -> Self {
        Self {
            connections: snapshot.connections,
            latency_ms: snapshot.latency_ms,
            qps: snapshot.deltas.transactions,
            inserts_per_sec: snapshot.deltas.inserts,
            selects_per_sec: snapshot.deltas.selects,
            updated_at: chrono::Utc::now(),
        }
    }
}

/// TimescaleDB statistics; every field absent when the extension is missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimescaleInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_chunks: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<i64>,
}

/// Body of `GET /db/metadata`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatastoreMetadata {
    pub server_version: String,
    pub uptime_start: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: i64,
    pub total_tables: i64,
    pub size_pretty: String,
    pub size_bytes: i64,
    pub timescale: TimescaleInfo,
    pub status: String,
}
