//! Datastore Statistics Repository
//!
//! PostgreSQL implementation of [`Datastore`] reading `pg_stat_database`
//! and server metadata.

use async_trait::async_trait;
use orpheus_core::domain::metrics::{CumulativeCounters, DatastoreMetadata, TimescaleInfo};
use sqlx::PgPool;

use super::Datastore;

#[derive(Debug, Clone)]
pub struct PgDatastore {
    pool: PgPool,
}

impl PgDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// TimescaleDB statistics, or an empty object when the extension is
    /// absent or its views cannot be read.
    async fn timescale_info(&self) -> TimescaleInfo {
        match self.try_timescale_info().await {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!("TimescaleDB statistics unavailable: {}", e);
                TimescaleInfo::default()
            }
        }
    }

    async fn try_timescale_info(&self) -> Result<TimescaleInfo, sqlx::Error> {
        let installed: Option<String> = sqlx::query_scalar(
            "SELECT extname::text FROM pg_extension WHERE extname = 'timescaledb'",
        )
        .fetch_optional(&self.pool)
        .await?;

        if installed.is_none() {
            return Ok(TimescaleInfo::default());
        }

        let compressed_chunks: i64 = sqlx::query_scalar(
            r#"
            SELECT count(*)
            FROM timescaledb_information.chunks
            WHERE compression_status = 'Compressed'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let (total_bytes, compressed_bytes): (Option<i64>, Option<i64>) = sqlx::query_as(
            r#"
            SELECT sum(total_bytes)::bigint, sum(compressed_bytes)::bigint
            FROM timescaledb_information.hypertable_compression_stats
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(TimescaleInfo {
            compressed_chunks: Some(compressed_chunks),
            compressed_bytes: Some(compressed_bytes.unwrap_or(0)),
            total_bytes: Some(total_bytes.unwrap_or(0)),
        })
    }
}

#[async_trait]
impl Datastore for PgDatastore {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn counters(&self) -> Result<CumulativeCounters, sqlx::Error> {
        let (transactions, inserted, selected): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(sum(xact_commit + xact_rollback), 0)::bigint,
                   COALESCE(sum(tup_inserted), 0)::bigint,
                   COALESCE(sum(tup_fetched), 0)::bigint
            FROM pg_stat_database
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CumulativeCounters {
            transactions: non_negative(transactions),
            inserts: non_negative(inserted),
            selects: non_negative(selected),
        })
    }

    async fn connections(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(sum(numbackends), 0)::bigint FROM pg_stat_database")
            .fetch_one(&self.pool)
            .await
    }

    async fn metadata(&self) -> Result<DatastoreMetadata, sqlx::Error> {
        let (server_version, uptime_start): (String, chrono::DateTime<chrono::Utc>) =
            sqlx::query_as("SELECT version(), pg_postmaster_start_time()")
                .fetch_one(&self.pool)
                .await?;

        let total_tables: i64 = sqlx::query_scalar(
            r#"
            SELECT count(*)
            FROM information_schema.tables
            WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let (size_pretty, size_bytes): (String, i64) = sqlx::query_as(
            r#"
            SELECT pg_size_pretty(pg_database_size(current_database())),
                   pg_database_size(current_database())
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let timescale = self.timescale_info().await;

        Ok(DatastoreMetadata {
            server_version,
            uptime_seconds: (chrono::Utc::now() - uptime_start).num_seconds(),
            uptime_start,
            total_tables,
            size_pretty,
            size_bytes,
            timescale,
            status: "healthy".to_string(),
        })
    }
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
