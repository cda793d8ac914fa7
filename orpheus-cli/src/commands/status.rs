//! Status command handlers
//!
//! Cluster connectivity and datastore health.

use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use orpheus_client::ConsoleClient;
use orpheus_core::domain::metrics::LiveStatus;

use crate::config::Config;

/// Status subcommands
#[derive(Subcommand)]
pub enum StatusCommands {
    /// Check the console can reach the cluster
    Cluster,
    /// Datastore metadata and live rates
    Db {
        /// Keep polling live rates every SECS seconds
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

/// Handle status commands
pub async fn handle_status_command(command: StatusCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        StatusCommands::Cluster => cluster_status(&client).await,
        StatusCommands::Db { watch } => db_status(&client, watch).await,
    }
}

async fn cluster_status(client: &ConsoleClient) -> Result<()> {
    let health = client.cluster_health().await?;

    println!("{}", "Cluster:".bold());
    println!("  Status:     {}", health.status.green());
    println!("  Context:    {}", health.context.cyan());
    println!("  Namespaces: {}", health.namespaces.join(", "));

    Ok(())
}

async fn db_status(client: &ConsoleClient, watch: Option<u64>) -> Result<()> {
    let metadata = client.db_metadata().await?;

    println!("{}", "Datastore:".bold());
    println!("  Version: {}", metadata.server_version);
    println!(
        "  Up since: {} ({}s)",
        metadata.uptime_start.format("%Y-%m-%d %H:%M:%S"),
        metadata.uptime_seconds
    );
    println!("  Tables:  {}", metadata.total_tables);
    println!("  Size:    {}", metadata.size_pretty);
    if let Some(chunks) = metadata.timescale.compressed_chunks {
        println!("  Compressed chunks: {}", chunks);
    }
    println!();

    let Some(secs) = watch else {
        print_live_status(&client.live_status().await?);
        return Ok(());
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        interval.tick().await;
        match client.live_status().await {
            Ok(status) => print_live_status(&status),
            Err(e) => println!("{} {}", "✗".red(), e.to_string().red()),
        }
    }
}

fn print_live_status(status: &LiveStatus) {
    println!(
        "{} conn {}  latency {} ms  tx {}  ins {}  sel {}",
        status.updated_at.format("%H:%M:%S").to_string().dimmed(),
        status.connections.to_string().cyan(),
        status.latency_ms,
        status.qps,
        status.inserts_per_sec,
        status.selects_per_sec
    );
}
