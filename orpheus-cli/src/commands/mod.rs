//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod bulk;
mod cron;
mod job;
mod status;

pub use bulk::BulkCommands;
pub use cron::CronCommands;
pub use job::JobCommands;
pub use status::StatusCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Scheduled jobs
    Cron {
        #[command(subcommand)]
        command: CronCommands,
    },
    /// Apply one operation to several jobs
    Bulk {
        #[command(subcommand)]
        command: BulkCommands,
    },
    /// Cluster and datastore status
    Status {
        #[command(subcommand)]
        command: StatusCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Cron { command } => cron::handle_cron_command(command, config).await,
        Commands::Bulk { command } => bulk::handle_bulk_command(command, config).await,
        Commands::Status { command } => status::handle_status_command(command, config).await,
    }
}
