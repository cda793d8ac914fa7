//! Orpheus CLI
//!
//! Command-line interface for the Orpheus console.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "orpheus")]
#[command(about = "Launch and manage Orpheus cluster jobs", long_about = None)]
struct Cli {
    /// Console URL
    #[arg(long, env = "ORPHEUS_CONSOLE_URL", default_value = "http://localhost:3000")]
    console_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        console_url: cli.console_url,
    };

    handle_command(cli.command, &config).await
}
