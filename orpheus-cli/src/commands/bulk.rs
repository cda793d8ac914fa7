//! Bulk command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use orpheus_core::dto::job::{BulkOperation, BulkOutcome};

use crate::config::Config;

/// Bulk subcommands
#[derive(Subcommand)]
pub enum BulkCommands {
    /// Delete every named job
    Delete {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Restart every named job (delete only)
    Restart {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Print the output of every named job
    Logs {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Handle bulk commands
///
/// Exits with an error when any item failed, after printing every result.
pub async fn handle_bulk_command(command: BulkCommands, config: &Config) -> Result<()> {
    let (names, operation) = match command {
        BulkCommands::Delete { names } => (names, BulkOperation::Delete),
        BulkCommands::Restart { names } => (names, BulkOperation::Restart),
        BulkCommands::Logs { names } => (names, BulkOperation::Logs),
    };

    let results = config.client().bulk(names, operation).await?;

    let mut failed = 0;
    for item in &results {
        match &item.outcome {
            BulkOutcome::Succeeded { output } => {
                println!("{} {}", "✓".green(), item.name.cyan());
                if let Some(output) = output {
                    println!("{}", "─".repeat(80).dimmed());
                    print!("{}", output);
                    if !output.ends_with('\n') {
                        println!();
                    }
                    println!("{}", "─".repeat(80).dimmed());
                }
            }
            BulkOutcome::Failed { error } => {
                failed += 1;
                println!("{} {}: {}", "✗".red(), item.name.cyan(), error.red());
            }
        }
    }

    println!();
    println!(
        "{}",
        format!(
            "Bulk {}: {} succeeded, {} failed",
            operation,
            results.len() - failed,
            failed
        )
        .bold()
    );

    if failed > 0 {
        anyhow::bail!("{} of {} job(s) failed", failed, results.len());
    }

    Ok(())
}
