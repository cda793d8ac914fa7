//! Cron job command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use orpheus_client::ConsoleClient;
use orpheus_core::domain::cronjob::CronJobRecord;
use serde_json::Value;

use crate::config::Config;

/// Cron job subcommands
#[derive(Subcommand)]
pub enum CronCommands {
    /// List cron jobs in the jobs namespace
    List,
    /// Create a cron job from a JSON manifest
    Create {
        /// Path to a batch/v1 CronJob manifest in JSON
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Handle cron commands
pub async fn handle_cron_command(command: CronCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        CronCommands::List => list_cron_jobs(&client).await,
        CronCommands::Create { file } => create_cron_job(&client, &file).await,
    }
}

fn read_manifest(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

async fn list_cron_jobs(client: &ConsoleClient) -> Result<()> {
    let cron_jobs = client.list_cron_jobs().await?;

    if cron_jobs.is_empty() {
        println!("{}", "No cron jobs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} cron job(s):", cron_jobs.len()).bold());
    println!();
    for cron_job in &cron_jobs {
        print_cron_job(cron_job);
    }

    Ok(())
}

async fn create_cron_job(client: &ConsoleClient, file: &Path) -> Result<()> {
    let manifest = read_manifest(file)?;

    let created = client
        .create_cron_job(manifest)
        .await
        .context("Failed to create cron job")?;

    println!("{}", "✓ Cron job created".green().bold());
    print_cron_job(&created);

    Ok(())
}

fn print_cron_job(cron_job: &CronJobRecord) {
    let state = if cron_job.suspend {
        "suspended".yellow()
    } else {
        "active".green()
    };

    println!("  {} {} ({})", "▸".cyan(), cron_job.name, state);
    println!("    Schedule: {}", cron_job.schedule);
    println!("    Running:  {}", cron_job.active);
    if let Some(last) = cron_job.last_schedule_time {
        println!(
            "    Last run: {}",
            last.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}
