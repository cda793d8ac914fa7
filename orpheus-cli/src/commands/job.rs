//! Job command handlers
//!
//! Handles launching, listing, and controlling jobs, and reading their
//! output.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use orpheus_client::ConsoleClient;
use orpheus_core::domain::workload::{Phase, WorkloadRequest, WorkloadStatus};
use serde_json::{Map, Value};

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Launch a function as a cluster job
    Run {
        /// Function to call
        #[arg(short, long)]
        function: String,

        /// Module the function is imported from
        #[arg(short, long)]
        module: String,

        /// Container image
        #[arg(short, long)]
        image: String,

        /// Arguments as key=value pairs; values are JSON literals, anything
        /// else is passed as a string (e.g., ticker=SPY days=30)
        #[arg(short, long, value_parser = parse_key_val)]
        param: Vec<(String, Value)>,
    },
    /// List jobs with their phase
    List,
    /// Delete a job
    Delete {
        /// Job name
        name: String,
    },
    /// Restart a job (deletes it; nothing is resubmitted)
    Restart {
        /// Job name
        name: String,
    },
    /// Delete a job and launch its original request again
    Relaunch {
        /// Job name
        name: String,
    },
    /// Show the output of a job's pod
    Logs {
        /// Job name
        name: String,
    },
    /// List pods in the jobs namespace
    Pods,
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, Value)> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::Run {
            function,
            module,
            image,
            param,
        } => run_job(&client, function, module, image, param).await,
        JobCommands::List => list_jobs(&client).await,
        JobCommands::Delete { name } => delete_job(&client, &name).await,
        JobCommands::Restart { name } => restart_job(&client, &name).await,
        JobCommands::Relaunch { name } => relaunch_job(&client, &name).await,
        JobCommands::Logs { name } => job_logs(&client, &name).await,
        JobCommands::Pods => list_pods(&client).await,
    }
}

async fn run_job(
    client: &ConsoleClient,
    function: String,
    module: String,
    image: String,
    param: Vec<(String, Value)>,
) -> Result<()> {
    // Keep the command-line order; it becomes the call argument order.
    let params: Map<String, Value> = param.into_iter().collect();

    let launched = client
        .run_job(&WorkloadRequest {
            function,
            params,
            image,
            module,
        })
        .await
        .context("Failed to launch job")?;

    println!("{}", "✓ Job launched".green().bold());
    println!("  Name:      {}", launched.job_name.cyan());
    println!("  Namespace: {}", launched.namespace);
    println!("  Image:     {}", launched.image.dimmed());
    println!("  Code:      {}", launched.code);
    if let Some(created) = launched.created_at {
        println!("  Created:   {}", created.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}

async fn list_jobs(client: &ConsoleClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

async fn delete_job(client: &ConsoleClient, name: &str) -> Result<()> {
    let ack = client.delete_job(name).await?;
    println!("{} Delete accepted for {}", "✓".green(), ack.job.cyan());
    Ok(())
}

async fn restart_job(client: &ConsoleClient, name: &str) -> Result<()> {
    let ack = client.restart_job(name).await?;
    println!("{} Deleted {}", "✓".green(), ack.job.cyan());
    println!(
        "{}",
        "  Restart does not resubmit; use `orpheus job relaunch` to run it again.".dimmed()
    );
    Ok(())
}

async fn relaunch_job(client: &ConsoleClient, name: &str) -> Result<()> {
    match client.relaunch_job(name).await {
        Ok(relaunched) => {
            println!(
                "{} {} relaunched as {}",
                "✓".green(),
                relaunched.job.dimmed(),
                relaunched.job_name.cyan()
            );
            Ok(())
        }
        Err(e) if e.is_conflict() => {
            anyhow::bail!("{} has no stored request to relaunch from", name)
        }
        Err(e) => Err(e.into()),
    }
}

async fn job_logs(client: &ConsoleClient, name: &str) -> Result<()> {
    let logs = match client.job_logs(name).await {
        Ok(logs) => logs,
        Err(e) if e.is_not_found() => {
            println!("{}", format!("No pod found for job {}.", name).yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", format!("Logs for job {}:", name).bold());
    println!("{}", "─".repeat(80).dimmed());
    print!("{}", logs);
    if !logs.ends_with('\n') {
        println!();
    }
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}

async fn list_pods(client: &ConsoleClient) -> Result<()> {
    let pods = client.list_pods().await?;

    if pods.is_empty() {
        println!("{}", "No pods found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} pod(s):", pods.len()).bold());
    println!();
    for pod in pods {
        println!("  {} {}", "▸".cyan(), pod.name);
        println!("    Phase:      {}", pod.phase.as_deref().unwrap_or("Unknown"));
        println!("    Containers: {}", pod.containers.join(", ").dimmed());
        if let Some(started) = pod.start_time {
            println!(
                "    Started:    {}",
                started.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
            );
        }
        println!();
    }

    Ok(())
}

fn print_job_summary(job: &WorkloadStatus) {
    println!("  {} {}", "▸".cyan(), job.name);
    println!("    Phase:   {}", colorize_phase(job.phase));
    println!(
        "    Pods:    {} succeeded, {} failed, {} active",
        job.succeeded, job.failed, job.active
    );
    if let Some(started) = job.start_time {
        println!(
            "    Started: {}",
            started.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    for condition in &job.conditions {
        let reason = condition.reason.as_deref().unwrap_or("-");
        println!("    {}: {}", condition.kind.dimmed(), reason);
    }
    println!();
}

/// Colorize job phase for display
fn colorize_phase(phase: Phase) -> colored::ColoredString {
    let phase_str = phase.to_string();
    match phase {
        Phase::Pending => phase_str.yellow(),
        Phase::Running => phase_str.cyan(),
        Phase::Succeeded => phase_str.green(),
        Phase::Failed => phase_str.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val_literals() {
        assert_eq!(
            parse_key_val("days=30").unwrap(),
            ("days".to_string(), Value::from(30))
        );
        assert_eq!(
            parse_key_val("ticker=SPY").unwrap(),
            ("ticker".to_string(), Value::from("SPY"))
        );
        assert_eq!(
            parse_key_val("flags=[1,2]").unwrap(),
            ("flags".to_string(), serde_json::json!([1, 2]))
        );
    }

    #[test]
    fn test_parse_key_val_splits_on_first_equals() {
        let (key, value) = parse_key_val("expr=a=b").unwrap();
        assert_eq!(key, "expr");
        assert_eq!(value, Value::from("a=b"));
    }

    #[test]
    fn test_parse_key_val_requires_equals() {
        assert!(parse_key_val("ticker").is_err());
    }
}
