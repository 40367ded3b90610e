//! Job command handlers
//!
//! Submitting jobs, inspecting them and following them to completion.

use std::time::Duration;

use anyhow::{Result, bail};
use colored::*;
use h5x_client::OrchestratorClient;
use h5x_core::domain::job::{JobRecord, JobResult, JobStatus};
use h5x_core::domain::metrics::MetricsRecord;
use h5x_core::dto::job::SubmitJob;
use uuid::Uuid;

use crate::commands::artifact::format_size;
use crate::config::Config;
use crate::id_resolver::resolve_job_id;
use crate::types::IdOrPrefix;

const WATCH_INTERVAL: Duration = Duration::from_millis(500);

/// Submit a job, optionally following it to completion
pub async fn submit(
    config: &Config,
    input_file: String,
    output_name: String,
    level: i64,
    watch: bool,
) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    let job_id = client
        .submit_job(&SubmitJob {
            input_file,
            output_name,
            level,
        })
        .await?;

    println!("{} Job submitted: {}", "✓".green(), job_id.to_string().cyan());

    if watch {
        println!();
        follow(&client, job_id, WATCH_INTERVAL).await
    } else {
        println!(
            "  Follow it with: {}",
            format!("h5x-jobs watch {}", job_id).dimmed()
        );
        Ok(())
    }
}

/// Show the current state of one job
pub async fn status(config: &Config, id: &str, json: bool) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);
    let job_id = resolve_job_id(&client, &IdOrPrefix::parse(id)).await?;

    let record = client.get_job(job_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_job_details(&record);
    }

    Ok(())
}

/// Follow a job until it reaches a terminal status
pub async fn watch(config: &Config, id: &str, interval_ms: u64) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);
    let job_id = resolve_job_id(&client, &IdOrPrefix::parse(id)).await?;

    follow(&client, job_id, Duration::from_millis(interval_ms.max(50))).await
}

/// List all jobs
pub async fn list(config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);
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

/// Prints every stage change, then the final record. Fails if the job failed.
async fn follow(client: &OrchestratorClient, job_id: Uuid, interval: Duration) -> Result<()> {
    let mut last_stage = String::new();

    let record = client
        .wait_for_job(job_id, interval, None, |record| {
            if record.stage != last_stage {
                println!(
                    "  {} {}",
                    format!("[{:>3}%]", record.progress).cyan(),
                    record.stage
                );
                last_stage = record.stage.clone();
            }
        })
        .await?;

    println!();
    print_job_details(&record);

    if record.status == JobStatus::Failed {
        bail!("Job {} failed", job_id);
    }
    Ok(())
}

/// Print a one-entry summary for job listings
fn print_job_summary(job: &JobRecord) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!(
        "    Input:    {} (level {})",
        job.parameters.input_file, job.parameters.level
    );
    println!(
        "    Status:   {} {}",
        colorize_status(job.status),
        format!("{}% {}", job.progress, job.stage).dimmed()
    );
    println!(
        "    Started:  {}",
        job.started_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed job information
fn print_job_details(job: &JobRecord) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    println!("  Status:      {}", colorize_status(job.status));
    println!("  Progress:    {}%", job.progress);
    println!("  Stage:       {}", job.stage);
    println!("  Input:       {}", job.parameters.input_file);
    println!("  Output:      {}", job.parameters.output_name);
    println!("  Level:       {}", job.parameters.level);
    println!(
        "  Started:     {}",
        job.started_at.format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(completed) = job.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));
        let duration = completed.signed_duration_since(job.started_at);
        println!("  Duration:    {}s", duration.num_seconds());
    }

    if let Some(result) = &job.result {
        print_result(result);
    }
}

fn print_result(result: &JobResult) {
    println!("\n{}", "Result:".bold());
    println!(
        "  Success:    {}",
        if result.success {
            "✓".green()
        } else {
            "✗".red()
        }
    );
    if let Some(code) = result.exit_code {
        println!("  Exit Code:  {}", code);
    }
    if let Some(failure) = result.failure {
        println!("  Failure:    {:?}", failure);
    }
    if let Some(output) = &result.output_file {
        println!("  Output:     {}", output);
    }

    if let Some(metrics) = &result.metrics {
        print_metrics(metrics);
    }

    if !result.metrics_warnings.is_empty() {
        println!("\n{}", "Metric warnings:".yellow().bold());
        for warning in &result.metrics_warnings {
            println!("  {}", warning.yellow());
        }
    }

    if let Some(error) = &result.error_message {
        println!("\n{}", "Error:".bold());
        println!("{}", error.trim_end().red());
    }
}

fn print_metrics(metrics: &MetricsRecord) {
    println!("\n{}", "Metrics:".bold());
    println!("  Functions processed:   {}", metrics.functions_processed);
    println!("  Strings obfuscated:    {}", metrics.strings_obfuscated);
    println!("  Instructions modified: {}", metrics.instructions_modified);
    println!("  Security score:        {}", metrics.security_score);
    println!(
        "  Processing time:       {:.3}s",
        metrics.processing_time_seconds
    );
    println!(
        "  Size:                  {} -> {}",
        format_size(metrics.original_size_bytes),
        format_size(metrics.obfuscated_size_bytes)
    );
    if !metrics.size_increase_label.is_empty() {
        println!("  Size increase:         {}", metrics.size_increase_label);
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
