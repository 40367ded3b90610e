//! System status command handler

use anyhow::Result;
use colored::*;
use h5x_client::OrchestratorClient;

use crate::config::Config;

/// Show obfuscator availability and configuration health
pub async fn status(config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);
    let health = client.health().await?;
    let status = client.system_status().await?;

    println!("{}", "System Status:".bold());
    println!(
        "  Orchestrator:  {} ({})",
        client.base_url().cyan(),
        health.status
    );
    println!("  Active jobs:   {}", health.active_jobs);
    println!("  Obfuscator:    {}", check(status.cli_available));
    println!("  Version:       {}", status.cli_version);
    println!("  Config found:  {}", check(status.config_exists));
    println!("  Config valid:  {}", check(status.config_valid));
    println!(
        "  Checked at:    {}",
        status
            .timestamp
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );

    Ok(())
}

fn check(ok: bool) -> ColoredString {
    if ok { "✓".green() } else { "✗".red() }
}
