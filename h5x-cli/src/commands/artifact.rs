//! Artifact command handlers

use anyhow::Result;
use colored::*;
use h5x_client::OrchestratorClient;

use crate::config::Config;

/// List recently produced obfuscated files
pub async fn list_recent(config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);
    let artifacts = client.recent_files().await?;

    if artifacts.is_empty() {
        println!("{}", "No obfuscated files found.".yellow());
        return Ok(());
    }

    println!("{}", format!("{} recent file(s):", artifacts.len()).bold());
    println!();
    for artifact in artifacts {
        println!("  {} {}", "▸".cyan(), artifact.name.bold());
        println!("    Size:     {}", format_size(artifact.size_bytes));
        println!(
            "    Modified: {}",
            artifact
                .modified_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
        println!("    Path:     {}", artifact.path.dimmed());
    }

    Ok(())
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
