//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod artifact;
mod job;
mod system;

use anyhow::Result;
use clap::Subcommand;
use h5x_core::dto::job::{DEFAULT_LEVEL, DEFAULT_OUTPUT_NAME};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a source file for obfuscation
    Submit {
        /// Input file, relative to the orchestrator's project root
        input_file: String,

        /// Name of the obfuscated output
        #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
        output: String,

        /// Obfuscation level
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_LEVEL,
            value_parser = clap::value_parser!(i64).range(1..=5)
        )]
        level: i64,

        /// Follow the job until it finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// Show a job's current state
    Status {
        /// Job ID or unambiguous prefix
        id: String,

        /// Print the raw job record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow a job until it finishes
    Watch {
        /// Job ID or unambiguous prefix
        id: String,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// List all jobs
    Jobs,
    /// List recently produced obfuscated files
    Artifacts,
    /// Show obfuscator and configuration status
    System,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit {
            input_file,
            output,
            level,
            watch,
        } => job::submit(config, input_file, output, level, watch).await,
        Commands::Status { id, json } => job::status(config, &id, json).await,
        Commands::Watch { id, interval_ms } => job::watch(config, &id, interval_ms).await,
        Commands::Jobs => job::list(config).await,
        Commands::Artifacts => artifact::list_recent(config).await,
        Commands::System => system::status(config).await,
    }
}
