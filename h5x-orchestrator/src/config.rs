//! Orchestrator configuration
//!
//! Defines where the obfuscator lives, where it writes its outputs and how
//! long jobs may run.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API listens on
    pub bind_addr: String,

    /// Obfuscator executable, relative paths resolve against `project_root`
    pub cli_path: PathBuf,

    /// Working directory of every obfuscator invocation
    pub project_root: PathBuf,

    /// Output directory, relative to `project_root` unless absolute
    pub output_dir: PathBuf,

    /// Obfuscator configuration file, relative to `project_root` unless absolute
    pub config_path: PathBuf,

    /// Maximum time the obfuscator may run, `None` for no limit
    pub job_timeout: Option<Duration>,

    /// Pause after each progress checkpoint
    pub checkpoint_pause: Duration,

    /// How long shutdown waits for running jobs before cancelling them
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            cli_path: PathBuf::from("build/h5x-cli"),
            project_root: PathBuf::from("."),
            output_dir: PathBuf::from("output"),
            config_path: PathBuf::from("config/config.json"),
            job_timeout: Some(Duration::from_secs(300)), // 5 minutes
            checkpoint_pause: Duration::from_secs(1),
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - H5X_BIND_ADDR (default: 0.0.0.0:8080)
    /// - H5X_CLI_PATH (default: build/h5x-cli)
    /// - H5X_PROJECT_ROOT (default: .)
    /// - H5X_OUTPUT_DIR (default: output)
    /// - H5X_CONFIG_PATH (default: config/config.json)
    /// - H5X_JOB_TIMEOUT (seconds, default: 300, 0 disables)
    /// - H5X_CHECKPOINT_PAUSE_MS (default: 1000)
    /// - H5X_SHUTDOWN_GRACE (seconds, default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let number = |key: &str| -> anyhow::Result<Option<u64>> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}"))
                })
                .transpose()
        };

        let job_timeout = match number("H5X_JOB_TIMEOUT")? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.job_timeout,
        };

        Ok(Self {
            bind_addr: lookup("H5X_BIND_ADDR").unwrap_or(defaults.bind_addr),
            cli_path: lookup("H5X_CLI_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cli_path),
            project_root: lookup("H5X_PROJECT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.project_root),
            output_dir: lookup("H5X_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            config_path: lookup("H5X_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_path),
            job_timeout,
            checkpoint_pause: number("H5X_CHECKPOINT_PAUSE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.checkpoint_pause),
            shutdown_grace: number("H5X_SHUTDOWN_GRACE")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_grace),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("bind_addr {:?} is not a socket address", self.bind_addr))?;

        if self.cli_path.as_os_str().is_empty() {
            anyhow::bail!("cli_path cannot be empty");
        }

        if self.project_root.as_os_str().is_empty() {
            anyhow::bail!("project_root cannot be empty");
        }

        Ok(())
    }

    /// Obfuscator executable
    pub fn cli_binary(&self) -> PathBuf {
        self.project_root.join(&self.cli_path)
    }

    /// Directory holding the obfuscated outputs
    pub fn artifacts_dir(&self) -> PathBuf {
        self.project_root.join(&self.output_dir).join("obfuscated")
    }

    /// Obfuscator configuration file
    pub fn config_file(&self) -> PathBuf {
        self.project_root.join(&self.config_path)
    }
}
