//! Obfuscator process invocation
//!
//! Launches `h5x-cli` as a child process and captures its output in full.
//! The child is killed if the future driving it is dropped, which is how
//! timeouts and cancellation stop a running obfuscation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use h5x_core::domain::job::JobParameters;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Errors raised while running the obfuscator
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The process could not be started at all
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process started but waiting for it failed
    #[error("failed to collect output from {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not answer within {after:?}")]
    TimedOut { program: String, after: Duration },
}

/// Runs the external obfuscator
#[async_trait]
pub trait ObfuscatorInvoker: Send + Sync {
    /// Runs `obfuscate <input> -o <output> --level <N>` to completion
    async fn obfuscate(&self, parameters: &JobParameters) -> Result<ProcessOutput, InvocationError>;

    /// Runs `--version` and returns the first line of its stdout
    async fn version(&self) -> Result<String, InvocationError>;
}

/// Invokes the obfuscator binary through `tokio::process`
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    binary: PathBuf,
    working_dir: PathBuf,
    version_timeout: Duration,
}

impl ProcessInvoker {
    /// # Arguments
    /// * `binary` - Path to the `h5x-cli` executable
    /// * `working_dir` - Directory every invocation runs in (the project root)
    pub fn new(binary: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
            version_timeout: Duration::from_secs(10),
        }
    }

    fn program(&self) -> String {
        self.binary.display().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: Command) -> Result<ProcessOutput, InvocationError> {
        let child = cmd.spawn().map_err(|source| InvocationError::Spawn {
            program: self.program(),
            source,
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| InvocationError::Wait {
                program: self.program(),
                source,
            })?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl ObfuscatorInvoker for ProcessInvoker {
    async fn obfuscate(&self, parameters: &JobParameters) -> Result<ProcessOutput, InvocationError> {
        let mut cmd = self.command();
        cmd.arg("obfuscate")
            .arg(&parameters.input_file)
            .arg("-o")
            .arg(&parameters.output_name)
            .arg("--level")
            .arg(parameters.level.to_string());

        debug!("Executing process: {:?}", cmd.as_std());
        self.run(cmd).await
    }

    async fn version(&self) -> Result<String, InvocationError> {
        let mut cmd = self.command();
        cmd.arg("--version");

        let output = tokio::time::timeout(self.version_timeout, self.run(cmd))
            .await
            .map_err(|_| InvocationError::TimedOut {
                program: self.program(),
                after: self.version_timeout,
            })??;

        if !output.success() {
            return Err(InvocationError::Wait {
                program: self.program(),
                source: std::io::Error::other(format!(
                    "--version exited with {:?}",
                    output.exit_code
                )),
            });
        }

        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string())
    }
}
