//! Job runner
//!
//! Drives one obfuscation job from Pending to a terminal state:
//! - Reports fixed checkpoints so pollers see movement during the long call
//! - Invokes the obfuscator once, never retrying
//! - Parses the report on success, records stderr on failure
//! - Enforces the optional timeout and reacts to shutdown cancellation

use std::sync::Arc;
use std::time::Duration;

use h5x_core::domain::job::{FailureKind, JobParameters, JobResult};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::parser;
use crate::repository::JobWriter;
use crate::runner::process::{InvocationError, ObfuscatorInvoker, ProcessOutput};

pub const STAGE_INITIALIZING: &str = "Initializing...";
pub const STAGE_COMPILING: &str = "Compiling to LLVM IR...";
pub const STAGE_APPLYING: &str = "Applying obfuscation passes...";
pub const STAGE_COMPLETED: &str = "Completed successfully";
pub const STAGE_FAILED: &str = "Obfuscation failed";
pub const STAGE_START_FAILED: &str = "Failed to start obfuscator";
pub const STAGE_TIMED_OUT: &str = "Timed out";
pub const STAGE_CANCELLED: &str = "Cancelled";

const CHECKPOINT_INVOKING: u8 = 20;
const CHECKPOINT_INVOKED: u8 = 80;

/// Tunables for job execution
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Hard ceiling on the obfuscator's wall-clock time, `None` for no limit
    pub timeout: Option<Duration>,
    /// Pause after each checkpoint so pollers can observe it
    pub checkpoint_pause: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(300)),
            checkpoint_pause: Duration::from_secs(1),
        }
    }
}

/// How the invocation ended
enum Outcome {
    Finished(ProcessOutput),
    StartFailed(InvocationError),
    TimedOut(Duration),
    Cancelled,
}

/// Executes jobs against an obfuscator
pub struct JobRunner {
    invoker: Arc<dyn ObfuscatorInvoker>,
    settings: RunnerSettings,
}

impl JobRunner {
    pub fn new(invoker: Arc<dyn ObfuscatorInvoker>, settings: RunnerSettings) -> Self {
        Self { invoker, settings }
    }

    /// Runs one job to completion, consuming its writer
    ///
    /// Every outcome, including cancellation, leaves a terminal record.
    pub async fn run(&self, writer: JobWriter, parameters: JobParameters, cancel: CancellationToken) {
        let job_id = writer.id();
        info!(
            "Starting job {}: {} -> {} (level {})",
            job_id, parameters.input_file, parameters.output_name, parameters.level
        );

        writer.start(STAGE_INITIALIZING);
        writer.checkpoint(CHECKPOINT_INVOKING, STAGE_COMPILING);
        if !self.pause(&cancel).await {
            return Self::cancel(writer);
        }

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Outcome::Cancelled,
            res = with_timeout(self.settings.timeout, self.invoker.obfuscate(&parameters)) => match res {
                Ok(Ok(output)) => Outcome::Finished(output),
                Ok(Err(e)) => Outcome::StartFailed(e),
                Err(after) => Outcome::TimedOut(after),
            },
        };

        let output = match outcome {
            Outcome::Finished(output) => output,
            Outcome::StartFailed(e @ InvocationError::Spawn { .. }) => {
                error!("Job {} could not start the obfuscator: {}", job_id, e);
                let result = JobResult::failed(FailureKind::StartupFailure, e.to_string());
                return writer.finish(result, STAGE_START_FAILED);
            }
            Outcome::StartFailed(e @ InvocationError::Wait { .. }) => {
                error!("Job {} lost track of the obfuscator: {}", job_id, e);
                let result = JobResult::failed(FailureKind::ExecutionFailure, e.to_string());
                return writer.finish(result, STAGE_FAILED);
            }
            Outcome::StartFailed(InvocationError::TimedOut { after, .. }) => {
                warn!("Job {} timed out after {:?}, obfuscator killed", job_id, after);
                return Self::time_out(writer, after);
            }
            Outcome::TimedOut(after) => {
                warn!("Job {} timed out after {:?}, obfuscator killed", job_id, after);
                return Self::time_out(writer, after);
            }
            Outcome::Cancelled => return Self::cancel(writer),
        };

        // The process has exited, so its outcome is recorded even if
        // cancellation cuts this pause short
        writer.checkpoint(CHECKPOINT_INVOKED, STAGE_APPLYING);
        self.pause(&cancel).await;

        if !output.success() {
            warn!(
                "Job {} failed: obfuscator exited with {:?}",
                job_id, output.exit_code
            );
            let result = JobResult::execution_failed(output.exit_code, output.stdout, output.stderr);
            return writer.finish(result, STAGE_FAILED);
        }

        let extraction = parser::extract_metrics(&output.stdout);
        for err in &extraction.errors {
            warn!("Job {}: metric defaulted to zero: {}", job_id, err);
        }

        let result = JobResult::succeeded(
            output.stdout,
            output.stderr,
            extraction.metrics,
            extraction.errors.iter().map(ToString::to_string).collect(),
            parameters.output_name,
        );
        writer.finish(result, STAGE_COMPLETED);

        info!("Job {} completed successfully", job_id);
    }

    /// Sleeps for the checkpoint pause. Returns false if cancelled meanwhile.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        if self.settings.checkpoint_pause.is_zero() {
            return !cancel.is_cancelled();
        }

        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.settings.checkpoint_pause) => true,
        }
    }

    fn time_out(writer: JobWriter, after: Duration) {
        let result = JobResult::failed(
            FailureKind::Timeout,
            format!("Obfuscation process timed out after {}s", after.as_secs()),
        );
        writer.finish(result, STAGE_TIMED_OUT);
    }

    fn cancel(writer: JobWriter) {
        warn!("Job {} cancelled by shutdown", writer.id());
        let result = JobResult::failed(
            FailureKind::Cancelled,
            "Orchestrator shut down before the job finished",
        );
        writer.finish(result, STAGE_CANCELLED);
    }
}

/// Awaits `fut`, giving up after `limit` if one is set
async fn with_timeout<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, Duration> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| limit),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::JobRegistry;
    use crate::runner::process::scripted::{Script, ScriptedInvoker};
    use h5x_core::domain::job::{JobRecord, JobStatus};
    use uuid::Uuid;

    fn parameters() -> JobParameters {
        JobParameters {
            input_file: "uploads/main.cpp".to_string(),
            output_name: "protected_main".to_string(),
            level: 3,
        }
    }

    fn settings() -> RunnerSettings {
        RunnerSettings {
            timeout: Some(Duration::from_secs(5)),
            checkpoint_pause: Duration::ZERO,
        }
    }

    async fn run_job(invoker: ScriptedInvoker, settings: RunnerSettings) -> JobRecord {
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();
        let id = writer.id();

        let runner = JobRunner::new(Arc::new(invoker), settings);
        runner.run(writer, parameters(), CancellationToken::new()).await;

        registry.get(id).unwrap()
    }

    #[tokio::test]
    async fn test_successful_run() {
        let invoker = ScriptedInvoker::succeeding(
            "Functions Processed: 42\nSecurity Score: 8.5/10\nProcessing Time: 3.2s\n",
        );
        let record = run_job(invoker, settings()).await;

        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.progress, 100);
        assert_eq!(record.stage, STAGE_COMPLETED);
        assert!(record.completed_at.is_some());

        let result = record.result.unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.output_file.as_deref(), Some("protected_main"));
        let metrics = result.metrics.unwrap();
        assert_eq!(metrics.functions_processed, 42);
        assert_eq!(metrics.security_score, 8.5);
        assert_eq!(metrics.processing_time_seconds, 3.2);
        assert!(result.stdout.contains("Functions Processed"));
    }

    #[tokio::test]
    async fn test_invokes_with_job_parameters() {
        let invoker = Arc::new(ScriptedInvoker::succeeding(""));
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();

        JobRunner::new(invoker.clone(), settings())
            .run(writer, parameters(), CancellationToken::new())
            .await;

        assert_eq!(invoker.calls(), vec![parameters()]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_fails_with_stderr() {
        let invoker = ScriptedInvoker::new(Script::Exit {
            code: 1,
            stdout: "Obfuscating uploads/main.cpp...\n",
            stderr: "error: unsupported construct\n",
        });
        let record = run_job(invoker, settings()).await;

        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.stage, STAGE_FAILED);
        assert_eq!(record.progress, 80);

        let result = record.result.unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.failure, Some(FailureKind::ExecutionFailure));
        assert_eq!(
            result.error_message.as_deref(),
            Some("error: unsupported construct\n")
        );
        assert_eq!(result.stdout, "Obfuscating uploads/main.cpp...\n");
        assert!(result.metrics.is_none());
    }

    #[tokio::test]
    async fn test_startup_failure() {
        let record = run_job(ScriptedInvoker::new(Script::SpawnError), settings()).await;

        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.stage, STAGE_START_FAILED);

        let result = record.result.unwrap();
        assert_eq!(result.failure, Some(FailureKind::StartupFailure));
        assert!(result.exit_code.is_none());
        assert!(result.metrics.is_none());
        assert!(result.error_message.unwrap().contains("failed to start"));
    }

    #[tokio::test]
    async fn test_lost_process_is_execution_failure() {
        let record = run_job(ScriptedInvoker::new(Script::WaitError), settings()).await;

        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.stage, STAGE_FAILED);

        let result = record.result.unwrap();
        assert_eq!(result.failure, Some(FailureKind::ExecutionFailure));
        assert!(result.exit_code.is_none());
        assert!(result.error_message.unwrap().contains("failed to collect output"));
    }

    #[tokio::test]
    async fn test_cancel_after_exit_keeps_result() {
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();
        let id = writer.id();
        let cancel = CancellationToken::new();

        let runner = JobRunner::new(
            Arc::new(
                ScriptedInvoker::succeeding("Functions Processed: 7\n")
                    .with_delay(Duration::from_millis(50)),
            ),
            RunnerSettings {
                timeout: Some(Duration::from_secs(5)),
                checkpoint_pause: Duration::from_millis(300),
            },
        );
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { runner.run(writer, parameters(), cancel).await }
        });

        // 300ms pause, 50ms invocation, then inside the second pause
        tokio::time::sleep(Duration::from_millis(500)).await;
        let during = registry.get(id).unwrap();
        assert_eq!(during.status, JobStatus::Running);
        assert_eq!(during.progress, 80);

        let cancelled_at = std::time::Instant::now();
        cancel.cancel();
        task.await.unwrap();
        assert!(cancelled_at.elapsed() < Duration::from_millis(250));

        let record = registry.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.stage, STAGE_COMPLETED);
        let result = record.result.unwrap();
        assert!(result.success);
        assert!(result.failure.is_none());
        assert_eq!(result.stdout, "Functions Processed: 7\n");
        assert_eq!(result.metrics.unwrap().functions_processed, 7);
    }

    #[tokio::test]
    async fn test_cancel_after_failed_exit_keeps_stderr() {
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();
        let id = writer.id();
        let cancel = CancellationToken::new();

        let runner = JobRunner::new(
            Arc::new(ScriptedInvoker::new(Script::Exit {
                code: 4,
                stdout: "",
                stderr: "bad level\n",
            })),
            RunnerSettings {
                timeout: None,
                checkpoint_pause: Duration::from_millis(200),
            },
        );
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { runner.run(writer, parameters(), cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
        task.await.unwrap();

        let result = registry.get(id).unwrap().result.unwrap();
        assert_eq!(result.failure, Some(FailureKind::ExecutionFailure));
        assert_eq!(result.exit_code, Some(4));
        assert_eq!(result.error_message.as_deref(), Some("bad level\n"));
    }

    #[tokio::test]
    async fn test_parse_degradation_keeps_success() {
        let invoker =
            ScriptedInvoker::succeeding("Functions Processed: lots\nStrings Obfuscated: 9\n");
        let record = run_job(invoker, settings()).await;

        assert_eq!(record.status, JobStatus::Completed);
        let result = record.result.unwrap();
        assert!(result.success);
        assert_eq!(result.metrics_warnings.len(), 1);
        let metrics = result.metrics.unwrap();
        assert_eq!(metrics.functions_processed, 0);
        assert_eq!(metrics.strings_obfuscated, 9);
    }

    #[tokio::test]
    async fn test_timeout() {
        let invoker = ScriptedInvoker::succeeding("").with_delay(Duration::from_secs(10));
        let settings = RunnerSettings {
            timeout: Some(Duration::from_millis(50)),
            checkpoint_pause: Duration::ZERO,
        };
        let record = run_job(invoker, settings).await;

        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.stage, STAGE_TIMED_OUT);
        let result = record.result.unwrap();
        assert_eq!(result.failure, Some(FailureKind::Timeout));
        assert!(result.metrics.is_none());
        assert!(result.error_message.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_no_timeout_waits_for_process() {
        let invoker = ScriptedInvoker::succeeding("").with_delay(Duration::from_millis(100));
        let settings = RunnerSettings {
            timeout: None,
            checkpoint_pause: Duration::ZERO,
        };
        let record = run_job(invoker, settings).await;

        assert_eq!(record.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_cancelled_during_invocation() {
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();
        let id = writer.id();
        let cancel = CancellationToken::new();

        let runner = JobRunner::new(
            Arc::new(ScriptedInvoker::succeeding("").with_delay(Duration::from_secs(10))),
            settings(),
        );
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { runner.run(writer, parameters(), cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        task.await.unwrap();

        let record = registry.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.stage, STAGE_CANCELLED);
        assert_eq!(
            record.result.unwrap().failure,
            Some(FailureKind::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_checkpoints_visible_while_running() {
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();
        let id = writer.id();

        let runner = JobRunner::new(
            Arc::new(ScriptedInvoker::succeeding("").with_delay(Duration::from_millis(300))),
            settings(),
        );
        let task = tokio::spawn(async move {
            runner
                .run(writer, parameters(), CancellationToken::new())
                .await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        let during = registry.get(id).unwrap();
        assert_eq!(during.status, JobStatus::Running);
        assert_eq!(during.progress, 20);
        assert_eq!(during.stage, STAGE_COMPILING);

        task.await.unwrap();
        assert_eq!(registry.get(id).unwrap().progress, 100);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_process_end_to_end() {
        use crate::runner::process::ProcessInvoker;
        use crate::runner::process::tests::fake_cli;

        let dir = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(
            &dir,
            "echo '  Functions Processed: 5'\necho '  Original Size:      2048 bytes'\n",
        );
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();
        let id = writer.id();

        JobRunner::new(Arc::new(ProcessInvoker::new(cli, dir.path())), settings())
            .run(writer, parameters(), CancellationToken::new())
            .await;

        let record = registry.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        let metrics = record.result.unwrap().metrics.unwrap();
        assert_eq!(metrics.functions_processed, 5);
        assert_eq!(metrics.original_size_bytes, 2048);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_process_killed_on_timeout() {
        use crate::runner::process::ProcessInvoker;
        use crate::runner::process::tests::fake_cli;

        let dir = tempfile::tempdir().expect("tempdir");
        let cli = fake_cli(&dir, "sleep 30\n");
        let settings = RunnerSettings {
            timeout: Some(Duration::from_millis(200)),
            checkpoint_pause: Duration::ZERO,
        };
        let registry = JobRegistry::new();
        let writer = registry
            .create(JobRecord::pending(Uuid::new_v4(), parameters()))
            .unwrap();
        let id = writer.id();

        let started = std::time::Instant::now();
        JobRunner::new(Arc::new(ProcessInvoker::new(cli, dir.path())), settings)
            .run(writer, parameters(), CancellationToken::new())
            .await;

        assert!(started.elapsed() < Duration::from_secs(10));
        let result = registry.get(id).unwrap().result.unwrap();
        assert_eq!(result.failure, Some(FailureKind::Timeout));
    }
}
