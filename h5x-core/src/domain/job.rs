//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::metrics::MetricsRecord;

/// Tracked state of one obfuscation run
///
/// Created by the orchestrator at submission time and updated only by the
/// runner that owns the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    /// Percentage in `0..=100`, never decreases within a run
    pub progress: u8,
    pub stage: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(flatten)]
    pub parameters: JobParameters,
    pub result: Option<JobResult>,
}

impl JobRecord {
    /// Creates a freshly submitted record
    pub fn pending(id: Uuid, parameters: JobParameters) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            progress: 0,
            stage: "Queued".to_string(),
            started_at: chrono::Utc::now(),
            completed_at: None,
            parameters,
            result: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Arguments forwarded to the obfuscator for one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobParameters {
    pub input_file: String,
    pub output_name: String,
    pub level: u8,
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and Failed are final; no transition leaves them
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "Pending"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Why a job ended up Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The obfuscator could not be launched at all
    StartupFailure,
    /// The obfuscator ran and exited non-zero
    ExecutionFailure,
    /// The obfuscator exceeded its wall-clock budget and was killed
    Timeout,
    /// The orchestrator shut down while the job was in flight
    Cancelled,
}

/// Outcome of a finished job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub metrics: Option<MetricsRecord>,
    /// Metric lines that were present but could not be converted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    pub stdout: String,
    pub stderr: String,
    pub error_message: Option<String>,
}

impl JobResult {
    /// The obfuscator exited with status zero
    pub fn succeeded(
        stdout: String,
        stderr: String,
        metrics: MetricsRecord,
        metrics_warnings: Vec<String>,
        output_file: String,
    ) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            failure: None,
            metrics: Some(metrics),
            metrics_warnings,
            output_file: Some(output_file),
            stdout,
            stderr,
            error_message: None,
        }
    }

    /// The obfuscator exited non-zero; stderr becomes the error message verbatim
    pub fn execution_failed(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        Self {
            success: false,
            exit_code,
            failure: Some(FailureKind::ExecutionFailure),
            metrics: None,
            metrics_warnings: Vec::new(),
            output_file: None,
            stdout,
            error_message: Some(stderr.clone()),
            stderr,
        }
    }

    /// The job ended without the obfuscator producing output
    pub fn failed(failure: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            failure: Some(failure),
            metrics: None,
            metrics_warnings: Vec::new(),
            output_file: None,
            stdout: String::new(),
            stderr: String::new(),
            error_message: Some(message.into()),
        }
    }
}
