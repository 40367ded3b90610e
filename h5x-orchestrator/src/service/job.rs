//! Job Service
//!
//! Accepts submissions, hands each job to its own runner task and answers
//! status queries from the registry.

use std::sync::Arc;
use std::time::Duration;

use h5x_core::domain::job::{JobParameters, JobRecord};
use h5x_core::dto::job::SubmitJob;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::repository::{JobRegistry, RegistryError};
use crate::runner::JobRunner;

/// Levels accepted by `h5x-cli --level`
pub const LEVEL_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Task not found")]
    NotFound(String),

    #[error("Orchestrator is shutting down, no new jobs accepted")]
    ShuttingDown,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Owns job submission and every runner task it spawns
pub struct JobService {
    registry: JobRegistry,
    runner: Arc<JobRunner>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl JobService {
    pub fn new(registry: JobRegistry, runner: JobRunner) -> Self {
        Self {
            registry,
            runner: Arc::new(runner),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Validate, register and start a job. Returns as soon as the runner
    /// task is spawned.
    pub fn submit(&self, req: SubmitJob) -> Result<Uuid, JobError> {
        if self.tracker.is_closed() {
            return Err(JobError::ShuttingDown);
        }

        let parameters = validate(req)?;
        let record = JobRecord::pending(Uuid::new_v4(), parameters.clone());
        let writer = self.registry.create(record)?;
        let id = writer.id();

        tracing::info!(
            "Job created: {} (input: {}, level {})",
            id,
            parameters.input_file,
            parameters.level
        );

        let runner = self.runner.clone();
        let cancel = self.cancel.child_token();
        self.tracker
            .spawn(async move { runner.run(writer, parameters, cancel).await });

        Ok(id)
    }

    /// Current snapshot of a job
    ///
    /// Identifiers that do not parse are reported the same way as unknown ones.
    pub fn get_status(&self, id: &str) -> Result<JobRecord, JobError> {
        Uuid::parse_str(id)
            .ok()
            .and_then(|uuid| self.registry.get(uuid))
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// All jobs, most recently started first
    pub fn list_jobs(&self) -> Vec<JobRecord> {
        self.registry.list()
    }

    /// Number of runner tasks still in flight
    pub fn active_jobs(&self) -> usize {
        self.tracker.len()
    }

    /// Stops accepting submissions, waits up to `grace` for running jobs and
    /// cancels whatever is left
    pub async fn shutdown(&self, grace: Duration) {
        self.tracker.close();

        let in_flight = self.tracker.len();
        if in_flight == 0 {
            return;
        }

        tracing::info!(
            "Waiting up to {:?} for {} running job(s) to finish",
            grace,
            in_flight
        );

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            tracing::warn!(
                "Grace period elapsed, cancelling {} job(s)",
                self.tracker.len()
            );
            self.cancel.cancel();
            self.tracker.wait().await;
        }
    }
}

fn validate(req: SubmitJob) -> Result<JobParameters, JobError> {
    let input_file = req.input_file.trim();
    if input_file.is_empty() {
        return Err(JobError::InvalidInput("No input file specified".to_string()));
    }

    let output_name = req.output_name.trim();
    if output_name.is_empty() {
        return Err(JobError::InvalidInput(
            "Output name cannot be empty".to_string(),
        ));
    }

    if !LEVEL_RANGE.contains(&req.level) {
        return Err(JobError::InvalidInput(format!(
            "Obfuscation level must be between {} and {}, got {}",
            LEVEL_RANGE.start(),
            LEVEL_RANGE.end(),
            req.level
        )));
    }

    Ok(JobParameters {
        input_file: input_file.to_string(),
        output_name: output_name.to_string(),
        // Range checked above
        level: req.level as u8,
    })
}
