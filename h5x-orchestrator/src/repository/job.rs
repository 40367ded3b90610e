//! Job Registry
//!
//! In-memory store of every job submitted during the process lifetime.
//!
//! Reads are open to anyone holding the registry. Writes go through a
//! [`JobWriter`], which only [`JobRegistry::create`] hands out and which
//! cannot be cloned, so each record has exactly one writer: the runner that
//! received the writer.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use h5x_core::domain::job::{FailureKind, JobRecord, JobResult, JobStatus};
use uuid::Uuid;

/// Registry error type
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("job {0} already exists")]
    AlreadyExists(Uuid),
}

/// Shared map of job records
///
/// Cloning is cheap and yields another handle to the same map.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new record and returns the only writer for it
    pub fn create(&self, record: JobRecord) -> Result<JobWriter, RegistryError> {
        let id = record.id;
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);

        if jobs.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }
        jobs.insert(id, record);

        Ok(JobWriter {
            registry: self.clone(),
            id,
        })
    }

    /// Snapshot of a single record
    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Snapshot of all records, most recently started first
    pub fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        records
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies `f` to a non-terminal record. Returns false if the record is
    /// missing or already terminal.
    fn update(&self, id: Uuid, f: impl FnOnce(&mut JobRecord)) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        match jobs.get_mut(&id) {
            Some(record) if !record.is_terminal() => {
                f(record);
                true
            }
            _ => false,
        }
    }
}

/// Exclusive write handle for one job record
///
/// Dropping a writer before [`JobWriter::finish`] marks the record Failed.
#[derive(Debug)]
pub struct JobWriter {
    registry: JobRegistry,
    id: Uuid,
}

impl JobWriter {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Moves the record to Running at progress 0
    pub fn start(&self, stage: &str) {
        self.registry.update(self.id, |record| {
            record.status = JobStatus::Running;
            record.progress = 0;
            record.stage = stage.to_string();
        });
    }

    /// Records a progress checkpoint. Progress never moves backwards.
    pub fn checkpoint(&self, progress: u8, stage: &str) {
        self.registry.update(self.id, |record| {
            record.progress = record.progress.max(progress.min(100));
            record.stage = stage.to_string();
        });
    }

    /// Stores the final result and makes the record immutable
    pub fn finish(self, result: JobResult, stage: &str) {
        let status = if result.success {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };

        self.registry.update(self.id, |record| {
            if status == JobStatus::Completed {
                record.progress = 100;
            }
            record.status = status;
            record.stage = stage.to_string();
            record.completed_at = Some(chrono::Utc::now());
            record.result = Some(result);
        });
    }
}

impl Drop for JobWriter {
    fn drop(&mut self) {
        let abandoned = self.registry.update(self.id, |record| {
            record.status = JobStatus::Failed;
            record.stage = "Aborted".to_string();
            record.completed_at = Some(chrono::Utc::now());
            record.result = Some(JobResult::failed(
                FailureKind::Cancelled,
                "Job runner exited without reporting a result",
            ));
        });

        if abandoned {
            tracing::warn!("Job {} abandoned by its runner, marked as failed", self.id);
        }
    }
}
