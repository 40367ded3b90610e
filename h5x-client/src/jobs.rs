//! Job-related API endpoints

use std::time::{Duration, Instant};

use h5x_core::domain::job::JobRecord;
use h5x_core::dto::job::{SubmitJob, SubmitJobResponse};
use uuid::Uuid;

use crate::OrchestratorClient;
use crate::error::{ClientError, Result};

impl OrchestratorClient {
    /// Submit a new obfuscation job
    ///
    /// # Returns
    /// The identifier to poll with [`OrchestratorClient::get_job`]
    pub async fn submit_job(&self, req: &SubmitJob) -> Result<Uuid> {
        let url = format!("{}/api/obfuscate", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        let body: SubmitJobResponse = self.handle_response(response).await?;
        if !body.success {
            return Err(ClientError::Rejected(format!(
                "submission for {} not accepted",
                req.input_file
            )));
        }

        tracing::debug!("Submitted job {}", body.job_id);
        Ok(body.job_id)
    }

    /// Get the current state of a job
    pub async fn get_job(&self, job_id: Uuid) -> Result<JobRecord> {
        let url = format!("{}/api/task/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List every job the orchestrator knows about, newest first
    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        let url = format!("{}/api/tasks", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Poll a job until it reaches a terminal status
    ///
    /// # Arguments
    /// * `job_id` - The job to wait for
    /// * `interval` - Delay between polls
    /// * `timeout` - Give up after this long, `None` waits forever
    /// * `on_update` - Called with every snapshot, including the final one
    pub async fn wait_for_job(
        &self,
        job_id: Uuid,
        interval: Duration,
        timeout: Option<Duration>,
        mut on_update: impl FnMut(&JobRecord),
    ) -> Result<JobRecord> {
        let started = Instant::now();

        loop {
            let record = self.get_job(job_id).await?;
            on_update(&record);

            if record.is_terminal() {
                return Ok(record);
            }

            if timeout.is_some_and(|limit| started.elapsed() >= limit) {
                return Err(ClientError::WaitTimeout(job_id));
            }

            tokio::time::sleep(interval).await;
        }
    }
}
