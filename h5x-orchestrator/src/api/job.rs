//! Job API Handlers
//!
//! HTTP endpoints for submitting and polling obfuscation jobs.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use h5x_core::domain::job::JobRecord;
use h5x_core::dto::job::{SubmitJob, SubmitJobResponse};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /api/obfuscate
/// Start a new obfuscation job and return its identifier immediately
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<SubmitJob>, JsonRejection>,
) -> ApiResult<Json<SubmitJobResponse>> {
    let Json(req) = payload?;
    tracing::info!("Submitting obfuscation job for: {}", req.input_file);

    let job_id = state.jobs.submit(req)?;

    Ok(Json(SubmitJobResponse {
        success: true,
        job_id,
    }))
}

/// GET /api/task/{id}
/// Current state of a job
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    tracing::debug!("Getting job: {}", id);

    let record = state.jobs.get_status(&id)?;
    Ok(Json(record))
}

/// GET /api/tasks
/// Every job known to this process, most recent first
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobRecord>> {
    tracing::debug!("Listing all jobs");
    Json(state.jobs.list_jobs())
}
