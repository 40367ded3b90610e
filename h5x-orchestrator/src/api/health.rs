//! Health Check API Handler

use axum::{Json, extract::State};
use h5x_core::domain::system::HealthStatus;

use crate::api::AppState;

/// GET /health
/// Liveness check, answers as long as the HTTP server is up
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        active_jobs: state.jobs.active_jobs(),
    })
}
