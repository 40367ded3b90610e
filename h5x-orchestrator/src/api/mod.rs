//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod artifact;
pub mod error;
pub mod health;
pub mod job;
pub mod system;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::runner::ObfuscatorInvoker;
use crate::service::job_service::JobService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<JobService>,
    pub invoker: Arc<dyn ObfuscatorInvoker>,
    /// Directory the obfuscator writes its outputs to
    pub artifacts_dir: PathBuf,
    /// Obfuscator configuration file checked by the status probe
    pub config_path: PathBuf,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Job endpoints
        .route("/api/obfuscate", post(job::submit_job))
        .route("/api/task/{id}", get(job::get_job))
        .route("/api/tasks", get(job::list_jobs))
        // Artifacts and system
        .route("/api/recent-files", get(artifact::recent_files))
        .route("/api/status", get(system::system_status))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
