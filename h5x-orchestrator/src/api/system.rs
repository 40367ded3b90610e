//! System Status API Handler

use axum::{Json, extract::State};
use h5x_core::domain::system::SystemStatus;

use crate::api::AppState;
use crate::service::system_service;

/// GET /api/status
/// Obfuscator availability and configuration health
pub async fn system_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(system_service::probe(state.invoker.as_ref(), &state.config_path).await)
}
