//! Artifact API Handlers

use axum::{Json, extract::State};
use h5x_core::domain::artifact::ArtifactInfo;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::artifact_service;

/// GET /api/recent-files
/// Most recently produced obfuscated files, newest first
pub async fn recent_files(State(state): State<AppState>) -> ApiResult<Json<Vec<ArtifactInfo>>> {
    tracing::debug!("Listing recent artifacts in {}", state.artifacts_dir.display());

    let artifacts =
        artifact_service::list_recent(&state.artifacts_dir, artifact_service::RECENT_LIMIT)
            .await?;

    Ok(Json(artifacts))
}
