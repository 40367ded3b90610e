//! Artifact Service
//!
//! Lists the files the obfuscator has written to the output directory.

use std::path::Path;

use chrono::{DateTime, Utc};
use h5x_core::domain::artifact::ArtifactInfo;

/// Maximum number of artifacts returned over HTTP
pub const RECENT_LIMIT: usize = 10;

/// Files in `dir`, most recently modified first, at most `limit` of them
///
/// A directory that does not exist yet simply has no artifacts.
pub async fn list_recent(dir: &Path, limit: usize) -> std::io::Result<Vec<ArtifactInfo>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Artifact directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut artifacts = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }

        let modified_at: DateTime<Utc> = metadata.modified()?.into();
        artifacts.push(ArtifactInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            size_bytes: metadata.len(),
            modified_at,
            path: entry.path().display().to_string(),
        });
    }

    artifacts.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    artifacts.truncate(limit);

    Ok(artifacts)
}
