//! Output artifact types

use serde::{Deserialize, Serialize};

/// A file produced by the obfuscator in the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: chrono::DateTime<chrono::Utc>,
    pub path: String,
}
