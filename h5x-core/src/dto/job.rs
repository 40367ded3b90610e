//! Job DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_OUTPUT_NAME: &str = "obfuscated_output";
pub const DEFAULT_LEVEL: i64 = 3;

/// Request to start a new obfuscation job
///
/// Missing fields deserialize to their defaults so that validation, not the
/// JSON extractor, decides what is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJob {
    #[serde(default, alias = "input_file")]
    pub input_file: String,
    #[serde(default = "default_output_name", alias = "output_name")]
    pub output_name: String,
    #[serde(default = "default_level")]
    pub level: i64,
}

impl SubmitJob {
    pub fn new(input_file: impl Into<String>) -> Self {
        Self {
            input_file: input_file.into(),
            output_name: default_output_name(),
            level: DEFAULT_LEVEL,
        }
    }
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_string()
}

fn default_level() -> i64 {
    DEFAULT_LEVEL
}

/// Response to an accepted submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobResponse {
    pub success: bool,
    pub job_id: Uuid,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
