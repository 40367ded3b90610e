//! Obfuscation metrics

use serde::{Deserialize, Serialize};

/// Metrics reported by the obfuscator on a successful run
///
/// Every field keeps its zero/empty default when the tool did not print the
/// corresponding line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub functions_processed: u64,
    pub strings_obfuscated: u64,
    pub instructions_modified: u64,
    /// Numerator of the tool's `X/Y` score
    pub security_score: f64,
    pub processing_time_seconds: f64,
    pub original_size_bytes: u64,
    pub obfuscated_size_bytes: u64,
    /// Free text, e.g. `"12.5%"`
    pub size_increase_label: String,
}
