//! System status types

use serde::{Deserialize, Serialize};

/// Availability of the obfuscator binary and its configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub cli_available: bool,
    pub cli_version: String,
    pub config_exists: bool,
    pub config_valid: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Orchestrator liveness, as answered by `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    /// Runner tasks currently in flight
    pub active_jobs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_wire_shape() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "ok", "activeJobs": 2}"#).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.active_jobs, 2);

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "activeJobs": 2}));
    }
}
