//! System status and health endpoints

use h5x_core::domain::system::{HealthStatus, SystemStatus};

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    /// Obfuscator availability and configuration health
    pub async fn system_status(&self) -> Result<SystemStatus> {
        let url = format!("{}/api/status", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Orchestrator liveness and the number of jobs it is running
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
