//! Artifact API endpoints

use h5x_core::domain::artifact::ArtifactInfo;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    /// Most recently produced obfuscated files, newest first
    pub async fn recent_files(&self) -> Result<Vec<ArtifactInfo>> {
        let url = format!("{}/api/recent-files", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
