//! H5X HTTP Client
//!
//! A small, type-safe HTTP client for the H5X orchestrator API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use h5x_client::OrchestratorClient;
//! use h5x_core::dto::job::SubmitJob;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OrchestratorClient::new("http://localhost:8080");
//!
//!     let job_id = client.submit_job(&SubmitJob::new("main.cpp")).await?;
//!     let record = client
//!         .wait_for_job(job_id, Duration::from_millis(500), None, |_| {})
//!         .await?;
//!
//!     println!("Job {} finished: {}", job_id, record.status);
//!     Ok(())
//! }
//! ```

mod artifacts;
pub mod error;
mod jobs;
mod system;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the H5X orchestrator API
///
/// Methods are grouped by concern:
/// - Job submission, status polling and listing
/// - Recent output artifacts
/// - System status and health
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become [`ClientError::ApiError`] carrying the
    /// orchestrator's `error` message when the body has one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                error_message(&body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Pulls `error` out of a `{success: false, error}` body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<h5x_core::dto::job::ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}
