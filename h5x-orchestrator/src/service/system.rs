//! System Service
//!
//! Reports whether the obfuscator and its configuration are usable.

use std::path::Path;

use h5x_core::domain::system::SystemStatus;

use crate::runner::ObfuscatorInvoker;

pub const VERSION_UNAVAILABLE: &str = "Not available";

/// Probe the obfuscator binary and its configuration file
pub async fn probe(invoker: &dyn ObfuscatorInvoker, config_path: &Path) -> SystemStatus {
    let (cli_available, cli_version) = match invoker.version().await {
        Ok(version) => (true, version),
        Err(e) => {
            tracing::debug!("Obfuscator version probe failed: {}", e);
            (false, VERSION_UNAVAILABLE.to_string())
        }
    };

    let (config_exists, config_valid) = match tokio::fs::read_to_string(config_path).await {
        Ok(contents) => (true, is_valid_config(&contents)),
        Err(_) => (false, false),
    };

    SystemStatus {
        cli_available,
        cli_version,
        config_exists,
        config_valid,
        timestamp: chrono::Utc::now(),
    }
}

/// A usable configuration is a JSON object with an `obfuscation` section
fn is_valid_config(contents: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(contents)
        .map(|value| value.get("obfuscation").is_some())
        .unwrap_or(false)
}
