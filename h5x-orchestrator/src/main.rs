use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod parser;
pub mod repository;
pub mod runner;
pub mod service;

use crate::repository::JobRegistry;
use crate::runner::{JobRunner, ObfuscatorInvoker, ProcessInvoker, RunnerSettings};
use crate::service::job_service::JobService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "h5x_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting H5X Orchestrator...");

    let config = config::Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Obfuscator: {} (project root: {})",
        config.cli_binary().display(),
        config.project_root.display()
    );
    match config.job_timeout {
        Some(timeout) => tracing::info!("Job timeout: {:?}", timeout),
        None => tracing::warn!("Job timeout disabled"),
    }

    let invoker: Arc<dyn ObfuscatorInvoker> =
        Arc::new(ProcessInvoker::new(config.cli_binary(), &config.project_root));
    let runner = JobRunner::new(
        invoker.clone(),
        RunnerSettings {
            timeout: config.job_timeout,
            checkpoint_pause: config.checkpoint_pause,
        },
    );
    let jobs = Arc::new(JobService::new(JobRegistry::new(), runner));

    // Build router with all API endpoints
    let app = api::create_router(api::AppState {
        jobs: jobs.clone(),
        invoker,
        artifacts_dir: config.artifacts_dir(),
        config_path: config.config_file(),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("HTTP server stopped, draining jobs");
    jobs.shutdown(config.shutdown_grace).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
