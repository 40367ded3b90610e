//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services sit between the HTTP handlers and the registry/runner.

pub mod artifact;
pub mod job;
pub mod system;

// Re-export for convenience
pub use artifact as artifact_service;
pub use job as job_service;
pub use system as system_service;
