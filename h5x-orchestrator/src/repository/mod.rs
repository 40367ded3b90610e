//! Repository Module
//!
//! State storage for the orchestrator. Jobs live in memory only and are
//! lost on restart.

pub mod job;

pub use job::{JobRegistry, JobWriter, RegistryError};
