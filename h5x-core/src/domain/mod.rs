//! Core domain types
//!
//! These types describe obfuscation jobs and what they produce. They are
//! owned by the orchestrator (which keeps them in memory) and read by the
//! client and CLI.

pub mod artifact;
pub mod job;
pub mod metrics;
pub mod system;
