//! H5X Core
//!
//! Core types shared by the H5X job orchestrator, its client and the CLI.
//!
//! This crate contains:
//! - Domain types: job records, results, obfuscation metrics, artifacts
//! - DTOs: request/response bodies exchanged over the HTTP API

pub mod domain;
pub mod dto;
