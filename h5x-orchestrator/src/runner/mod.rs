//! Runner Module
//!
//! Drives obfuscation jobs: process invocation plus the checkpoint sequence
//! that turns one invocation into a terminal job record.

pub mod execution;
pub mod process;

pub use execution::{JobRunner, RunnerSettings};
pub use process::{InvocationError, ObfuscatorInvoker, ProcessInvoker, ProcessOutput};
