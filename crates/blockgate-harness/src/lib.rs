//! Verification harness for blockgate.
//!
//! This crate provides:
//! - Boundary scenarios: forwarding, balance, liveness, would-block and
//!   constant determinism, each run against a real permit
//! - Structured JSONL logging and artifact indexing for scenario runs
//! - Log validation for evidence produced by earlier runs

#![forbid(unsafe_code)]

pub mod error;
pub mod scenarios;
pub mod structured_log;

pub use error::HarnessError;
pub use scenarios::{ScenarioReport, run_all};
pub use structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
