use std::path::PathBuf;

use blockgate_permit::BoundaryError;
use thiserror::Error;

/// Errors surfaced by harness commands.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("permit misuse: {0}")]
    Boundary(#[from] BoundaryError),
    #[error("{path}: {errors} invalid log field(s) across {lines} line(s)")]
    InvalidLog {
        path: PathBuf,
        lines: usize,
        errors: usize,
    },
    #[error("unknown output format '{0}' (expected json or plain)")]
    UnknownFormat(String),
    #[error("{failed} of {total} boundary scenario(s) failed")]
    ScenariosFailed { failed: usize, total: usize },
    #[error("scenario thread panicked: {0}")]
    ScenarioPanicked(&'static str),
}
