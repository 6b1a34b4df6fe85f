//! Per-row failure kinds
//!
//! A `JobError` fails one job record. The batch logs it and moves on to the
//! next row; only file-level problems abort a run.

use std::time::Duration;

/// Errors produced while generating or executing a single job's statements.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Engine unreachable, transport failure or rejected credentials.
    #[error("connection to query engine failed: {0}")]
    Connectivity(String),

    /// Table, schema or catalog missing during introspection.
    #[error("not found: {0}")]
    NotFound(String),

    /// Required field missing or unparsable in the input row.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Statement rejected by the engine (syntax, permission, ...).
    #[error("statement failed [{error_name}]: {message}")]
    Execution { error_name: String, message: String },

    /// The bounded per-statement timeout expired.
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),
}

impl JobError {
    /// Short machine-friendly name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Connectivity(_) => "connectivity",
            JobError::NotFound(_) => "not_found",
            JobError::MalformedInput(_) => "malformed_input",
            JobError::Execution { .. } => "execution",
            JobError::Timeout(_) => "timeout",
        }
    }
}

impl From<reqwest::Error> for JobError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            JobError::Execution {
                error_name: "INVALID_RESPONSE".to_string(),
                message: e.to_string(),
            }
        } else {
            JobError::Connectivity(e.to_string())
        }
    }
}
