//! Error types.
//!
//! Line-level problems never surface here: malformed lines are skipped by the
//! reader. Only exhaustion, I/O and job construction failures are reported.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors reported by trace producers.
#[derive(Error, Debug)]
pub enum TraceError {
    /// The producer cannot provide any further job.
    #[error("no further jobs: {0}")]
    NoFurtherJobs(String),

    /// The trace source could not be opened.
    #[error("cannot open trace {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from an already opened trace failed.
    #[error("error while reading trace: {0}")]
    Io(#[from] io::Error),
}

impl TraceError {
    /// Create a no further jobs error.
    pub fn no_further_jobs(cause: impl Into<String>) -> Self {
        Self::NoFurtherJobs(cause.into())
    }

    /// Returns true if the error signals exhaustion rather than a failure.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::NoFurtherJobs(_))
    }
}

/// Job construction errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// A field does not satisfy the job invariants.
    #[error("invalid {field} for job '{id}': {message}")]
    InvalidArgument {
        id: String,
        field: &'static str,
        message: String,
    },
}

impl JobError {
    pub fn invalid_argument(
        id: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            id: id.into(),
            field,
            message: message.into(),
        }
    }
}

/// Job list analysis errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("cannot analyse an empty job list")]
    EmptyJobList,
}
