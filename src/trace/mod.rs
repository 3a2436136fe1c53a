//! Trace formats and readers.
//!
//! A trace format knows how to recognise and parse the lines of one kind of
//! trace file. The `TraceFileReader` drives a format over a file and exposes
//! the result through the `TraceProducer` contract.

pub mod prezi;
pub mod reader;

use crate::job::{Job, JobFactory};

pub use self::prezi::{PreziExecutable, PreziFormat};
pub use self::reader::{ReaderStats, TraceFileReader, TraceWindow};

/// Outcome of turning a single trace line into a job.
#[derive(Debug)]
pub enum LineOutcome {
    Parsed(Job),
    Skipped(String),
}

/// A line-oriented trace format.
pub trait TraceFormat {
    /// Human readable name of the format.
    fn name(&self) -> &str;

    /// Returns true if `line` describes a job in this format.
    fn is_trace_line(&self, line: &str) -> bool;

    /// Builds a job out of a line accepted by `is_trace_line`.
    fn create_job_from_line(&self, line: &str, factory: &dyn JobFactory) -> LineOutcome;

    /// Receives every line that is not a trace line.
    fn collect_metadata(&mut self, _line: &str) {}
}
