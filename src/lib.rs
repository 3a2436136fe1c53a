//! Workload trace ingestion and job list analysis.
//!
//! jobtrace turns textual workload traces into job records ready to be fed to
//! a simulator, and computes summary statistics over job lists.
//!
//! The crate's main components are either __trace producers__ or __job
//! processors__:
//! - A trace producer hands out jobs on request. It implements the
//!   `TraceProducer` trait. Currently, the only producer is the
//!   `TraceFileReader`, driven by a `TraceFormat` such as `PreziFormat`.
//! - A job processor consumes the jobs of one or more traces. It implements
//!   the `JobProcessor` trait. The processors back the CLI subcommands.
//!
//! Job lists are analysed with the functions of the `analysis` module.

pub mod cli;

pub mod error;
pub mod job;
pub mod trace;

pub mod analysis;

pub mod context;
pub mod io;
pub mod processors;

use anyhow::Result;
use tracing::info;

use crate::{
    context::TraceContext,
    error::TraceError,
    job::{DefaultJobFactory, Job},
    trace::{PreziFormat, ReaderStats, TraceFileReader},
};

/// Provides jobs on request.
pub trait TraceProducer {
    /// Returns the jobs the producer has left. The number of jobs is up to the
    /// producer and may be zero.
    fn get_all_jobs(&mut self) -> Result<Vec<Job>, TraceError>;

    /// Returns at most `num` jobs.
    ///
    /// Fails with `TraceError::NoFurtherJobs` if and only if no job can be
    /// returned. A shorter list is returned when fewer than `num` jobs are
    /// left.
    fn get_jobs(&mut self, num: usize) -> Result<Vec<Job>, TraceError>;
}

/// Consumes the jobs read from traces.
pub trait JobProcessor {
    /// Process a batch of jobs.
    fn consume_jobs(&mut self, trace: &str, jobs: Vec<Job>);

    /// Called once a trace has been fully read.
    fn trace_done(&mut self, _trace: &str, _stats: ReaderStats, _headers: &[String]) {}

    /// Destructor function
    fn finalize(&mut self, ctx: &TraceContext) -> Result<()>;
}

/// Pulls every job of a producer, `batch` jobs at a time when a batch size is
/// given.
pub fn drain<T: TraceProducer>(
    producer: &mut T,
    batch: Option<usize>,
    mut sink: impl FnMut(Vec<Job>),
) -> Result<(), TraceError> {
    let Some(num) = batch else {
        sink(producer.get_all_jobs()?);
        return Ok(());
    };

    loop {
        match producer.get_jobs(num) {
            Ok(jobs) => sink(jobs),
            Err(e) if e.is_exhausted() => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

/// Reads every trace of the context and feeds the jobs to `processor`.
pub fn process_traces<P: JobProcessor>(mut processor: P, ctx: &TraceContext) -> Result<()> {
    for path in &ctx.traces {
        let mut reader =
            TraceFileReader::open(path, PreziFormat::new(), ctx.window, DefaultJobFactory)?;
        let name = reader.name().to_string();

        drain(&mut reader, ctx.batch_size, |jobs| {
            processor.consume_jobs(&name, jobs)
        })?;

        info!(trace = %name, stats = ?reader.stats(), "trace processed");
        processor.trace_done(&name, reader.stats(), reader.format().headers());
    }

    processor.finalize(ctx)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::trace::TraceWindow;

    fn reader(text: &str) -> TraceFileReader<PreziFormat, Cursor<Vec<u8>>> {
        TraceFileReader::from_reader(
            "example",
            Cursor::new(text.as_bytes().to_vec()),
            PreziFormat::new(),
            TraceWindow::default(),
            DefaultJobFactory,
        )
    }

    #[test]
    fn test_drain_in_batches() {
        let text = "1 1 a url\n2 1 b url\n3 1 c url\n4 1 d url\n5 1 e url\n";
        let mut batches = vec![];

        drain(&mut reader(text), Some(2), |jobs| batches.push(jobs.len())).unwrap();

        assert_eq!(batches, &[2, 2, 1]);
    }

    #[test]
    fn test_drain_all() {
        let mut batches = vec![];

        drain(&mut reader("bad\n"), None, |jobs| batches.push(jobs.len())).unwrap();

        assert_eq!(batches, &[0]);
    }
}
