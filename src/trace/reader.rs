//! Trace file reader.
//!
//! The reader walks a trace forward, one line at a time, and never rewinds.
//! Lines rejected by the format are handed to its metadata collector. Lines
//! accepted by the format are numbered from zero; only those whose number
//! falls in the reader's window are turned into jobs.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::{LineOutcome, TraceFormat};
use crate::{
    error::TraceError,
    job::{Job, JobFactory},
    TraceProducer,
};

/// Range of trace lines to convert into jobs.
///
/// `from` and `to` index the lines accepted by the trace format, the range is
/// `[from, to)`. When `allow_reading_further` is set, `to` is ignored and the
/// reader continues until the end of the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceWindow {
    pub from: usize,
    pub to: usize,
    pub allow_reading_further: bool,
}

impl TraceWindow {
    pub fn new(from: usize, to: usize, allow_reading_further: bool) -> Self {
        Self {
            from,
            to,
            allow_reading_further,
        }
    }

    /// Window starting at `from` and running until the end of the trace.
    pub fn unbounded(from: usize) -> Self {
        Self::new(from, usize::MAX, true)
    }

    /// Exclusive upper bound of the window, if any.
    pub fn limit(&self) -> Option<usize> {
        if self.allow_reading_further {
            None
        } else {
            Some(self.to)
        }
    }
}

impl Default for TraceWindow {
    fn default() -> Self {
        Self::unbounded(0)
    }
}

/// Line counters of a trace reader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReaderStats {
    /// Lines read from the trace.
    pub lines: usize,
    /// Lines accepted by the trace format.
    pub accepted: usize,
    /// Jobs handed out.
    pub emitted: usize,
    /// Accepted lines inside the window that did not produce a job.
    pub skipped: usize,
    /// Lines rejected by the trace format.
    pub ignored: usize,
}

/// Reads jobs out of a line-oriented trace.
pub struct TraceFileReader<F, R = BufReader<File>> {
    name: String,
    format: F,
    factory: Box<dyn JobFactory>,
    window: TraceWindow,
    source: Option<R>,
    stats: ReaderStats,
}

impl<F: TraceFormat> TraceFileReader<F> {
    /// Opens the trace file at `path`.
    pub fn open<P: AsRef<Path>, J: JobFactory + 'static>(
        path: P,
        format: F,
        window: TraceWindow,
        factory: J,
    ) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(trace = %path.display(), format = format.name(), "opened trace");

        Ok(Self::from_reader(
            path.to_string_lossy(),
            BufReader::new(file),
            format,
            window,
            factory,
        ))
    }
}

impl<F: TraceFormat, R: BufRead> TraceFileReader<F, R> {
    /// Reads the trace from an already opened source. `name` is only used in
    /// messages.
    pub fn from_reader<J: JobFactory + 'static>(
        name: impl Into<String>,
        reader: R,
        format: F,
        window: TraceWindow,
        factory: J,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            factory: Box::new(factory),
            window,
            source: Some(reader),
            stats: ReaderStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn window(&self) -> TraceWindow {
        self.window
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Returns true once the underlying source has been released.
    pub fn is_exhausted(&self) -> bool {
        self.source.is_none()
    }

    /// Releases the underlying source. Further requests yield no job.
    pub fn close(&mut self) {
        self.release("closed");
    }

    fn release(&mut self, reason: &str) {
        if self.source.take().is_some() {
            debug!(trace = %self.name, reason, stats = ?self.stats, "released trace");
        }
    }

    fn window_done(&self) -> bool {
        self.window
            .limit()
            .map_or(false, |to| self.stats.accepted >= to)
    }

    /// Reads the next raw line, without its line terminator.
    fn next_line(&mut self) -> Option<io::Result<Vec<u8>>> {
        let source = self.source.as_mut()?;
        let mut buf = Vec::new();

        match source.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                Some(Ok(buf))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Reads up to `max` jobs, or the rest of the window when `max` is `None`.
    fn read_jobs(&mut self, max: Option<usize>) -> Result<Vec<Job>, TraceError> {
        let mut jobs = Vec::new();

        while max.map_or(true, |m| jobs.len() < m) {
            if self.window_done() {
                self.release("window completed");
                break;
            }

            let raw = match self.next_line() {
                None => {
                    self.release("end of trace");
                    break;
                }
                Some(Err(e)) => {
                    self.release("read error");
                    return Err(e.into());
                }
                Some(Ok(raw)) => raw,
            };

            self.stats.lines += 1;

            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(_) => {
                    trace!(trace = %self.name, line = self.stats.lines, "ignoring undecodable line");
                    self.stats.ignored += 1;
                    continue;
                }
            };

            if !self.format.is_trace_line(&line) {
                trace!(trace = %self.name, line = self.stats.lines, "ignoring line");
                self.stats.ignored += 1;
                self.format.collect_metadata(&line);
                continue;
            }

            let index = self.stats.accepted;
            self.stats.accepted += 1;

            if index < self.window.from {
                continue;
            }

            match self
                .format
                .create_job_from_line(&line, self.factory.as_ref())
            {
                LineOutcome::Parsed(job) => jobs.push(job),
                LineOutcome::Skipped(reason) => {
                    warn!(trace = %self.name, line = self.stats.lines, "skipping job: {}", reason);
                    self.stats.skipped += 1;
                }
            }
        }

        self.stats.emitted += jobs.len();

        Ok(jobs)
    }
}

impl<F: TraceFormat, R: BufRead> TraceProducer for TraceFileReader<F, R> {
    fn get_all_jobs(&mut self) -> Result<Vec<Job>, TraceError> {
        self.read_jobs(None)
    }

    fn get_jobs(&mut self, num: usize) -> Result<Vec<Job>, TraceError> {
        if num == 0 {
            return Err(TraceError::no_further_jobs("zero jobs were requested"));
        }

        let jobs = self.read_jobs(Some(num))?;

        if jobs.is_empty() {
            return Err(TraceError::no_further_jobs(format!(
                "{} trace {} has no jobs left",
                self.format.name(),
                self.name
            )));
        }

        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Write};

    use super::*;
    use crate::{
        error::JobError,
        job::{DefaultJobFactory, JobParams},
        trace::PreziFormat,
    };

    const EXAMPLE: &str = "1000 5.5 job-A url\n\
                           2000 3.0 job-B default\n\
                           bad line\n\
                           3000 2.0 job-C export\n";

    fn reader(text: &str, window: TraceWindow) -> TraceFileReader<PreziFormat, Cursor<Vec<u8>>> {
        TraceFileReader::from_reader(
            "example",
            Cursor::new(text.as_bytes().to_vec()),
            PreziFormat::new(),
            window,
            DefaultJobFactory,
        )
    }

    fn ids(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(Job::id).collect()
    }

    #[test]
    fn test_read_all() {
        let mut r = reader(EXAMPLE, TraceWindow::default());

        let jobs = r.get_all_jobs().unwrap();

        assert_eq!(ids(&jobs), &["job-A", "job-B", "job-C"]);
        let submits: Vec<i64> = jobs.iter().map(Job::submit_time).collect();
        assert_eq!(submits, &[1000, 2000, 3000]);
        let execs: Vec<&str> = jobs.iter().map(Job::executable).collect();
        assert_eq!(execs, &["url", "default", "export"]);
        assert_eq!(crate::analysis::earliest_submission_time(&jobs), Ok(1000));

        assert_eq!(
            r.stats(),
            ReaderStats {
                lines: 4,
                accepted: 3,
                emitted: 3,
                skipped: 0,
                ignored: 1,
            }
        );
        assert!(r.is_exhausted());
        assert!(r.get_all_jobs().unwrap().is_empty());
    }

    #[test]
    fn test_get_jobs_batches() {
        let mut r = reader(EXAMPLE, TraceWindow::default());

        let first = r.get_jobs(2).unwrap();
        assert_eq!(ids(&first), &["job-A", "job-B"]);

        // fewer jobs than requested is not a failure
        let second = r.get_jobs(2).unwrap();
        assert_eq!(ids(&second), &["job-C"]);

        let e = r.get_jobs(2).unwrap_err();
        assert!(e.is_exhausted());
        assert!(r.get_jobs(1).unwrap_err().is_exhausted());
    }

    #[test]
    fn test_get_zero_jobs() {
        let mut r = reader(EXAMPLE, TraceWindow::default());

        assert!(r.get_jobs(0).unwrap_err().is_exhausted());
        assert_eq!(r.get_jobs(5).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_trace() {
        let mut r = reader("", TraceWindow::default());
        assert!(r.get_jobs(1).unwrap_err().is_exhausted());

        let mut r = reader("bad line\n\n", TraceWindow::default());
        assert!(r.get_all_jobs().unwrap().is_empty());
        assert_eq!(r.stats().ignored, 2);
    }

    #[test]
    fn test_window() {
        let mut r = reader(EXAMPLE, TraceWindow::new(1, 2, false));

        let jobs = r.get_all_jobs().unwrap();

        assert_eq!(ids(&jobs), &["job-B"]);
        assert!(r.is_exhausted());
        // the last line was never read
        assert_eq!(r.stats().lines, 2);
        assert!(r.get_jobs(1).unwrap_err().is_exhausted());
    }

    #[test]
    fn test_window_read_further() {
        let mut r = reader(EXAMPLE, TraceWindow::new(1, 2, true));

        let jobs = r.get_all_jobs().unwrap();

        assert_eq!(ids(&jobs), &["job-B", "job-C"]);
    }

    #[test]
    fn test_window_paginated() {
        let mut r = reader(EXAMPLE, TraceWindow::new(0, 2, false));

        assert_eq!(ids(&r.get_jobs(1).unwrap()), &["job-A"]);
        assert_eq!(ids(&r.get_jobs(5).unwrap()), &["job-B"]);
        assert!(r.get_jobs(5).unwrap_err().is_exhausted());
    }

    #[test]
    fn test_window_past_end() {
        let mut r = reader(EXAMPLE, TraceWindow::new(5, 10, false));

        assert!(r.get_jobs(3).unwrap_err().is_exhausted());
        assert_eq!(r.stats().accepted, 3);
    }

    #[test]
    fn test_construction_failures_are_skipped() {
        let factory = |p: JobParams| {
            if p.id == "job-B" {
                return Err(JobError::invalid_argument(p.id, "id", "refused"));
            }
            Job::new(p)
        };
        let mut r = TraceFileReader::from_reader(
            "example",
            Cursor::new(EXAMPLE.as_bytes().to_vec()),
            PreziFormat::new(),
            TraceWindow::default(),
            factory,
        );

        let jobs = r.get_jobs(3).unwrap();

        assert_eq!(ids(&jobs), &["job-A", "job-C"]);
        assert_eq!(r.stats().skipped, 1);
        assert_eq!(r.stats().emitted, 2);
    }

    #[test]
    fn test_metadata_collection() {
        let text = "# prezi export\n1000 5.5 job-A url\n# end\n";
        let mut r = reader(text, TraceWindow::default());

        assert_eq!(r.get_all_jobs().unwrap().len(), 1);
        assert_eq!(
            r.format().headers(),
            &["# prezi export".to_string(), "# end".to_string()]
        );
    }

    #[test]
    fn test_close() {
        let mut r = reader(EXAMPLE, TraceWindow::default());

        assert_eq!(r.get_jobs(1).unwrap().len(), 1);
        r.close();

        assert!(r.is_exhausted());
        assert!(r.get_jobs(1).unwrap_err().is_exhausted());
    }

    #[test]
    fn test_undecodable_line_is_ignored() {
        let mut bytes = b"1000 5.5 job-A url\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"3000 2.0 job-C export\r\n");
        let mut r = TraceFileReader::from_reader(
            "binary",
            Cursor::new(bytes),
            PreziFormat::new(),
            TraceWindow::default(),
            DefaultJobFactory,
        );

        let jobs = r.get_all_jobs().unwrap();

        assert_eq!(ids(&jobs), &["job-A", "job-C"]);
        assert_eq!(jobs[1].executable(), "export");
        assert_eq!(r.stats().emitted, jobs.len());
        assert_eq!(r.stats().lines, 3);
        assert_eq!(r.stats().ignored, 1);
    }

    struct Unreadable;

    impl Read for Unreadable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }
    }

    #[test]
    fn test_read_error_releases_source() {
        let text = Cursor::new(b"1000 5.5 job-A url\n".to_vec());
        let source = BufReader::new(text.chain(Unreadable));
        let mut r = TraceFileReader::from_reader(
            "broken",
            source,
            PreziFormat::new(),
            TraceWindow::default(),
            DefaultJobFactory,
        );

        let e = r.get_all_jobs().unwrap_err();

        assert!(matches!(e, TraceError::Io(_)));
        assert!(r.is_exhausted());
        assert_eq!(r.stats().emitted, 0);
        assert!(r.get_jobs(1).unwrap_err().is_exhausted());
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();

        let mut r = TraceFileReader::open(
            file.path(),
            PreziFormat::new(),
            TraceWindow::default(),
            DefaultJobFactory,
        )
        .unwrap();

        assert_eq!(r.get_all_jobs().unwrap().len(), 3);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");

        let e = TraceFileReader::open(
            &path,
            PreziFormat::new(),
            TraceWindow::default(),
            DefaultJobFactory,
        )
        .err()
        .unwrap();

        assert!(matches!(e, TraceError::Open { .. }));
    }
}
