//! Job list summarizer.

use serde::Serialize;

use crate::{
    analysis::JobListSummary, context::TraceContext, io::write_json, job::Job,
    trace::ReaderStats, JobProcessor,
};
use anyhow::{bail, Result};

#[derive(Serialize)]
struct TraceReport {
    trace: String,
    stats: ReaderStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headers: Vec<String>,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    #[serde(flatten)]
    summary: JobListSummary,
    traces: &'a [TraceReport],
}

/// Computes the summary statistics of the jobs of all traces.
#[derive(Default)]
pub struct TraceSummarizer {
    jobs: Vec<Job>,
    traces: Vec<TraceReport>,
}

impl TraceSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn summary(&self, target_time: f64) -> Result<JobListSummary> {
        if self.jobs.is_empty() {
            bail!("No job found in {} trace(s)", self.traces.len());
        }

        Ok(JobListSummary::from_jobs(&self.jobs, target_time)?)
    }
}

impl From<&TraceContext> for TraceSummarizer {
    fn from(_ctx: &TraceContext) -> Self {
        Self::new()
    }
}

impl JobProcessor for TraceSummarizer {
    fn consume_jobs(&mut self, _trace: &str, jobs: Vec<Job>) {
        self.jobs.extend(jobs);
    }

    fn trace_done(&mut self, trace: &str, stats: ReaderStats, headers: &[String]) {
        self.traces.push(TraceReport {
            trace: trace.to_string(),
            stats,
            headers: headers.to_vec(),
        });
    }

    fn finalize(&mut self, ctx: &TraceContext) -> Result<()> {
        let report = SummaryReport {
            summary: self.summary(ctx.target_time.as_secs_f64())?,
            traces: &self.traces,
        };

        write_json(ctx.output.as_deref(), &report)
    }
}
