//! Job extractor.

use serde::Serialize;
use tracing::info;

use crate::{context::TraceContext, io::write_json, job::Job, JobProcessor};
use anyhow::Result;

#[derive(Serialize)]
struct TracedJob<'a> {
    trace: &'a str,
    #[serde(flatten)]
    job: &'a Job,
}

/// Collects the jobs of every trace and writes them as a JSON list.
#[derive(Default)]
pub struct JobExtractor {
    jobs: Vec<(String, Job)>,
}

impl JobExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<&TraceContext> for JobExtractor {
    fn from(_ctx: &TraceContext) -> Self {
        Self::new()
    }
}

impl JobProcessor for JobExtractor {
    fn consume_jobs(&mut self, trace: &str, jobs: Vec<Job>) {
        self.jobs
            .extend(jobs.into_iter().map(|j| (trace.to_string(), j)));
    }

    fn finalize(&mut self, ctx: &TraceContext) -> Result<()> {
        let data: Vec<TracedJob<'_>> = self
            .jobs
            .iter()
            .map(|(trace, job)| TracedJob { trace, job })
            .collect();

        write_json(ctx.output.as_deref(), &data)?;

        if let Some(p) = &ctx.output {
            info!(jobs = data.len(), "Results saved in {}.", p.display());
        }

        Ok(())
    }
}
