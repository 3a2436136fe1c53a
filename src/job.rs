//! Job definition.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::JobError;

/// Job construction parameters.
///
/// The fields follow the positional order in which trace formats hand them
/// over to a `JobFactory`.
#[derive(Debug, Clone)]
pub struct JobParams {
    pub id: String,
    /// Submission time, in the trace's time unit.
    pub submit_time: i64,
    /// Declared queueing delay. `None` if the trace does not record it.
    pub queue_time: Option<i64>,
    /// Declared execution time.
    pub exec_time: i64,
    pub processors: u32,
    /// Per-processor computing demand. `None` lets the consumer assign it.
    pub per_processor_cpu: Option<f64>,
    pub per_processor_memory: u64,
    pub user: Option<String>,
    pub group: Option<String>,
    pub executable: String,
    pub preceding: Option<Arc<Job>>,
    /// Time to wait after this job before dependents may start.
    pub delay_after: i64,
}

/// A unit of workload read from a trace.
///
/// Declared fields are fixed at construction. The observed fields are only
/// filled in by a simulator through `started` and `completed`.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    id: String,
    submit_time: i64,
    queue_time: Option<i64>,
    exec_time: i64,
    processors: u32,
    per_processor_cpu: Option<f64>,
    per_processor_memory: u64,
    user: Option<String>,
    group: Option<String>,
    executable: String,
    #[serde(serialize_with = "serialize_preceding")]
    preceding: Option<Arc<Job>>,
    delay_after: i64,

    start_time_instance: Option<i64>,
    stop_time_secs: Option<i64>,
    real_queue_time: Option<i64>,
    real_stop_time: Option<i64>,
}

fn serialize_preceding<S: Serializer>(
    preceding: &Option<Arc<Job>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match preceding {
        Some(job) => serializer.serialize_some(job.id()),
        None => serializer.serialize_none(),
    }
}

fn non_negative(id: &str, field: &'static str, value: i64) -> Result<(), JobError> {
    if value < 0 {
        return Err(JobError::invalid_argument(
            id,
            field,
            format!("must be non-negative, got {}", value),
        ));
    }

    Ok(())
}

/// Time elapsed from `since` to `at`, clamped to zero.
fn elapsed(since: i64, at: i64) -> i64 {
    at.saturating_sub(since).max(0)
}

impl Job {
    /// Builds a job, checking the declared fields.
    pub fn new(params: JobParams) -> Result<Self, JobError> {
        let id = params.id.as_str();

        if id.trim().is_empty() {
            return Err(JobError::invalid_argument(id, "id", "must not be blank"));
        }

        non_negative(id, "submit_time", params.submit_time)?;
        non_negative(id, "exec_time", params.exec_time)?;
        non_negative(id, "delay_after", params.delay_after)?;
        if let Some(q) = params.queue_time {
            non_negative(id, "queue_time", q)?;
        }

        if params.processors == 0 {
            return Err(JobError::invalid_argument(
                id,
                "processors",
                "at least one processor is required",
            ));
        }

        if let Some(cpu) = params.per_processor_cpu {
            if !cpu.is_finite() || cpu < 0.0 {
                return Err(JobError::invalid_argument(
                    id,
                    "per_processor_cpu",
                    format!("must be a non-negative number, got {}", cpu),
                ));
            }
        }

        Ok(Self {
            id: params.id,
            submit_time: params.submit_time,
            queue_time: params.queue_time,
            exec_time: params.exec_time,
            processors: params.processors,
            per_processor_cpu: params.per_processor_cpu,
            per_processor_memory: params.per_processor_memory,
            user: params.user,
            group: params.group,
            executable: params.executable,
            preceding: params.preceding,
            delay_after: params.delay_after,
            start_time_instance: None,
            stop_time_secs: None,
            real_queue_time: None,
            real_stop_time: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn submit_time(&self) -> i64 {
        self.submit_time
    }

    pub fn queue_time(&self) -> Option<i64> {
        self.queue_time
    }

    pub fn exec_time(&self) -> i64 {
        self.exec_time
    }

    pub fn processors(&self) -> u32 {
        self.processors
    }

    pub fn per_processor_cpu(&self) -> Option<f64> {
        self.per_processor_cpu
    }

    pub fn per_processor_memory(&self) -> u64 {
        self.per_processor_memory
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn preceding(&self) -> Option<&Arc<Job>> {
        self.preceding.as_ref()
    }

    pub fn delay_after(&self) -> i64 {
        self.delay_after
    }

    /// Time at which the simulator started the job, if it did.
    pub fn start_time_instance(&self) -> Option<i64> {
        self.start_time_instance
    }

    /// Time at which the simulator completed the job, if it did.
    pub fn stop_time_secs(&self) -> Option<i64> {
        self.stop_time_secs
    }

    /// Observed time between submission and start.
    pub fn real_queue_time(&self) -> Option<i64> {
        self.real_queue_time
    }

    /// Observed time between start and completion.
    pub fn real_stop_time(&self) -> Option<i64> {
        self.real_stop_time
    }

    /// Records that the job started running at `at`.
    /// Observed durations never go below zero.
    pub fn started(&mut self, at: i64) {
        self.start_time_instance = Some(at);
        self.real_queue_time = Some(elapsed(self.submit_time, at));
    }

    /// Records that the job completed at `at`.
    pub fn completed(&mut self, at: i64) {
        let since = self.start_time_instance.unwrap_or(self.submit_time);

        self.stop_time_secs = Some(at);
        self.real_stop_time = Some(elapsed(since, at));
    }
}

/// Job construction capability handed to trace readers.
pub trait JobFactory {
    fn create_job(&self, params: JobParams) -> Result<Job, JobError>;
}

impl<F> JobFactory for F
where
    F: Fn(JobParams) -> Result<Job, JobError>,
{
    fn create_job(&self, params: JobParams) -> Result<Job, JobError> {
        self(params)
    }
}

/// Factory building plain `Job`s.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultJobFactory;

impl JobFactory for DefaultJobFactory {
    fn create_job(&self, params: JobParams) -> Result<Job, JobError> {
        Job::new(params)
    }
}
