//! Job list analysis.
//!
//! Helpers to find the earliest and latest events in a job list and to rate a
//! simulated job list with the Application Performance Index (Apdex).

use std::cmp::Ordering;

use serde::Serialize;

use crate::{error::AnalysisError, job::Job};

/// Orders jobs by submission time.
pub fn by_submit_time(a: &Job, b: &Job) -> Ordering {
    a.submit_time().cmp(&b.submit_time())
}

/// Orders jobs by termination time. Jobs that never terminated come first.
pub fn by_stop_time(a: &Job, b: &Job) -> Ordering {
    a.stop_time_secs().cmp(&b.stop_time_secs())
}

/// Orders jobs by start time. Jobs that never started come first.
pub fn by_start_time(a: &Job, b: &Job) -> Ordering {
    a.start_time_instance().cmp(&b.start_time_instance())
}

/// Returns the time at which the first job of the list got submitted.
pub fn earliest_submission_time(jobs: &[Job]) -> Result<i64, AnalysisError> {
    jobs.iter()
        .min_by(|a, b| by_submit_time(a, b))
        .map(Job::submit_time)
        .ok_or(AnalysisError::EmptyJobList)
}

/// Returns the last termination time of the list, or `None` if no job of the
/// list has terminated yet.
pub fn last_termination_time(jobs: &[Job]) -> Result<Option<i64>, AnalysisError> {
    jobs.iter()
        .max_by(|a, b| by_stop_time(a, b))
        .map(Job::stop_time_secs)
        .ok_or(AnalysisError::EmptyJobList)
}

/// Apdex satisfaction zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfaction {
    Satisfied,
    Tolerating,
    Frustrated,
}

impl Satisfaction {
    /// Classifies a response time against `target_time`. A response time equal
    /// to the target is tolerated.
    pub fn classify(time: f64, target_time: f64) -> Self {
        if time < target_time {
            Satisfaction::Satisfied
        } else if time < target_time * 4.0 {
            Satisfaction::Tolerating
        } else {
            Satisfaction::Frustrated
        }
    }
}

/// Response time seen by the user of a job: its observed queueing time plus
/// its observed execution time when it completed. `None` if the job never
/// left the queue.
pub fn response_time(job: &Job) -> Option<i64> {
    let queued = job.real_queue_time()?;

    Some(queued + job.real_stop_time().unwrap_or(0))
}

/// Counts of jobs per satisfaction zone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApdexZones {
    pub satisfied: usize,
    pub tolerating: usize,
    pub frustrated: usize,
}

impl ApdexZones {
    /// Tallies the observed jobs of the list. Jobs without an observed
    /// queueing time are left out.
    pub fn tally(jobs: &[Job], target_time: f64) -> Self {
        let mut zones = Self::default();

        for time in jobs.iter().filter_map(response_time) {
            match Satisfaction::classify(time as f64, target_time) {
                Satisfaction::Satisfied => zones.satisfied += 1,
                Satisfaction::Tolerating => zones.tolerating += 1,
                Satisfaction::Frustrated => zones.frustrated += 1,
            }
        }

        zones
    }

    /// Apdex score over `total` jobs. Jobs left out of the tally still count
    /// in `total`.
    pub fn score(&self, total: usize) -> f64 {
        (self.satisfied as f64 + self.tolerating as f64 / 2.0) / total as f64
    }
}

/// Estimates the Apdex rating of a job list. Meant to be queried once the
/// jobs have been simulated.
///
/// Every job of the list counts in the denominator, including those that
/// were never queued, so unobserved jobs lower the rating.
pub fn apdex(jobs: &[Job], target_time: f64) -> Result<f64, AnalysisError> {
    if jobs.is_empty() {
        return Err(AnalysisError::EmptyJobList);
    }

    Ok(ApdexZones::tally(jobs, target_time).score(jobs.len()))
}

/// Summary statistics of a job list.
#[derive(Debug, Clone, Serialize)]
pub struct JobListSummary {
    pub jobs: usize,
    pub earliest_submission: i64,
    pub last_termination: Option<i64>,
    pub target_time: f64,
    pub zones: ApdexZones,
    pub apdex: f64,
}

impl JobListSummary {
    pub fn from_jobs(jobs: &[Job], target_time: f64) -> Result<Self, AnalysisError> {
        let earliest_submission = earliest_submission_time(jobs)?;
        let last_termination = last_termination_time(jobs)?;
        let zones = ApdexZones::tally(jobs, target_time);

        Ok(Self {
            jobs: jobs.len(),
            earliest_submission,
            last_termination,
            target_time,
            zones,
            apdex: zones.score(jobs.len()),
        })
    }
}
