//! Prezi log format.
//!
//! Each job is described by a line of four space separated fields:
//! ```text
//! <arrival time (ms)> <duration (s)> <job id> <executable>
//! ```
//! where the executable is one of `url`, `default` or `export`. Trailing
//! fields are ignored.

use std::{fmt::Display, str::FromStr};

use nom::{
    bytes::complete::take_till1,
    character::complete::{space0, space1},
    combinator::map_res,
    sequence::{preceded, tuple},
    IResult,
};

use super::{LineOutcome, TraceFormat};
use crate::job::{JobFactory, JobParams};

/// Memory assigned to every Prezi job.
pub const DEFAULT_MEMORY: u64 = 512;

/// Kind of executable a Prezi job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreziExecutable {
    Url,
    Default,
    Export,
}

impl PreziExecutable {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreziExecutable::Url => "url",
            PreziExecutable::Default => "default",
            PreziExecutable::Export => "export",
        }
    }
}

impl FromStr for PreziExecutable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(PreziExecutable::Url),
            "default" => Ok(PreziExecutable::Default),
            "export" => Ok(PreziExecutable::Export),
            _ => Err(format!("Unknown executable: {}", s)),
        }
    }
}

impl Display for PreziExecutable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a Prezi trace line.
#[derive(Debug, Clone, PartialEq)]
struct PreziLine<'a> {
    arrival: i64,
    duration: f32,
    id: &'a str,
    executable: PreziExecutable,
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

fn next_field(input: &str) -> IResult<&str, &str> {
    preceded(space1, field)(input)
}

/// Parse the leading fields of a Prezi line.
fn parse_line(input: &str) -> IResult<&str, PreziLine<'_>> {
    let (i, (arrival, duration, id, executable)) = tuple((
        preceded(space0, map_res(field, str::parse::<i64>)),
        map_res(next_field, str::parse::<f32>),
        next_field,
        map_res(next_field, str::parse::<PreziExecutable>),
    ))(input)?;

    Ok((
        i,
        PreziLine {
            arrival,
            duration,
            id,
            executable,
        },
    ))
}

/// Prezi trace format.
#[derive(Debug, Default)]
pub struct PreziFormat {
    headers: Vec<String>,
}

impl PreziFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comment lines (starting with `#`) met while reading the trace.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl TraceFormat for PreziFormat {
    fn name(&self) -> &str {
        "LOG format"
    }

    fn is_trace_line(&self, line: &str) -> bool {
        parse_line(line).is_ok()
    }

    fn create_job_from_line(&self, line: &str, factory: &dyn JobFactory) -> LineOutcome {
        let fields = match parse_line(line) {
            Ok((_, fields)) => fields,
            Err(e) => return LineOutcome::Skipped(format!("malformed line: {}", e)),
        };

        let params = JobParams {
            id: fields.id.trim().to_string(),
            submit_time: fields.arrival,
            queue_time: Some(0),
            exec_time: fields.duration as i64,
            processors: 1,
            per_processor_cpu: None,
            per_processor_memory: DEFAULT_MEMORY,
            user: None,
            group: None,
            executable: fields.executable.to_string(),
            preceding: None,
            delay_after: 0,
        };

        match factory.create_job(params) {
            Ok(job) => LineOutcome::Parsed(job),
            Err(e) => LineOutcome::Skipped(e.to_string()),
        }
    }

    fn collect_metadata(&mut self, line: &str) {
        let line = line.trim();

        if line.starts_with('#') {
            self.headers.push(line.to_string());
        }
    }
}
