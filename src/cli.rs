//! Command line interface.
//!
//! Default parameters of jobtrace are defined here.

use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::trace::TraceWindow;

fn parse_duration(s: &str) -> Result<Duration, String> {
    duration_str::parse(s).map_err(|e| e.to_string())
}

/// Trace selection parameters shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// Trace files to read. Glob patterns are expanded.
    #[arg(required = true)]
    pub traces: Vec<String>,

    /// Index of the first trace line converted into a job.
    #[arg(long, default_value_t = 0)]
    pub from: usize,

    /// Index of the trace line after the last converted one. Reads until the
    /// end of the trace if omitted.
    #[arg(long)]
    pub to: Option<usize>,

    /// Keep reading past --to.
    #[arg(long)]
    pub read_further: bool,

    /// Pull jobs from the traces in batches of this size.
    #[arg(long)]
    pub batch: Option<NonZeroUsize>,
}

#[derive(Subcommand, Debug)]
pub enum JobTraceSubCommand {
    /// Convert traces into a JSON list of jobs.
    Jobs {
        #[command(flatten)]
        trace: TraceArgs,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print summary statistics of the jobs of traces.
    Summary {
        #[command(flatten)]
        trace: TraceArgs,

        /// Apdex target response time (e.g. 10s, 2m).
        #[arg(long, default_value = "10s", value_parser = parse_duration)]
        target_time: Duration,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CLI {
    /// Log debugging information.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: JobTraceSubCommand,
}

impl CLI {
    pub fn trace_args(&self) -> &TraceArgs {
        match &self.command {
            JobTraceSubCommand::Jobs { trace, .. } | JobTraceSubCommand::Summary { trace, .. } => {
                trace
            }
        }
    }

    pub fn trace_patterns(&self) -> &[String] {
        &self.trace_args().traces
    }

    pub fn window(&self) -> TraceWindow {
        let args = self.trace_args();

        match args.to {
            Some(to) => TraceWindow::new(args.from, to, args.read_further),
            None => TraceWindow::unbounded(args.from),
        }
    }

    pub fn batch_size(&self) -> Option<usize> {
        self.trace_args().batch.map(NonZeroUsize::get)
    }

    pub fn target_time(&self) -> Option<Duration> {
        match &self.command {
            JobTraceSubCommand::Summary { target_time, .. } => Some(*target_time),
            JobTraceSubCommand::Jobs { .. } => None,
        }
    }

    pub fn output(&self) -> Option<PathBuf> {
        match &self.command {
            JobTraceSubCommand::Jobs { output, .. } | JobTraceSubCommand::Summary { output, .. } => {
                output.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_args() {
        let cli = CLI::parse_from(["jobtrace", "jobs", "a.log"]);
        assert_eq!(cli.window(), TraceWindow::unbounded(0));
        assert_eq!(cli.batch_size(), None);
        assert_eq!(cli.target_time(), None);

        let cli = CLI::parse_from([
            "jobtrace", "jobs", "a.log", "b.log", "--from", "2", "--to", "5", "--batch", "3",
        ]);
        assert_eq!(cli.window(), TraceWindow::new(2, 5, false));
        assert_eq!(cli.trace_patterns(), &["a.log".to_string(), "b.log".to_string()]);
        assert_eq!(cli.batch_size(), Some(3));

        let cli = CLI::parse_from(["jobtrace", "jobs", "a.log", "--to", "5", "--read-further"]);
        assert_eq!(cli.window().limit(), None);
    }

    #[test]
    fn test_summary_args() {
        let cli = CLI::parse_from(["jobtrace", "-v", "summary", "a.log", "--target-time", "2m"]);

        assert!(cli.verbose);
        assert_eq!(cli.target_time(), Some(Duration::from_secs(120)));

        let cli = CLI::parse_from(["jobtrace", "summary", "a.log", "-o", "out.json"]);
        assert_eq!(cli.target_time(), Some(Duration::from_secs(10)));
        assert_eq!(cli.output(), Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_invalid_args() {
        assert!(CLI::try_parse_from(["jobtrace", "jobs"]).is_err());
        assert!(CLI::try_parse_from(["jobtrace", "jobs", "a.log", "--batch", "0"]).is_err());
        assert!(CLI::try_parse_from(["jobtrace", "jobs", "a.log", "--batch", "-2"]).is_err());

        let too_large = format!("{}0", usize::MAX);
        let args = ["jobtrace", "jobs", "a.log", "--batch", too_large.as_str()];
        assert!(CLI::try_parse_from(args).is_err());
        assert!(CLI::try_parse_from(["jobtrace", "summary", "a", "--target-time", "soon"]).is_err());
    }
}
