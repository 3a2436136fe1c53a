//! jobtrace runtime parameters.
//!
//! This module defines the `TraceContext` struct containing all the
//! parameters needed at runtime. The context is meant to be built from command
//! line parameters.
//! ```no_run
//! use jobtrace::{cli::CLI, context::TraceContext};
//! use clap::Parser;
//!
//! let args = CLI::parse();
//! let ctx = TraceContext::try_from(&args).unwrap();
//! ```
//! Please note that the actual default parameters are defined in the `cli`
//! module.

use std::{path::PathBuf, time::Duration};

use anyhow::Result;

use crate::{cli::CLI, io::expand_trace_paths, trace::TraceWindow};

/// Contains all jobtrace parameters
pub struct TraceContext {
    /// Trace files to read, in order.
    pub traces: Vec<PathBuf>,
    /// Lines of each trace to convert into jobs.
    pub window: TraceWindow,
    /// If set, jobs are pulled from the traces in batches of this size.
    pub batch_size: Option<usize>,
    /// Apdex target response time.
    pub target_time: Duration,
    /// Output file, stdout if `None`.
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

impl TryFrom<&CLI> for TraceContext {
    type Error = anyhow::Error;

    fn try_from(cli_opts: &CLI) -> Result<Self> {
        Ok(Self {
            traces: expand_trace_paths(cli_opts.trace_patterns())?,
            window: cli_opts.window(),
            batch_size: cli_opts.batch_size(),
            target_time: cli_opts.target_time().unwrap_or_default(),
            output: cli_opts.output(),
            verbose: cli_opts.verbose,
        })
    }
}
