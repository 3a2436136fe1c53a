use anyhow::{Error, Result};
use clap::Parser;
use jobtrace::{
    cli::*,
    context::TraceContext,
    process_traces,
    processors::{extract_jobs::JobExtractor, summary::TraceSummarizer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let default = if verbose {
        "jobtrace=debug"
    } else {
        "jobtrace=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Error> {
    let opts = CLI::parse();

    init_logging(opts.verbose);

    let ctx = TraceContext::try_from(&opts)?;

    match &opts.command {
        JobTraceSubCommand::Jobs { .. } => process_traces(JobExtractor::from(&ctx), &ctx),
        JobTraceSubCommand::Summary { .. } => process_traces(TraceSummarizer::from(&ctx), &ctx),
    }
}
