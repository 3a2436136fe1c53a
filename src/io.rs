//! Trace inputs and result outputs.
//!
//! Traces are given on the command line as paths or glob patterns. Results
//! are written as JSON, either to a file or to stdout.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Serialize;

/// Expands the trace patterns into trace file paths. Paths are returned in
/// pattern order, sorted within a pattern, without duplicates.
pub fn expand_trace_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut found = BTreeSet::new();
    let mut ret = vec![];

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matched = false;

        for p in glob::glob(pattern).with_context(|| format!("Invalid pattern {}", pattern))? {
            let p = p?;

            if !p.is_file() {
                continue;
            }

            matched = true;
            if found.insert(p.clone()) {
                ret.push(p);
            }
        }

        if !matched {
            bail!("No trace file matches {}", pattern);
        }
    }

    Ok(ret)
}

/// Opens the output destination: `path` if given, stdout otherwise.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) => {
            let f = File::create(p).with_context(|| format!("Cannot create {}", p.display()))?;

            Ok(Box::new(BufWriter::new(f)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

/// Writes `value` as pretty printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: Option<&Path>, value: &T) -> Result<()> {
    let mut w = open_output(path)?;

    serde_json::to_writer_pretty(&mut w, value)?;
    writeln!(w)?;
    w.flush()?;

    Ok(())
}
