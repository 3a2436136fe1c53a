//! Job processors.
//!
//! This module contains the front-end of jobtrace's job processors. Each of
//! these processors is invoked by a different CLI subcommand.

pub mod extract_jobs;
pub mod summary;
