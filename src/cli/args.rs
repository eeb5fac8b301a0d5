// src/cli/args.rs

//! Arguments of each subcommand.

use crate::constants::DEFAULT_TRACE_FILENAME;
use clap::Args;
use std::path::PathBuf;

/// Arguments of `scopetrace demo`.
#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Where to write the trace document.
    #[arg(long, short, default_value = DEFAULT_TRACE_FILENAME)]
    pub output: PathBuf,

    /// Number of worker threads in the parallel stage.
    #[arg(long, short, default_value_t = 4)]
    pub threads: usize,

    /// Loop iterations per sample function. Larger values give wider spans.
    #[arg(long, short, default_value_t = 1000)]
    pub iterations: u32,

    /// Name recorded for the session.
    #[arg(long, default_value = "Profile")]
    pub session: String,
}

/// Arguments of `scopetrace inspect`.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// The trace file to read.
    #[arg(default_value = DEFAULT_TRACE_FILENAME)]
    pub path: PathBuf,

    /// Only show the N names with the largest total time.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}
