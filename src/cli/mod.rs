// src/cli/mod.rs

//! Command-line surface of the `scopetrace` binary.

use clap::{Parser, Subcommand};

pub mod args;
pub mod handlers;

use args::{DemoArgs, InspectArgs};

/// scopetrace: scoped wall-clock instrumentation with Chrome-trace output.
///
/// Traces open in `chrome://tracing`, <https://ui.perfetto.dev> or speedscope.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
pub struct Cli {
    /// The action to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Runs an instrumented sample workload and writes its trace.
    Demo(DemoArgs),
    /// Summarizes an existing trace file.
    Inspect(InspectArgs),
}
