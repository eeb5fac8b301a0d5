// src/bin/scopetrace.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use scopetrace::cli::{Cli, Command, handlers};

/// The main entry point of the `scopetrace` binary.
/// It sets up logging, parses arguments, dispatches to the subcommand handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Print the full context chain, one cause per line.
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    match cli.command {
        Command::Demo(args) => handlers::demo::handle(args),
        Command::Inspect(args) => handlers::inspect::handle(args),
    }
}
