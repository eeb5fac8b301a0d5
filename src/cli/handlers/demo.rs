// src/cli/handlers/demo.rs

//! `scopetrace demo`: an instrumented sample workload.

use crate::{
    cli::args::DemoArgs,
    core::{recorder::Recorder, timer::ScopedTimer},
};
use anyhow::{Context, Result, bail};
use colored::Colorize;
use rayon::prelude::*;
use std::hint::black_box;

/// The main handler for the `demo` command.
/// Runs the sample workload inside one session and reports where the trace went.
pub fn handle(args: DemoArgs) -> Result<()> {
    if args.threads == 0 {
        bail!("--threads must be at least 1");
    }

    let recorder = Recorder::new();
    recorder.begin_session(args.session.as_str(), &args.output);
    if recorder.is_degraded() {
        recorder.end_session();
        bail!("the trace could not be written to '{}'", args.output.display());
    }
    run_benchmarks(&recorder, &args)?;
    let event_count = recorder.event_count();
    recorder.end_session();

    println!(
        "{} {} event(s) to {}",
        "Recorded".green().bold(),
        event_count,
        args.output.display().to_string().as_str().cyan()
    );
    println!(
        "{}",
        "Open it in chrome://tracing or https://ui.perfetto.dev".dimmed()
    );
    Ok(())
}

/// Top-level region: two sequential sample functions, then a parallel stage.
fn run_benchmarks(recorder: &Recorder, args: &DemoArgs) -> Result<()> {
    profile_function!(recorder);
    let _stage = ScopedTimer::new(recorder, "RunBenchmarks");

    log::info!("Running benchmarks...");
    black_box(format_lines(recorder, 0, args.iterations));
    black_box(format_lines(recorder, args.iterations, args.iterations.saturating_mul(4)));

    run_parallel_stage(recorder, args)
}

/// Builds `count` greeting lines, the same kind of busy-work the sample functions do.
fn format_lines(recorder: &Recorder, first: u32, count: u32) -> usize {
    profile_function!(recorder);
    (first..first.saturating_add(count))
        .map(|i| format!("Hello World #{i}\n").len())
        .sum()
}

fn run_parallel_stage(recorder: &Recorder, args: &DemoArgs) -> Result<()> {
    profile_scope!(recorder, "ParallelStage");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .thread_name(|i| format!("scopetrace-worker-{i}"))
        .build()
        .context("Failed to build the worker thread pool")?;

    let checksum: u64 = pool.install(|| {
        (0..args.threads)
            .into_par_iter()
            .map(|worker| {
                let mut timer = ScopedTimer::new(recorder, format!("worker #{worker}"));
                let value = collatz_steps(recorder, u64::from(args.iterations) * 10);
                timer.stop();
                value
            })
            .sum()
    });
    log::debug!("Parallel stage checksum: {checksum}");
    Ok(())
}

/// Total Collatz steps for every start value below `limit`.
fn collatz_steps(recorder: &Recorder, limit: u64) -> u64 {
    profile_scope!(recorder, "collatz_steps");
    (1..limit)
        .map(|mut n| {
            let mut steps = 0u64;
            while n != 1 {
                n = if n % 2 == 0 { n / 2 } else { 3 * n + 1 };
                steps += 1;
            }
            steps
        })
        .sum()
}
