// src/cli/handlers/inspect.rs

//! `scopetrace inspect`: per-name totals of an existing trace.

use crate::{cli::args::InspectArgs, models::TraceDocument};
use anyhow::{Context, Result};
use colored::*;
use std::collections::{BTreeSet, HashMap};
use std::fs;

/// Aggregated timings for one event name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameStats {
    /// Event name as written in the trace.
    pub name: String,
    /// How many events carried this name.
    pub count: usize,
    /// Sum of their durations, in microseconds.
    pub total_us: u64,
    /// Longest single duration, in microseconds.
    pub max_us: u64,
}

/// Everything `scopetrace inspect` prints about one trace document.
#[derive(Debug, Clone, Default)]
pub struct TraceSummary {
    /// Number of events in the document.
    pub event_count: usize,
    /// Every distinct `tid` seen.
    pub thread_ids: BTreeSet<u64>,
    /// First event start to last event end, in microseconds.
    pub wall_span_us: u64,
    /// Sorted by total time, largest first. Ties are broken by name.
    pub by_name: Vec<NameStats>,
}

/// The main handler for the `inspect` command.
pub fn handle(args: InspectArgs) -> Result<()> {
    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read trace file '{}'", args.path.display()))?;
    let doc = TraceDocument::from_json(&text)
        .with_context(|| format!("'{}' is not a valid trace document", args.path.display()))?;

    let summary = summarize(&doc);
    print_summary(&args, &summary);
    Ok(())
}

/// Aggregates a parsed document into per-name totals.
pub fn summarize(doc: &TraceDocument) -> TraceSummary {
    let mut stats: HashMap<&str, NameStats> = HashMap::new();
    let mut thread_ids = BTreeSet::new();
    let mut first_ts = u64::MAX;
    let mut last_end = 0u64;

    for event in &doc.trace_events {
        let entry = stats.entry(event.name.as_str()).or_insert_with(|| NameStats {
            name: event.name.clone(),
            ..Default::default()
        });
        entry.count += 1;
        entry.total_us = entry.total_us.saturating_add(event.dur);
        entry.max_us = entry.max_us.max(event.dur);

        thread_ids.insert(event.tid);
        first_ts = first_ts.min(event.ts);
        last_end = last_end.max(event.ts.saturating_add(event.dur));
    }

    let mut by_name: Vec<NameStats> = stats.into_values().collect();
    by_name.sort_by(|a, b| b.total_us.cmp(&a.total_us).then_with(|| a.name.cmp(&b.name)));

    TraceSummary {
        event_count: doc.trace_events.len(),
        thread_ids,
        wall_span_us: last_end.saturating_sub(first_ts),
        by_name,
    }
}

fn print_summary(args: &InspectArgs, summary: &TraceSummary) {
    println!(
        "\n--- {} '{}' ---",
        "Trace".yellow().bold(),
        args.path.display()
    );
    println!("  {:<12} {}", "events".blue(), summary.event_count);
    println!(
        "  {:<12} {} {}",
        "threads".blue(),
        summary.thread_ids.len(),
        format_thread_ids(&summary.thread_ids).as_str().dimmed()
    );
    println!("  {:<12} {}", "wall span".blue(), format_us(summary.wall_span_us));

    if summary.by_name.is_empty() {
        println!("\n  {}", "(no events recorded)".dimmed());
        return;
    }

    println!(
        "\n  {:<40} {:>8} {:>12} {:>12}",
        "name".bold(),
        "count".bold(),
        "total".bold(),
        "max".bold()
    );
    for stats in summary.by_name.iter().take(args.top) {
        println!(
            "  {:<40} {:>8} {:>12} {:>12}",
            truncate(&stats.name, 40).as_str().cyan(),
            stats.count,
            format_us(stats.total_us),
            format_us(stats.max_us)
        );
    }
    let hidden = summary.by_name.len().saturating_sub(args.top);
    if hidden > 0 {
        println!("  {}", format!("... and {hidden} more").as_str().dimmed());
    }
}

fn format_us(us: u64) -> String {
    match us {
        0..1_000 => format!("{us} µs"),
        1_000..1_000_000 => format!("{:.2} ms", us as f64 / 1_000.0),
        _ => format!("{:.2} s", us as f64 / 1_000_000.0),
    }
}

/// Renders the thread ids as `[a, b, c]`.
fn format_thread_ids(ids: &BTreeSet<u64>) -> String {
    let joined: Vec<String> = ids.iter().map(u64::to_string).collect();
    format!("[{}]", joined.join(", "))
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let kept: String = name.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
