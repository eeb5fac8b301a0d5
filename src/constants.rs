// src/constants.rs

//! Fixed pieces of the trace format and defaults.

/// The trace file written when a session is started without an explicit destination.
pub const DEFAULT_TRACE_FILENAME: &str = "results.json";

/// Opening envelope of every trace document, written when a session begins.
pub const TRACE_HEADER: &str = "{\"otherData\": {},\"traceEvents\":[";

/// Closing envelope of every trace document, written when a session ends.
pub const TRACE_FOOTER: &str = "]}";

/// Written between two consecutive event objects.
pub const EVENT_SEPARATOR: &str = ",";

/// Category attached to every recorded event.
pub const EVENT_CATEGORY: &str = "function";

/// Chrome trace phase for a "complete" event (start timestamp plus duration).
pub const EVENT_PHASE: &str = "X";

/// Single-process model: every event carries the same process id.
pub const EVENT_PID: u32 = 0;
