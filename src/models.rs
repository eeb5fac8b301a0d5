// src/models.rs

//! Data carried through a recording session, and the shape of a finished trace.

use serde::{Deserialize, Serialize};

// --- RECORDING MODELS ---
// What the recorder holds in memory while a session is open.

/// One recording run. At most one is active per [`Recorder`](crate::core::recorder::Recorder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Label given when the session was started.
    pub name: String,
}

impl Session {
    /// Names a new session.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A completed timed region.
///
/// Timestamps are microseconds since the Unix epoch. Built by a timer when it
/// stops and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Region name; quotes are sanitized only when rendered.
    pub name: String,
    /// Start of the region.
    pub start: u64,
    /// End of the region.
    pub end: u64,
    /// Id of the thread that ran the region.
    pub thread_id: u64,
}

impl Event {
    /// Builds an event from raw timestamps.
    pub fn new(name: impl Into<String>, start: u64, end: u64, thread_id: u64) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            thread_id,
        }
    }

    /// Duration in microseconds. A clock that stepped backwards yields zero rather than wrapping.
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

// --- TRACE DOCUMENT MODELS (read-back) ---
// The shape of a finished trace file, used by `scopetrace inspect` and the tests.

/// A parsed trace file.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct TraceDocument {
    /// Free-form metadata; always empty in files this crate writes.
    #[serde(rename = "otherData", default)]
    pub other_data: serde_json::Map<String, serde_json::Value>,
    /// Events in the order they were written.
    #[serde(rename = "traceEvents", default)]
    pub trace_events: Vec<TraceEvent>,
}

/// One complete event as it appears in the file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Category, `"function"`.
    pub cat: String,
    /// Duration in microseconds.
    pub dur: u64,
    /// Sanitized region name.
    pub name: String,
    /// Phase, `"X"`.
    pub ph: String,
    /// Process id, always 0.
    pub pid: u32,
    /// Thread id.
    pub tid: u64,
    /// Start timestamp, microseconds since the epoch.
    pub ts: u64,
}

impl TraceDocument {
    /// Parses a finished trace document.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
