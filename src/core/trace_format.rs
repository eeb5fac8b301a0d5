// src/core/trace_format.rs

//! Rendering of the trace document pieces.
//!
//! Output is written by hand rather than through `serde_json` so the field order
//! stays fixed (`cat, dur, name, ph, pid, tid, ts`) and the name policy is exactly
//! "double quotes become single quotes, nothing else is escaped".

use crate::constants::{EVENT_CATEGORY, EVENT_PHASE, EVENT_PID, EVENT_SEPARATOR};
use crate::models::Event;
use std::fmt::Write;

/// Replaces every `"` in an event name with `'`.
pub fn sanitize_name(name: &str) -> String {
    name.replace('"', "'")
}

/// Renders one event object, prefixed with a separator unless it is the first of its session.
pub fn render_event(event: &Event, is_first: bool) -> String {
    let mut out = String::with_capacity(96 + event.name.len());
    if !is_first {
        out.push_str(EVENT_SEPARATOR);
    }
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "{{\"cat\":\"{cat}\",\"dur\":{dur},\"name\":\"{name}\",\"ph\":\"{ph}\",\"pid\":{pid},\"tid\":{tid},\"ts\":{ts}}}",
        cat = EVENT_CATEGORY,
        dur = event.duration(),
        name = sanitize_name(&event.name),
        ph = EVENT_PHASE,
        pid = EVENT_PID,
        tid = event.thread_id,
        ts = event.start,
    );
    out
}
