// src/core/recorder.rs

//! Session lifecycle and serialized event output.

use crate::{
    constants::{DEFAULT_TRACE_FILENAME, TRACE_FOOTER, TRACE_HEADER},
    core::{clock::Clock, trace_format},
    models::{Event, Session},
};
use log::{debug, error, trace};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Where the trace document of the active session is written.
enum Sink {
    /// Opened by the recorder itself; synced to disk when the session ends.
    File(BufWriter<File>),
    /// Supplied by the caller; only flushed.
    Writer(Box<dyn Write + Send>),
}

impl Sink {
    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            Self::File(w) => w.write_all(bytes),
            Self::Writer(w) => w.write_all(bytes),
        }
    }

    /// Flushes buffered output and, for files, waits until the OS reports it durable.
    fn close(self) -> std::io::Result<()> {
        match self {
            Self::File(w) => {
                let file = w.into_inner().map_err(|e| e.into_error())?;
                file.sync_all()
            }
            Self::Writer(mut w) => w.flush(),
        }
    }
}

/// A sink failure. Never returned to callers of [`Recorder`]; every variant is logged.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// The destination of a new session could not be created.
    #[error("Could not open trace file '{}': {source}", .path.display())]
    Open {
        /// The destination that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Part of the document could not be written.
    #[error("Could not write to the trace of session '{session}': {source}")]
    Write {
        /// Name of the session being written.
        session: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Flushing or syncing the destination failed when the session ended.
    #[error("Could not close the trace of session '{session}': {source}")]
    Close {
        /// Name of the session being closed.
        session: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Everything guarded by the recorder's writer lock.
struct RecorderState {
    session: Option<Session>,
    event_count: usize,
    /// `None` while idle, or when the destination of the active session could not be opened.
    sink: Option<Sink>,
}

impl RecorderState {
    const fn idle() -> Self {
        Self {
            session: None,
            event_count: 0,
            sink: None,
        }
    }

    fn session_name(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    /// Writes to the sink. A degraded session (no sink) silently drops the text.
    fn write(&mut self, text: &str) -> Result<(), RecorderError> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        sink.write_all(text.as_bytes())
            .map_err(|source| RecorderError::Write {
                session: self.session_name(),
                source,
            })
    }

    fn close_sink(&mut self) -> Result<(), RecorderError> {
        let Some(sink) = self.sink.take() else {
            return Ok(());
        };
        sink.close().map_err(|source| RecorderError::Close {
            session: self.session_name(),
            source,
        })
    }
}

impl fmt::Debug for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecorderState")
            .field("session", &self.session)
            .field("event_count", &self.event_count)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

/// Owns the recording session and serializes timing events into one trace document.
///
/// A `Recorder` is created explicitly by the application and shared by reference
/// (or through an `Arc`) with every [`ScopedTimer`](crate::core::timer::ScopedTimer).
/// Events from any number of threads are written under a single lock, held only
/// for the duration of one event.
///
/// Instrumentation is best-effort: no I/O failure is ever returned to the caller.
/// Failures are logged through the `log` facade and the session carries on.
///
/// Session begin/end should not race with timers still in flight on other threads;
/// events that arrive while no session is open are discarded.
#[derive(Debug)]
pub struct Recorder {
    clock: Clock,
    state: Mutex<RecorderState>,
}

impl Recorder {
    /// Creates an idle recorder. Its clock is anchored to the current wall time.
    pub fn new() -> Self {
        Self {
            clock: Clock::new(),
            state: Mutex::new(RecorderState::idle()),
        }
    }

    /// The timebase shared by every timer reporting to this recorder.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Starts a session writing to `path`, ending the active one first if there is one.
    ///
    /// If `path` cannot be created the failure is logged and the session still
    /// becomes active. Its events are then counted but not written anywhere.
    pub fn begin_session(&self, name: impl Into<String>, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock_state();
        Self::finish(&mut state);

        let sink = match open_file_sink(path) {
            Ok(sink) => Some(sink),
            Err(e) => {
                report(e);
                None
            }
        };
        Self::start(&mut state, Session::new(name), sink);
    }

    /// Starts a session writing to [`DEFAULT_TRACE_FILENAME`] in the working directory.
    pub fn begin_session_default(&self, name: impl Into<String>) {
        self.begin_session(name, DEFAULT_TRACE_FILENAME);
    }

    /// Starts a session writing to a caller-supplied sink.
    pub fn begin_session_with_sink(&self, name: impl Into<String>, sink: impl Write + Send + 'static) {
        let mut state = self.lock_state();
        Self::finish(&mut state);
        Self::start(&mut state, Session::new(name), Some(Sink::Writer(Box::new(sink))));
    }

    /// Writes the footer, closes the sink and releases the session. No-op when idle.
    pub fn end_session(&self) {
        let mut state = self.lock_state();
        Self::finish(&mut state);
    }

    /// Runs `f` inside a session that is ended on every exit path, unwinding included.
    pub fn with_session<R>(
        &self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
        f: impl FnOnce() -> R,
    ) -> R {
        self.begin_session(name, path);
        let _end = scopeguard::guard((), |()| self.end_session());
        f()
    }

    /// Appends one event to the active session's document.
    ///
    /// The counter advances even when the write fails, so a failed write can leave
    /// a gap but never a doubled or missing separator.
    pub fn record_event(&self, event: &Event) {
        let mut state = self.lock_state();
        if state.session.is_none() {
            trace!("Dropping event '{}': no active session.", event.name);
            return;
        }

        let is_first = state.event_count == 0;
        state.event_count += 1;

        let rendered = trace_format::render_event(event, is_first);
        if let Err(e) = state.write(&rendered) {
            report(e);
        }
    }

    /// Whether a session is open.
    pub fn is_active(&self) -> bool {
        self.lock_state().session.is_some()
    }

    /// Whether the open session has nowhere to write because its destination could not be opened.
    /// Always `false` while idle.
    pub fn is_degraded(&self) -> bool {
        let state = self.lock_state();
        state.session.is_some() && state.sink.is_none()
    }

    /// Name of the active session, if any.
    pub fn session_name(&self) -> Option<String> {
        self.lock_state().session.as_ref().map(|s| s.name.clone())
    }

    /// Number of events recorded into the active session so far.
    pub fn event_count(&self) -> usize {
        self.lock_state().event_count
    }

    // --- Internal helpers (caller holds the lock) ---

    fn start(state: &mut RecorderState, session: Session, sink: Option<Sink>) {
        debug!(
            "Beginning profiling session '{}'{}",
            session.name,
            if sink.is_some() { "" } else { " (degraded: events will not be written)" }
        );
        state.session = Some(session);
        state.sink = sink;
        state.event_count = 0;
        if let Err(e) = state.write(TRACE_HEADER) {
            report(e);
        }
    }

    fn finish(state: &mut RecorderState) {
        if state.session.is_none() {
            return;
        }

        if let Err(e) = state.write(TRACE_FOOTER) {
            report(e);
        }
        if let Err(e) = state.close_sink() {
            report(e);
        }

        debug!(
            "Ended profiling session '{}' after {} event(s).",
            state.session_name(),
            state.event_count
        );
        state.session = None;
        state.event_count = 0;
    }

    /// A panic on another thread while it held the lock leaves the state consistent
    /// (each mutation is a plain field store), so recording simply continues.
    fn lock_state(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.end_session();
    }
}

fn open_file_sink(path: &Path) -> Result<Sink, RecorderError> {
    let file = File::create(path).map_err(|source| RecorderError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Sink::File(BufWriter::new(file)))
}

/// The single place where recorder failures end up: they are logged at error level
/// (visible with the default `env_logger` filter), then dropped.
fn report(err: RecorderError) {
    error!("{err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TraceDocument;
    use std::fs;
    use std::io;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// A sink that shares its buffer with the test so the output can be inspected.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A sink on which every operation fails.
    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is gone"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is gone"))
        }
    }

    /// Accepts writes but fails when the session closes it.
    struct UnflushableSink;

    impl Write for UnflushableSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("device full"))
        }
    }

    #[test]
    fn test_two_events_layout() {
        let buffer = SharedBuffer::default();
        let recorder = Recorder::new();
        recorder.begin_session_with_sink("S", buffer.clone());
        recorder.record_event(&Event::new("A", 10, 15, 1));
        recorder.record_event(&Event::new("B", 20, 32, 1));
        recorder.end_session();

        assert_eq!(
            buffer.contents(),
            concat!(
                r#"{"otherData": {},"traceEvents":["#,
                r#"{"cat":"function","dur":5,"name":"A","ph":"X","pid":0,"tid":1,"ts":10},"#,
                r#"{"cat":"function","dur":12,"name":"B","ph":"X","pid":0,"tid":1,"ts":20}"#,
                r#"]}"#
            )
        );
    }

    #[test]
    fn test_empty_session_is_valid_document() {
        let buffer = SharedBuffer::default();
        let recorder = Recorder::new();
        recorder.begin_session_with_sink("empty", buffer.clone());
        recorder.end_session();

        let doc = TraceDocument::from_json(&buffer.contents()).unwrap();
        assert!(doc.trace_events.is_empty());
        assert!(doc.other_data.is_empty());
    }

    #[test]
    fn test_n_events_are_all_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let recorder = Recorder::new();
        recorder.begin_session("many", &path);
        for i in 0..25u64 {
            recorder.record_event(&Event::new(format!("e{i}"), i, i + 3, 9));
        }
        assert_eq!(recorder.event_count(), 25);
        recorder.end_session();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("[,"));
        assert!(!text.contains(",]"));
        let doc = TraceDocument::from_json(&text).unwrap();
        assert_eq!(doc.trace_events.len(), 25);
        assert_eq!(doc.trace_events[24].name, "e24");
        assert!(doc.trace_events.iter().all(|e| e.dur == 3));
    }

    #[test]
    fn test_end_without_session_is_noop() {
        let recorder = Recorder::new();
        recorder.end_session();
        recorder.end_session();
        assert!(!recorder.is_active());
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_events_without_session_are_ignored() {
        let buffer = SharedBuffer::default();
        let recorder = Recorder::new();
        recorder.record_event(&Event::new("early", 0, 1, 1));

        recorder.begin_session_with_sink("late", buffer.clone());
        recorder.record_event(&Event::new("on-time", 0, 1, 1));
        recorder.end_session();
        recorder.record_event(&Event::new("too-late", 0, 1, 1));

        let doc = TraceDocument::from_json(&buffer.contents()).unwrap();
        assert_eq!(doc.trace_events.len(), 1);
        assert_eq!(doc.trace_events[0].name, "on-time");
    }

    #[test]
    fn test_new_session_finalizes_previous() {
        let first = SharedBuffer::default();
        let second = SharedBuffer::default();
        let recorder = Recorder::new();

        recorder.begin_session_with_sink("one", first.clone());
        recorder.record_event(&Event::new("a", 0, 1, 1));
        recorder.begin_session_with_sink("two", second.clone());

        // The first document is complete before the second session writes anything else.
        let doc = TraceDocument::from_json(&first.contents()).unwrap();
        assert_eq!(doc.trace_events.len(), 1);
        assert_eq!(recorder.session_name().as_deref(), Some("two"));
        assert_eq!(recorder.event_count(), 0);

        // The counter restarted, so the new session's first event has no separator.
        recorder.record_event(&Event::new("b", 0, 1, 1));
        recorder.end_session();
        assert!(second.contents().contains("[{\"cat\""));
        assert_eq!(TraceDocument::from_json(&second.contents()).unwrap().trace_events.len(), 1);
    }

    #[test]
    fn test_restarting_on_same_path_keeps_latest_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let recorder = Recorder::new();

        recorder.begin_session("first", &path);
        recorder.record_event(&Event::new("old", 0, 1, 1));
        recorder.begin_session("second", &path);
        recorder.record_event(&Event::new("new", 0, 1, 1));
        recorder.end_session();

        let doc = TraceDocument::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.trace_events.len(), 1);
        assert_eq!(doc.trace_events[0].name, "new");
    }

    #[test]
    fn test_unopenable_path_degrades_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("trace.json");
        let recorder = Recorder::new();

        assert!(!recorder.is_degraded());
        recorder.begin_session("degraded", &path);
        assert!(recorder.is_active());
        assert!(recorder.is_degraded());
        recorder.record_event(&Event::new("lost", 0, 1, 1));
        recorder.record_event(&Event::new("lost", 1, 2, 1));
        assert_eq!(recorder.event_count(), 2);
        recorder.end_session();

        assert!(!recorder.is_active());
        assert!(!recorder.is_degraded());
        assert!(!path.exists());
    }

    #[test]
    fn test_directory_destination_degrades_session() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::new();

        recorder.begin_session("directory", dir.path());
        assert!(recorder.is_degraded());
        recorder.end_session();

        // A healthy session on a real file is not degraded.
        recorder.begin_session("file", dir.path().join("trace.json"));
        assert!(!recorder.is_degraded());
        recorder.end_session();
    }

    #[test]
    fn test_close_failure_does_not_break_lifecycle() {
        let recorder = Recorder::new();
        recorder.begin_session_with_sink("unflushable", UnflushableSink);
        recorder.record_event(&Event::new("x", 0, 1, 1));
        recorder.end_session();
        assert!(!recorder.is_active());
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_file_sink_is_complete_after_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("synced.json");
        let recorder = Recorder::new();
        recorder.begin_session("synced", &path);
        recorder.record_event(&Event::new("durable", 0, 1, 1));
        recorder.end_session();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("]}"));
        assert_eq!(TraceDocument::from_json(&text).unwrap().trace_events.len(), 1);
    }

    #[test]
    fn test_write_failures_do_not_break_lifecycle() {
        let recorder = Recorder::new();
        recorder.begin_session_with_sink("broken", BrokenSink);
        recorder.record_event(&Event::new("x", 0, 1, 1));
        recorder.record_event(&Event::new("y", 0, 1, 1));
        assert_eq!(recorder.event_count(), 2);
        recorder.end_session();
        assert!(!recorder.is_active());

        // The recorder is still usable afterwards.
        let buffer = SharedBuffer::default();
        recorder.begin_session_with_sink("healthy", buffer.clone());
        recorder.record_event(&Event::new("z", 0, 1, 1));
        recorder.end_session();
        assert_eq!(TraceDocument::from_json(&buffer.contents()).unwrap().trace_events.len(), 1);
    }

    #[test]
    fn test_with_session_ends_after_panic() {
        let recorder = Recorder::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("panicked.json");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            recorder.with_session("boom", &path, || {
                recorder.record_event(&Event::new("before-panic", 0, 1, 1));
                panic!("instrumented code failed");
            })
        }));
        assert!(result.is_err());
        assert!(!recorder.is_active());

        let doc = TraceDocument::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.trace_events.len(), 1);
    }

    #[test]
    fn test_with_session_returns_closure_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("value.json");
        let recorder = Recorder::new();
        let answer = recorder.with_session("value", &path, || 6 * 7);
        assert_eq!(answer, 42);
        assert!(TraceDocument::from_json(&fs::read_to_string(&path).unwrap()).is_ok());
    }

    #[test]
    fn test_drop_finalizes_open_session() {
        let buffer = SharedBuffer::default();
        {
            let recorder = Recorder::new();
            recorder.begin_session_with_sink("dropped", buffer.clone());
            recorder.record_event(&Event::new("a", 0, 1, 1));
        }
        assert!(buffer.contents().ends_with("]}"));
        assert_eq!(TraceDocument::from_json(&buffer.contents()).unwrap().trace_events.len(), 1);
    }

    #[test]
    fn test_concurrent_record_event_keeps_json_intact() {
        let buffer = SharedBuffer::default();
        let recorder = Recorder::new();
        recorder.begin_session_with_sink("threads", buffer.clone());

        std::thread::scope(|s| {
            for t in 0..8u64 {
                let recorder = &recorder;
                s.spawn(move || {
                    for i in 0..50u64 {
                        recorder.record_event(&Event::new(format!("t{t}-{i}"), i, i + 1, t));
                    }
                });
            }
        });
        recorder.end_session();

        let doc = TraceDocument::from_json(&buffer.contents()).unwrap();
        assert_eq!(doc.trace_events.len(), 400);
    }
}
