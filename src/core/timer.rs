// src/core/timer.rs

//! Scope-bound timers that report one event each.

use crate::{
    core::{clock, recorder::Recorder},
    models::Event,
};
use std::borrow::Cow;
use std::time::{Duration, Instant};

/// Times one code region and reports it to a [`Recorder`] exactly once.
///
/// The clock starts on construction. The event is submitted by the first call to
/// [`stop`](Self::stop) or, failing that, when the timer is dropped, which covers
/// early returns, `?` and unwinding panics alike.
///
/// ```no_run
/// use scopetrace::{Recorder, ScopedTimer};
///
/// let recorder = Recorder::new();
/// recorder.begin_session("startup", "startup.json");
/// {
///     let _timer = ScopedTimer::new(&recorder, "load_config");
///     // ... work ...
/// }
/// recorder.end_session();
/// ```
#[derive(Debug)]
#[must_use = "a timer reports when it is dropped; binding it to `_` drops it immediately"]
pub struct ScopedTimer<'r> {
    recorder: &'r Recorder,
    name: Cow<'static, str>,
    start: Instant,
    stopped: bool,
}

impl<'r> ScopedTimer<'r> {
    /// Starts timing `name` immediately.
    pub fn new(recorder: &'r Recorder, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            recorder,
            name: name.into(),
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Ends the measurement and submits the event. Only the first call has any effect.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        let end = Instant::now();
        self.stopped = true;

        let clock = self.recorder.clock();
        let event = Event::new(
            self.name.as_ref(),
            clock.to_epoch_us(self.start),
            clock.to_epoch_us(end),
            clock::current_thread_id(),
        );
        self.recorder.record_event(&event);
    }

    /// The region name this timer reports under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the event has already been submitted.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Time since the timer started. Keeps growing after `stop`.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        self.stop();
    }
}
