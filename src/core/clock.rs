// src/core/clock.rs

//! Timestamps and thread ids for events.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Converts monotonic [`Instant`]s into microseconds since the Unix epoch.
///
/// The wall clock is read once, when the clock is created. Every later timestamp
/// is that anchor plus monotonic elapsed time, so two reads taken in order never
/// go backwards even if the system clock is adjusted mid-session.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    anchor_instant: Instant,
    anchor_epoch_us: u64,
}

impl Clock {
    /// Anchors a new clock to the current wall time.
    pub fn new() -> Self {
        let anchor_instant = Instant::now();
        let anchor_epoch_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| saturating_micros(d.as_micros()))
            .unwrap_or(0);
        Self {
            anchor_instant,
            anchor_epoch_us,
        }
    }

    /// Current time in microseconds since the epoch.
    pub fn now_us(&self) -> u64 {
        self.to_epoch_us(Instant::now())
    }

    /// Maps an instant onto the epoch timeline. Instants older than the anchor clamp to it.
    pub fn to_epoch_us(&self, instant: Instant) -> u64 {
        let since_anchor = instant.saturating_duration_since(self.anchor_instant);
        self.anchor_epoch_us
            .saturating_add(saturating_micros(since_anchor.as_micros()))
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_micros(us: u128) -> u64 {
    u64::try_from(us).unwrap_or(u64::MAX)
}

/// A stable numeric id for the calling thread: a hash of its [`std::thread::ThreadId`].
pub fn current_thread_id() -> u64 {
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = Clock::new();
        let a = clock.now_us();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.now_us();
        assert!(b >= a + 1_000, "expected at least 1ms between reads, got {a} -> {b}");
    }

    #[test]
    fn test_clock_is_anchored_near_wall_time() {
        let clock = Clock::new();
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_micros() as u64;
        let ours = clock.now_us();
        assert!(wall.abs_diff(ours) < 1_000_000);
    }

    #[test]
    fn test_instants_before_anchor_clamp() {
        let early = Instant::now();
        std::thread::sleep(Duration::from_millis(1));
        let clock = Clock::new();
        assert_eq!(clock.to_epoch_us(early), clock.to_epoch_us(clock.anchor_instant));
    }

    #[test]
    fn test_thread_id_is_stable_per_thread() {
        let here = current_thread_id();
        assert_eq!(here, current_thread_id());

        let there = std::thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, there);
    }
}
