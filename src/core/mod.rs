// src/core/mod.rs

//! The recording engine: recorder, timers, timebase and output rendering.

pub mod clock;
pub mod recorder;
pub mod timer;
pub mod trace_format;
