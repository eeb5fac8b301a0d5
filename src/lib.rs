//! Scoped wall-clock instrumentation written out as Chrome-trace JSON.
//!
//! A [`Recorder`] owns one recording session at a time. [`ScopedTimer`]s measure
//! regions of code and report to it when they stop or go out of scope; the
//! result opens in `chrome://tracing`, Perfetto or any viewer that understands
//! complete (`"ph":"X"`) events.

#[macro_use]
mod macros;

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;

pub use crate::core::recorder::Recorder;
pub use crate::core::timer::ScopedTimer;
