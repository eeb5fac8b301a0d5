// src/cli/handlers/mod.rs

//! One module per `scopetrace` subcommand.

pub mod demo;
pub mod inspect;
