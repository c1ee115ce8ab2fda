//! Command-line interface
//!
//! Command handlers for the `spv-core` binary.

pub mod commands;

pub use commands::*;
