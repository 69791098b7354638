//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-gated printing and report rendering
//! - [`logging`] - `tracing` subscriber setup
//! - [`progress`] - Download progress as log events
//!
//! # Design
//!
//! Library code never prints. Everything a user sees on stdout goes through
//! [`output`]; diagnostics go through `tracing` to stderr.

pub mod logging;
pub mod output;
pub mod progress;
