//! cli
//!
//! Command-line interface layer for ocfl-audit.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Delegate to command handlers and map their outcome to an exit status
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, merges flags over
//! the configuration file and hands the work to [`crate::engine`].
//!
//! # Exit status
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Completed, no integrity findings          |
//! | 2    | Completed with integrity findings         |
//! | 1    | Fatal error (bad arguments, config, repo) |

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Command, Shell};

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::ui::{logging, output, output::Verbosity};

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    /// Output verbosity
    pub verbosity: Verbosity,
    /// Machine-readable output
    pub json: bool,
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing to report.
    Clean,
    /// The audit found integrity problems.
    IntegrityFindings,
}

impl Status {
    /// Process exit code for this status.
    pub fn code(self) -> u8 {
        match self {
            Status::Clean => 0,
            Status::IntegrityFindings => 2,
        }
    }
}

/// Exit code for fatal errors.
pub const FATAL_EXIT: u8 = 1;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(FATAL_EXIT)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let ctx = Context {
        config: cli.config.clone(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        json: cli.json,
    };
    logging::init(ctx.verbosity, ctx.json);

    match commands::dispatch(cli.command, &ctx) {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            output::error(format!("{:#}", e));
            ExitCode::from(FATAL_EXIT)
        }
    }
}
