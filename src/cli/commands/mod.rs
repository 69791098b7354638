//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Merges its flags over the configuration
//! 2. Calls the engine
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `check` fetches over the network, so it builds a tokio runtime and
//! blocks on the audit. The other commands are synchronous.

mod check;
mod completion;
mod resolve;

pub use check::{check, merge_flags};
pub use completion::completion;
pub use resolve::resolve;

use super::args::Command;
use super::{Context, Status};
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<Status> {
    match command {
        Command::Check(args) => check(ctx, &args),
        Command::Resolve {
            repo,
            object,
            logical,
        } => resolve(ctx, &repo, &object, &logical),
        Command::Completion { shell } => {
            completion(shell)?;
            Ok(Status::Clean)
        }
    }
}
