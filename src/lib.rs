//! ocfl-audit - Consistency and fixity auditor for OCFL repositories
//!
//! ocfl-audit reconciles the RO-Crate catalog of every object in an OCFL
//! storage root with the object's inventory, and can cross-check the bytes
//! a remote access portal delivers against the digests in the manifest.
//!
//! For every object it answers:
//!
//! 1. Is every File entity in the catalog present in the head version?
//! 2. If not, was it present in an earlier version (drift)?
//! 3. When fetched remotely, do the bytes match the manifest digest?
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Loading, resolution, fixity and concurrent orchestration
//! - [`ocfl`] - Read-only access to the object store
//! - [`catalog`] - Typed projection of RO-Crate JSON-LD
//! - [`remote`] - Streaming fetch from the access endpoint
//! - [`core`] - Domain types and configuration
//! - [`ui`] - Output rendering and logging setup
//!
//! # Correctness Invariants
//!
//! 1. The object store is never written to
//! 2. One object's failure never stops the audit of the others
//! 3. Every failure mode has a distinct, greppable finding code
//! 4. Fixity is only checked on a completed download

pub mod catalog;
pub mod cli;
pub mod core;
pub mod engine;
pub mod ocfl;
pub mod remote;
pub mod ui;
