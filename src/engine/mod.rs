//! engine
//!
//! The audit pipeline: load, resolve, fetch, verify, report.
//!
//! # Architecture
//!
//! ```text
//! Repository ─> loader ─> CatalogRecord ─> consistency ─> ResolutionOutcome
//!                                                │
//!                                   ResolvedAtHead + fetcher
//!                                                │
//!                                      remote::Fetcher ─> fixity
//! ```
//!
//! Every stage returns values. The [`runner`] turns them into
//! [`findings::Finding`]s for a [`findings::Reporter`] and collects them into
//! an [`runner::AuditReport`].
//!
//! # Modules
//!
//! - [`loader`] - Inventory and catalog loading per object
//! - [`consistency`] - Two-phase resolution of logical paths
//! - [`fixity`] - Streaming digests and manifest comparison
//! - [`findings`] - Finding kinds, severities and reporters
//! - [`runner`] - Concurrent orchestration of a whole audit
//!
//! # Invariants
//!
//! - The engine never writes to the store
//! - Per-object and per-file failures are findings, not errors
//! - Only repository enumeration failure aborts a run

pub mod consistency;
pub mod findings;
pub mod fixity;
pub mod loader;
pub mod runner;

pub use consistency::{check_record, resolve, FileCheck, ResolutionOutcome};
pub use findings::{Finding, FindingKind, MemoryReporter, Reporter, Severity, TracingReporter};
pub use fixity::{FixityError, FixityResult};
pub use loader::{load_record, load_records, CatalogRecord, LoadError, LoadedRecords};
pub use runner::{AuditOptions, AuditReport, AuditSummary, Auditor, RunError};
