//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, the report is printed as JSON and nothing else
//! goes to stdout.

use std::fmt::Display;

use serde::Serialize;

use crate::engine::runner::{
    AuditReport, AuditSummary, FetchOutcome, FileAudit, FixityCheck, ObjectAudit, ObjectStatus,
};
use crate::engine::ResolutionOutcome;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line-per-count summary of a run.
pub fn render_summary(summary: &AuditSummary) -> String {
    let elapsed = summary.finished - summary.started;
    let mut lines = vec![
        format!(
            "Objects: {} ({} skipped, {} without namespaced identifier)",
            summary.objects, summary.objects_skipped, summary.identifier_fallbacks
        ),
        format!(
            "Files: {} ({} at head, {} drifted, {} unresolved)",
            summary.files, summary.resolved_at_head, summary.drifted, summary.unresolved
        ),
    ];

    if summary.fetched + summary.fetch_failures > 0 {
        lines.push(format!(
            "Fetched: {} ({} failed)",
            summary.fetched, summary.fetch_failures
        ));
    }
    if summary.fixity_verified + summary.fixity_mismatches + summary.correlation_failures > 0 {
        lines.push(format!(
            "Fixity: {} verified, {} mismatched, {} uncorrelated",
            summary.fixity_verified, summary.fixity_mismatches, summary.correlation_failures
        ));
    }

    lines.push(format!("Elapsed: {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0));
    lines.push(if summary.is_clean() {
        "Result: clean".to_string()
    } else {
        format!("Result: {} integrity finding(s)", summary.integrity_findings())
    });

    lines.join("\n")
}

fn file_problems(object: &ObjectAudit, file: &FileAudit) -> Vec<String> {
    let mut problems = Vec::new();
    let prefix = format!("{} {}", object.path, file.file);

    match &file.resolution {
        ResolutionOutcome::ResolvedInEarlierVersion { versions } => {
            let labels = versions.keys().map(|v| v.as_str()).collect::<Vec<_>>();
            problems.push(format!(
                "[file-drift-detected] {}: only in {}",
                prefix,
                labels.join(", ")
            ));
        }
        ResolutionOutcome::Unresolved => {
            problems.push(format!("[file-unresolved] {}", prefix));
        }
        ResolutionOutcome::ResolvedAtHead { .. } => {}
    }

    if let Some(FetchOutcome::Failed { reason, .. }) = &file.fetch {
        problems.push(format!("[remote-fetch-failure] {}: {}", prefix, reason));
    }

    match &file.fixity {
        Some(FixityCheck::Mismatch { expected, observed }) => problems.push(format!(
            "[fixity-mismatch] {}: expected {} observed {}",
            prefix, expected, observed
        )),
        Some(FixityCheck::ManifestEntryNotFound { physical }) => problems.push(format!(
            "[manifest-correlation-failure] {}: {}",
            prefix, physical
        )),
        Some(FixityCheck::Uncorrelated { physical, reason }) => problems.push(format!(
            "[manifest-correlation-failure] {}: {}: {}",
            prefix, physical, reason
        )),
        Some(FixityCheck::Unreadable { reason }) => problems.push(format!(
            "[remote-fetch-failure] {}: downloaded copy unreadable: {}",
            prefix, reason
        )),
        Some(FixityCheck::Verified { .. }) | None => {}
    }

    problems
}

/// Human-readable report: problems first, then the summary.
pub fn render_report(report: &AuditReport) -> String {
    let mut lines = vec![format!("Repository: {}", report.repository.display())];

    let mut problems = Vec::new();
    for object in &report.objects {
        if let ObjectStatus::Skipped { reason, .. } = &object.status {
            problems.push(reason.clone());
        }
        for file in &object.files {
            problems.extend(file_problems(object, file));
        }
    }

    if !problems.is_empty() {
        lines.push(String::new());
        lines.push(format_list(&problems, "  "));
    }

    lines.push(String::new());
    lines.push(render_summary(&report.summary));
    lines.join("\n")
}
