//! engine::findings
//!
//! Structured audit findings and the observer that renders them.
//!
//! # Architecture
//!
//! Every stage of the audit produces findings as values. A [`Reporter`]
//! receives them as they happen; the engine never writes to a console or
//! log directly. Each finding has a stable [`FindingKind`] whose code
//! (`fixity-mismatch`, `file-drift-detected`, ...) appears in every rendered
//! form, so distinct failure modes can be told apart with a plain grep.
//!
//! # Example
//!
//! ```
//! use ocfl_audit::engine::findings::{Finding, FindingKind, MemoryReporter, Reporter, Severity};
//!
//! let reporter = MemoryReporter::new();
//! reporter.report(&Finding::FileUnresolved {
//!     object: "ab/cd".to_string(),
//!     file: "data.csv".to_string(),
//! });
//!
//! let findings = reporter.findings();
//! assert_eq!(findings[0].kind(), FindingKind::FileUnresolved);
//! assert_eq!(findings[0].kind().code(), "file-unresolved");
//! assert_eq!(findings[0].kind().severity(), Severity::Integrity);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::types::{ContentDigest, VersionLabel};

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; the unit passed.
    Info,

    /// Something unexpected that does not prove data loss.
    Warning,

    /// Metadata and storage disagree, or bytes do not match.
    Integrity,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Integrity => write!(f, "integrity"),
        }
    }
}

/// Stable classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    ObjectLoaded,
    ObjectUnreadable,
    CatalogNotFound,
    CatalogUnparsable,
    IdentifierNotFound,
    FileResolved,
    FileUnresolved,
    FileDriftDetected,
    FetchSucceeded,
    RemoteFetchFailure,
    FixityVerified,
    FixityMismatch,
    ManifestCorrelationFailure,
}

impl FindingKind {
    /// All kinds, in declaration order.
    pub const ALL: [FindingKind; 13] = [
        FindingKind::ObjectLoaded,
        FindingKind::ObjectUnreadable,
        FindingKind::CatalogNotFound,
        FindingKind::CatalogUnparsable,
        FindingKind::IdentifierNotFound,
        FindingKind::FileResolved,
        FindingKind::FileUnresolved,
        FindingKind::FileDriftDetected,
        FindingKind::FetchSucceeded,
        FindingKind::RemoteFetchFailure,
        FindingKind::FixityVerified,
        FindingKind::FixityMismatch,
        FindingKind::ManifestCorrelationFailure,
    ];

    /// The greppable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::ObjectLoaded => "object-loaded",
            FindingKind::ObjectUnreadable => "object-unreadable",
            FindingKind::CatalogNotFound => "catalog-not-found",
            FindingKind::CatalogUnparsable => "catalog-unparsable",
            FindingKind::IdentifierNotFound => "identifier-not-found",
            FindingKind::FileResolved => "file-resolved",
            FindingKind::FileUnresolved => "file-unresolved",
            FindingKind::FileDriftDetected => "file-drift-detected",
            FindingKind::FetchSucceeded => "fetch-succeeded",
            FindingKind::RemoteFetchFailure => "remote-fetch-failure",
            FindingKind::FixityVerified => "fixity-verified",
            FindingKind::FixityMismatch => "fixity-mismatch",
            FindingKind::ManifestCorrelationFailure => "manifest-correlation-failure",
        }
    }

    /// How serious this kind is.
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::ObjectLoaded
            | FindingKind::FileResolved
            | FindingKind::FetchSucceeded
            | FindingKind::FixityVerified => Severity::Info,

            FindingKind::ObjectUnreadable
            | FindingKind::CatalogNotFound
            | FindingKind::CatalogUnparsable
            | FindingKind::IdentifierNotFound
            | FindingKind::RemoteFetchFailure => Severity::Warning,

            FindingKind::FileUnresolved
            | FindingKind::FileDriftDetected
            | FindingKind::FixityMismatch
            | FindingKind::ManifestCorrelationFailure => Severity::Integrity,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Finding {
    ObjectLoaded {
        object: String,
        catalog: String,
    },
    ObjectUnreadable {
        object: String,
        reason: String,
    },
    CatalogNotFound {
        object: String,
        accepted: Vec<String>,
    },
    CatalogUnparsable {
        object: String,
        catalog: String,
        reason: String,
    },
    IdentifierNotFound {
        object: String,
        namespace: String,
        fallback: String,
    },
    FileResolved {
        object: String,
        file: String,
        physical: String,
    },
    FileUnresolved {
        object: String,
        file: String,
    },
    FileDriftDetected {
        object: String,
        file: String,
        versions: BTreeMap<VersionLabel, String>,
    },
    FetchSucceeded {
        object: String,
        file: String,
        local: PathBuf,
        bytes: u64,
    },
    RemoteFetchFailure {
        object: String,
        file: String,
        reason: String,
        partial: Option<PathBuf>,
    },
    FixityVerified {
        object: String,
        file: String,
        digest: ContentDigest,
    },
    FixityMismatch {
        object: String,
        file: String,
        expected: ContentDigest,
        observed: ContentDigest,
        local: PathBuf,
    },
    ManifestCorrelationFailure {
        object: String,
        file: String,
        physical: String,
        reason: String,
    },
}

impl Finding {
    /// The finding's kind.
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::ObjectLoaded { .. } => FindingKind::ObjectLoaded,
            Finding::ObjectUnreadable { .. } => FindingKind::ObjectUnreadable,
            Finding::CatalogNotFound { .. } => FindingKind::CatalogNotFound,
            Finding::CatalogUnparsable { .. } => FindingKind::CatalogUnparsable,
            Finding::IdentifierNotFound { .. } => FindingKind::IdentifierNotFound,
            Finding::FileResolved { .. } => FindingKind::FileResolved,
            Finding::FileUnresolved { .. } => FindingKind::FileUnresolved,
            Finding::FileDriftDetected { .. } => FindingKind::FileDriftDetected,
            Finding::FetchSucceeded { .. } => FindingKind::FetchSucceeded,
            Finding::RemoteFetchFailure { .. } => FindingKind::RemoteFetchFailure,
            Finding::FixityVerified { .. } => FindingKind::FixityVerified,
            Finding::FixityMismatch { .. } => FindingKind::FixityMismatch,
            Finding::ManifestCorrelationFailure { .. } => FindingKind::ManifestCorrelationFailure,
        }
    }

    /// The object this finding is about.
    pub fn object(&self) -> &str {
        match self {
            Finding::ObjectLoaded { object, .. }
            | Finding::ObjectUnreadable { object, .. }
            | Finding::CatalogNotFound { object, .. }
            | Finding::CatalogUnparsable { object, .. }
            | Finding::IdentifierNotFound { object, .. }
            | Finding::FileResolved { object, .. }
            | Finding::FileUnresolved { object, .. }
            | Finding::FileDriftDetected { object, .. }
            | Finding::FetchSucceeded { object, .. }
            | Finding::RemoteFetchFailure { object, .. }
            | Finding::FixityVerified { object, .. }
            | Finding::FixityMismatch { object, .. }
            | Finding::ManifestCorrelationFailure { object, .. } => object,
        }
    }

    /// The file this finding is about, for file-level findings.
    pub fn file(&self) -> Option<&str> {
        match self {
            Finding::FileResolved { file, .. }
            | Finding::FileUnresolved { file, .. }
            | Finding::FileDriftDetected { file, .. }
            | Finding::FetchSucceeded { file, .. }
            | Finding::RemoteFetchFailure { file, .. }
            | Finding::FixityVerified { file, .. }
            | Finding::FixityMismatch { file, .. }
            | Finding::ManifestCorrelationFailure { file, .. } => Some(file),
            _ => None,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind().code(), self.object())?;
        if let Some(file) = self.file() {
            write!(f, " {}", file)?;
        }

        match self {
            Finding::ObjectLoaded { catalog, .. } => write!(f, ": loaded {}", catalog),
            Finding::ObjectUnreadable { reason, .. } => write!(f, ": {}", reason),
            Finding::CatalogNotFound { accepted, .. } => {
                write!(f, ": none of {} in head state", accepted.join(", "))
            }
            Finding::CatalogUnparsable {
                catalog, reason, ..
            } => write!(f, ": {}: {}", catalog, reason),
            Finding::IdentifierNotFound {
                namespace,
                fallback,
                ..
            } => write!(
                f,
                ": no identifier in namespace '{}', using '{}'",
                namespace, fallback
            ),
            Finding::FileResolved { physical, .. } => write!(f, " -> {}", physical),
            Finding::FileUnresolved { .. } => write!(f, ": not present in any version"),
            Finding::FileDriftDetected { versions, .. } => {
                let found = versions
                    .iter()
                    .map(|(v, p)| format!("{}:{}", v, p))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, ": missing from head, found in {}", found)
            }
            Finding::FetchSucceeded { bytes, .. } => write!(f, ": {} bytes", bytes),
            Finding::RemoteFetchFailure { reason, .. } => write!(f, ": {}", reason),
            Finding::FixityVerified { digest, .. } => write!(f, ": {}", digest),
            Finding::FixityMismatch {
                expected, observed, ..
            } => write!(f, ": expected {} observed {}", expected, observed),
            Finding::ManifestCorrelationFailure {
                physical, reason, ..
            } => write!(f, ": {} for {}", reason, physical),
        }
    }
}

/// Observer for audit findings.
///
/// Implementations must be `Send + Sync`; findings arrive from concurrent
/// object audits.
pub trait Reporter: Send + Sync {
    fn report(&self, finding: &Finding);
}

/// Renders findings as `tracing` events.
///
/// Every event carries `code` and `object` fields; the level follows the
/// finding's severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, finding: &Finding) {
        let code = finding.kind().code();
        let object = finding.object();
        let file = finding.file().unwrap_or("");

        match finding.kind().severity() {
            Severity::Info => tracing::info!(code, object, file, "{}", finding),
            Severity::Warning => tracing::warn!(code, object, file, "{}", finding),
            Severity::Integrity => tracing::error!(code, object, file, "{}", finding),
        }
    }
}

/// Collects findings in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    findings: Mutex<Vec<Finding>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Findings received so far, in arrival order.
    pub fn findings(&self) -> Vec<Finding> {
        self.findings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Findings of one kind.
    pub fn of_kind(&self, kind: FindingKind) -> Vec<Finding> {
        self.findings()
            .into_iter()
            .filter(|f| f.kind() == kind)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, finding: &Finding) {
        self.findings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(finding.clone());
    }
}
