//! engine::runner
//!
//! The auditor: drives loading, resolution, fetch and fixity for a whole
//! repository.
//!
//! # Pipeline
//!
//! ```text
//! enumerate objects
//!   -> per object (concurrent, up to object_parallelism):
//!        load inventory + catalog        (blocking pool)
//!        resolve identifier (fallback logged)
//!        per File entity (concurrent):
//!          resolve against history
//!          fetch if ResolvedAtHead and filter matches   (fetch semaphore)
//!          fixity if fetch succeeded and enabled         (blocking pool)
//! ```
//!
//! # Invariants
//!
//! - Only enumeration of the repository can fail the run
//! - Every per-object and per-file problem becomes a [`Finding`]
//! - Fixity is never attempted on a failed fetch
//! - Concurrent fetches never exceed `max_concurrent_fetches`
//! - Partial and mismatching downloads are left in the scratch area
//!
//! # Example
//!
//! ```ignore
//! use ocfl_audit::engine::runner::{AuditOptions, Auditor};
//! use ocfl_audit::ocfl::Repository;
//!
//! let repo = Repository::open("/srv/ocfl")?;
//! let report = Auditor::new(repo, AuditOptions::default())?.run().await?;
//! assert!(report.summary.is_clean());
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;

use super::consistency::{check_record, FileCheck, ResolutionOutcome};
use super::findings::{Finding, FindingKind, Reporter, TracingReporter};
use super::fixity::{self, FixityError, FixityResult};
use super::loader::{load_record, CatalogRecord, LoadError};
use crate::catalog::{resolve_identifier, ObjectIdentifier};
use crate::core::config::{Config, DEFAULT_NAMESPACE};
use crate::core::types::ContentDigest;
use crate::ocfl::{OcflObject, Repository, RepositoryError};
use crate::remote::{FetchRequest, Fetcher, NoProgress, ProgressObserver, ScratchArea};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The repository could not be enumerated.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The fetch filter is not a valid regular expression.
    #[error("invalid fetch filter: {0}")]
    Filter(#[from] regex::Error),

    /// A background task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

/// Knobs for a run.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Namespace of the identifier used for fetch URLs
    pub namespace: String,
    /// Accepted catalog filenames, in priority order
    pub catalog_files: Vec<String>,
    /// Verify fetched bytes against the manifest
    pub fixity: bool,
    /// Only fetch files whose physical path matches
    pub fetch_filter: Option<String>,
    /// Objects audited at once
    pub object_parallelism: usize,
    /// Remote fetches in flight at once
    pub max_concurrent_fetches: usize,
    /// Keep verified downloads
    pub keep_downloads: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            catalog_files: crate::core::config::DEFAULT_CATALOG_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fixity: false,
            fetch_filter: None,
            object_parallelism: 8,
            max_concurrent_fetches: 4,
            keep_downloads: false,
        }
    }
}

impl AuditOptions {
    /// Options from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            namespace: config.namespace().to_string(),
            catalog_files: config.catalog_files(),
            fixity: config.fixity(),
            fetch_filter: config.fetch_filter().map(str::to_string),
            object_parallelism: config.object_parallelism(),
            max_concurrent_fetches: config.max_concurrent_fetches(),
            keep_downloads: config.keep_downloads(),
        }
    }
}

/// Result of a fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Fetched { local: PathBuf, bytes: u64 },
    Failed { reason: String, partial: Option<PathBuf> },
}

/// Result of a fixity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixityCheck {
    Verified { digest: ContentDigest },
    Mismatch { expected: ContentDigest, observed: ContentDigest },
    ManifestEntryNotFound { physical: String },
    /// The manifest entry could not be read as a digest
    Uncorrelated { physical: String, reason: String },
    /// The downloaded copy could not be hashed
    Unreadable { reason: String },
}

/// Audit of one File entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAudit {
    pub file: String,
    pub resolution: ResolutionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch: Option<FetchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixity: Option<FixityCheck>,
}

/// Whether an object was audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObjectStatus {
    Audited,
    Skipped { kind: FindingKind, reason: String },
}

/// Audit of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectAudit {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<ObjectIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    pub status: ObjectStatus,
    pub files: Vec<FileAudit>,
}

/// Counts over a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub objects: usize,
    pub objects_skipped: usize,
    pub identifier_fallbacks: usize,
    pub files: usize,
    pub resolved_at_head: usize,
    pub drifted: usize,
    pub unresolved: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
    pub fixity_verified: usize,
    pub fixity_mismatches: usize,
    pub correlation_failures: usize,
}

impl AuditSummary {
    fn tally(started: DateTime<Utc>, finished: DateTime<Utc>, objects: &[ObjectAudit]) -> Self {
        let mut summary = AuditSummary {
            started,
            finished,
            objects: objects.len(),
            objects_skipped: 0,
            identifier_fallbacks: 0,
            files: 0,
            resolved_at_head: 0,
            drifted: 0,
            unresolved: 0,
            fetched: 0,
            fetch_failures: 0,
            fixity_verified: 0,
            fixity_mismatches: 0,
            correlation_failures: 0,
        };

        for object in objects {
            if matches!(object.status, ObjectStatus::Skipped { .. }) {
                summary.objects_skipped += 1;
            }
            if object.identifier.as_ref().is_some_and(|i| i.is_fallback()) {
                summary.identifier_fallbacks += 1;
            }

            for file in &object.files {
                summary.files += 1;
                match file.resolution {
                    ResolutionOutcome::ResolvedAtHead { .. } => summary.resolved_at_head += 1,
                    ResolutionOutcome::ResolvedInEarlierVersion { .. } => summary.drifted += 1,
                    ResolutionOutcome::Unresolved => summary.unresolved += 1,
                }
                match file.fetch {
                    Some(FetchOutcome::Fetched { .. }) => summary.fetched += 1,
                    Some(FetchOutcome::Failed { .. }) => summary.fetch_failures += 1,
                    None => {}
                }
                match file.fixity {
                    Some(FixityCheck::Verified { .. }) => summary.fixity_verified += 1,
                    Some(FixityCheck::Mismatch { .. }) => summary.fixity_mismatches += 1,
                    Some(FixityCheck::ManifestEntryNotFound { .. })
                    | Some(FixityCheck::Uncorrelated { .. }) => summary.correlation_failures += 1,
                    Some(FixityCheck::Unreadable { .. }) => summary.fetch_failures += 1,
                    None => {}
                }
            }
        }

        summary
    }

    /// Findings of integrity severity.
    pub fn integrity_findings(&self) -> usize {
        self.drifted + self.unresolved + self.fixity_mismatches + self.correlation_failures
    }

    /// No integrity findings.
    pub fn is_clean(&self) -> bool {
        self.integrity_findings() == 0
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub repository: PathBuf,
    pub summary: AuditSummary,
    pub objects: Vec<ObjectAudit>,
}

/// Drives an audit.
pub struct Auditor {
    repo: Repository,
    options: AuditOptions,
    filter: Option<Regex>,
    fetcher: Option<(Arc<dyn Fetcher>, ScratchArea)>,
    fetch_limit: Semaphore,
    reporter: Arc<dyn Reporter>,
    progress: Arc<dyn ProgressObserver>,
}

impl Auditor {
    /// Create an auditor that reports through `tracing` and does not fetch.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Filter` if the fetch filter does not compile.
    pub fn new(repo: Repository, options: AuditOptions) -> Result<Self, RunError> {
        let filter = options.fetch_filter.as_deref().map(Regex::new).transpose()?;
        let fetch_limit = Semaphore::new(options.max_concurrent_fetches.max(1));

        Ok(Self {
            repo,
            options,
            filter,
            fetcher: None,
            fetch_limit,
            reporter: Arc::new(TracingReporter),
            progress: Arc::new(NoProgress),
        })
    }

    /// Fetch resolved files through `fetcher` into `scratch`.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>, scratch: ScratchArea) -> Self {
        self.fetcher = Some((fetcher, scratch));
        self
    }

    /// Send findings to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Send transfer progress to `progress`.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Audit every object in the repository.
    pub async fn run(&self) -> Result<AuditReport, RunError> {
        let started = Utc::now();

        let repo = self.repo.clone();
        let listing = tokio::task::spawn_blocking(move || repo.objects())
            .await
            .map_err(|e| RunError::Task(e.to_string()))??;
        let objects = listing.objects;

        tracing::info!(
            repository = %self.repo.root().display(),
            objects = objects.len(),
            fetch = self.fetcher.is_some(),
            fixity = self.options.fixity,
            "audit started"
        );

        let mut audits: Vec<ObjectAudit> = stream::iter(objects)
            .map(|object| self.audit_object(object))
            .buffer_unordered(self.options.object_parallelism.max(1))
            .collect()
            .await;
        for entry in listing.unreadable {
            let finding = Finding::ObjectUnreadable {
                object: entry.path.clone(),
                reason: entry.reason,
            };
            audits.push(self.skipped(entry.path, finding));
        }
        audits.sort_by(|a, b| a.path.cmp(&b.path));

        let summary = AuditSummary::tally(started, Utc::now(), &audits);
        tracing::info!(
            objects = summary.objects,
            files = summary.files,
            integrity = summary.integrity_findings(),
            "audit finished"
        );

        Ok(AuditReport {
            repository: self.repo.root().to_path_buf(),
            summary,
            objects: audits,
        })
    }

    async fn audit_object(&self, object: OcflObject) -> ObjectAudit {
        let path = object.path().to_string();
        let catalogs = self.options.catalog_files.clone();

        let loaded = tokio::task::spawn_blocking(move || load_record(&object, &catalogs))
            .await
            .map_err(|e| e.to_string());

        let record = match loaded {
            Ok(Ok(record)) => Arc::new(record),
            Ok(Err(err)) => return self.skip_object(path, err),
            Err(reason) => {
                let finding = Finding::ObjectUnreadable {
                    object: path.clone(),
                    reason,
                };
                return self.skipped(path, finding);
            }
        };

        self.reporter.report(&Finding::ObjectLoaded {
            object: path.clone(),
            catalog: record.catalog_file.clone(),
        });

        let identifier = resolve_identifier(&record.graph, &self.options.namespace, &record.path);
        if identifier.is_fallback() {
            self.reporter.report(&Finding::IdentifierNotFound {
                object: path.clone(),
                namespace: self.options.namespace.clone(),
                fallback: identifier.value.clone(),
            });
        }

        let checks = check_record(&record);
        let files = join_all(
            checks
                .into_iter()
                .map(|check| self.audit_file(&record, &identifier, check)),
        )
        .await;

        ObjectAudit {
            path,
            identifier: Some(identifier),
            catalog: Some(record.catalog_file.clone()),
            status: ObjectStatus::Audited,
            files,
        }
    }

    fn skip_object(&self, path: String, err: LoadError) -> ObjectAudit {
        let finding = match err {
            LoadError::CatalogNotFound { accepted } => Finding::CatalogNotFound {
                object: path.clone(),
                accepted,
            },
            LoadError::CatalogUnparsable { catalog, source } => Finding::CatalogUnparsable {
                object: path.clone(),
                catalog,
                reason: source.to_string(),
            },
            other @ (LoadError::Object(_) | LoadError::CatalogUnreadable { .. }) => {
                Finding::ObjectUnreadable {
                    object: path.clone(),
                    reason: other.to_string(),
                }
            }
        };
        self.skipped(path, finding)
    }

    fn skipped(&self, path: String, finding: Finding) -> ObjectAudit {
        self.reporter.report(&finding);
        ObjectAudit {
            path,
            identifier: None,
            catalog: None,
            status: ObjectStatus::Skipped {
                kind: finding.kind(),
                reason: finding.to_string(),
            },
            files: Vec::new(),
        }
    }

    async fn audit_file(
        &self,
        record: &Arc<CatalogRecord>,
        identifier: &ObjectIdentifier,
        check: FileCheck,
    ) -> FileAudit {
        let object = record.path.as_str();
        let file = check.file.id;

        let finding = match &check.outcome {
            ResolutionOutcome::ResolvedAtHead { physical } => Finding::FileResolved {
                object: object.to_string(),
                file: file.clone(),
                physical: physical.clone(),
            },
            ResolutionOutcome::ResolvedInEarlierVersion { versions } => {
                Finding::FileDriftDetected {
                    object: object.to_string(),
                    file: file.clone(),
                    versions: versions.clone(),
                }
            }
            ResolutionOutcome::Unresolved => Finding::FileUnresolved {
                object: object.to_string(),
                file: file.clone(),
            },
        };
        self.reporter.report(&finding);

        let mut audit = FileAudit {
            file,
            resolution: check.outcome,
            fetch: None,
            fixity: None,
        };

        let Some(physical) = audit.resolution.head_physical().map(str::to_string) else {
            return audit;
        };
        let Some((fetcher, scratch)) = &self.fetcher else {
            return audit;
        };
        if let Some(filter) = &self.filter {
            if !filter.is_match(&physical) {
                tracing::debug!(object, file = %audit.file, %physical, "fetch filtered out");
                return audit;
            }
        }

        let dest = scratch.allocate(&audit.file);
        let request = FetchRequest::new(identifier.value.as_str(), audit.file.as_str());
        let fetched = {
            let _permit = self.fetch_limit.acquire().await.ok();
            let fetched = fetcher.fetch(&request, &dest, self.progress.as_ref()).await;
            self.progress.on_finished(&request);
            fetched
        };

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                let partial = (err.may_leave_partial() && dest.exists()).then_some(dest);
                self.reporter.report(&Finding::RemoteFetchFailure {
                    object: object.to_string(),
                    file: audit.file.clone(),
                    reason: err.to_string(),
                    partial: partial.clone(),
                });
                audit.fetch = Some(FetchOutcome::Failed {
                    reason: err.to_string(),
                    partial,
                });
                return audit;
            }
        };

        self.reporter.report(&Finding::FetchSucceeded {
            object: object.to_string(),
            file: audit.file.clone(),
            local: fetched.path.clone(),
            bytes: fetched.bytes,
        });
        audit.fetch = Some(FetchOutcome::Fetched {
            local: fetched.path.clone(),
            bytes: fetched.bytes,
        });

        if !self.options.fixity {
            self.discard(scratch, &fetched.path);
            return audit;
        }

        let check = self
            .check_fixity(record, &audit.file, physical, fetched.path.clone())
            .await;
        if matches!(check, FixityCheck::Verified { .. }) {
            self.discard(scratch, &fetched.path);
        }
        audit.fixity = Some(check);
        audit
    }

    async fn check_fixity(
        &self,
        record: &Arc<CatalogRecord>,
        file: &str,
        physical: String,
        local: PathBuf,
    ) -> FixityCheck {
        let object = record.path.clone();
        let task_record = Arc::clone(record);
        let task_physical = physical.clone();
        let task_local = local.clone();

        let result = tokio::task::spawn_blocking(move || {
            fixity::validate(&task_record.inventory, &task_physical, &task_local)
        })
        .await;

        match result {
            Ok(Ok(FixityResult::Compared { expected, observed })) if expected == observed => {
                self.reporter.report(&Finding::FixityVerified {
                    object,
                    file: file.to_string(),
                    digest: observed.clone(),
                });
                FixityCheck::Verified { digest: observed }
            }
            Ok(Ok(FixityResult::Compared { expected, observed })) => {
                self.reporter.report(&Finding::FixityMismatch {
                    object,
                    file: file.to_string(),
                    expected: expected.clone(),
                    observed: observed.clone(),
                    local,
                });
                FixityCheck::Mismatch { expected, observed }
            }
            Ok(Ok(FixityResult::ManifestEntryNotFound { physical })) => {
                self.reporter.report(&Finding::ManifestCorrelationFailure {
                    object,
                    file: file.to_string(),
                    physical: physical.clone(),
                    reason: "no manifest entry".to_string(),
                });
                FixityCheck::ManifestEntryNotFound { physical }
            }
            Ok(Err(err @ FixityError::Io { .. })) => {
                self.unreadable(object, file, local, err.to_string())
            }
            Ok(Err(err)) => {
                self.reporter.report(&Finding::ManifestCorrelationFailure {
                    object,
                    file: file.to_string(),
                    physical: physical.clone(),
                    reason: err.to_string(),
                });
                FixityCheck::Uncorrelated {
                    physical,
                    reason: err.to_string(),
                }
            }
            Err(err) => {
                tracing::error!(object = %object, file, error = %err, "fixity task failed");
                self.unreadable(object, file, local, err.to_string())
            }
        }
    }

    fn unreadable(
        &self,
        object: String,
        file: &str,
        local: PathBuf,
        reason: String,
    ) -> FixityCheck {
        self.reporter.report(&Finding::RemoteFetchFailure {
            object,
            file: file.to_string(),
            reason: format!("downloaded copy unreadable: {}", reason),
            partial: Some(local),
        });
        FixityCheck::Unreadable { reason }
    }

    fn discard(&self, scratch: &ScratchArea, path: &std::path::Path) {
        if self.options.keep_downloads {
            return;
        }
        if let Err(e) = scratch.discard(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove download");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = AuditOptions::default();
        assert_eq!(options.namespace, "public_ocfl");
        assert_eq!(
            options.catalog_files,
            vec!["ro-crate-metadata.json", "ro-crate-metadata.jsonld"]
        );
        assert!(!options.fixity);
        assert!(!options.keep_downloads);
    }

    #[test]
    fn options_from_config() {
        let config = Config::from_values(crate::core::config::schema::AuditConfig {
            namespace: Some("custom".into()),
            fixity: Some(true),
            ..Default::default()
        })
        .unwrap();

        let options = AuditOptions::from_config(&config);
        assert_eq!(options.namespace, "custom");
        assert!(options.fixity);
    }

    #[test]
    fn bad_filter_is_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("0=ocfl_1.1"), "ocfl_1.1\n").unwrap();
        let repo = Repository::open(temp.path()).unwrap();

        let options = AuditOptions {
            fetch_filter: Some("([".into()),
            ..Default::default()
        };
        assert!(matches!(
            Auditor::new(repo, options),
            Err(RunError::Filter(_))
        ));
    }

    #[test]
    fn summary_counts_integrity() {
        let now = Utc::now();
        let objects = vec![ObjectAudit {
            path: "o".into(),
            identifier: None,
            catalog: None,
            status: ObjectStatus::Audited,
            files: vec![
                FileAudit {
                    file: "a".into(),
                    resolution: ResolutionOutcome::Unresolved,
                    fetch: None,
                    fixity: None,
                },
                FileAudit {
                    file: "b".into(),
                    resolution: ResolutionOutcome::ResolvedAtHead {
                        physical: "v1/content/b".into(),
                    },
                    fetch: Some(FetchOutcome::Fetched {
                        local: "/tmp/b".into(),
                        bytes: 1,
                    }),
                    fixity: Some(FixityCheck::Mismatch {
                        expected: ContentDigest::new("aa").unwrap(),
                        observed: ContentDigest::new("bb").unwrap(),
                    }),
                },
            ],
        }];

        let summary = AuditSummary::tally(now, now, &objects);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.fixity_mismatches, 1);
        assert_eq!(summary.integrity_findings(), 2);
        assert!(!summary.is_clean());
    }

    #[test]
    fn summary_counts_fixity_failures_by_signal() {
        let now = Utc::now();
        let fetched = || {
            Some(FetchOutcome::Fetched {
                local: "/tmp/x".into(),
                bytes: 1,
            })
        };
        let at_head = || ResolutionOutcome::ResolvedAtHead {
            physical: "v1/content/x".into(),
        };
        let objects = vec![ObjectAudit {
            path: "o".into(),
            identifier: None,
            catalog: None,
            status: ObjectStatus::Audited,
            files: vec![
                FileAudit {
                    file: "a".into(),
                    resolution: at_head(),
                    fetch: fetched(),
                    fixity: Some(FixityCheck::Uncorrelated {
                        physical: "v1/content/a".into(),
                        reason: "manifest key is not a digest".into(),
                    }),
                },
                FileAudit {
                    file: "b".into(),
                    resolution: at_head(),
                    fetch: fetched(),
                    fixity: Some(FixityCheck::Unreadable {
                        reason: "gone".into(),
                    }),
                },
            ],
        }];

        let summary = AuditSummary::tally(now, now, &objects);
        assert_eq!(summary.correlation_failures, 1);
        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.integrity_findings(), 1);
        assert!(!summary.is_clean());
    }
}
