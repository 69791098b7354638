//! engine::consistency
//!
//! Resolves catalog file references against an object's version history.
//!
//! # Algorithm
//!
//! Resolution is two-phase:
//!
//! 1. Look the logical path up in the head state. A hit is
//!    [`ResolutionOutcome::ResolvedAtHead`] with the manifest's physical path.
//! 2. On a miss, scan every version. Versions whose state names the path are
//!    collected into [`ResolutionOutcome::ResolvedInEarlierVersion`]; this is
//!    drift between catalog and storage. No hits at all is
//!    [`ResolutionOutcome::Unresolved`].
//!
//! The full history is only walked for inconsistent files. Not finding a
//! file is an expected outcome, so [`resolve`] returns a value, never an
//! error.
//!
//! # Example
//!
//! ```
//! use ocfl_audit::engine::consistency::{resolve, ResolutionOutcome};
//! use ocfl_audit::ocfl::Inventory;
//!
//! let inventory: Inventory = serde_json::from_value(serde_json::json!({
//!     "id": "o",
//!     "type": "https://ocfl.io/1.1/spec/#inventory",
//!     "digestAlgorithm": "sha512",
//!     "head": "v2",
//!     "manifest": { "h1": ["v1/content/data.csv"] },
//!     "versions": {
//!         "v1": { "state": { "h1": ["data.csv"] } },
//!         "v2": { "state": { "h1": ["data.csv"] } }
//!     }
//! })).unwrap();
//!
//! assert_eq!(
//!     resolve(&inventory, "data.csv"),
//!     ResolutionOutcome::ResolvedAtHead { physical: "v1/content/data.csv".to_string() }
//! );
//! assert_eq!(resolve(&inventory, "other.csv"), ResolutionOutcome::Unresolved);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use super::loader::CatalogRecord;
use crate::catalog::FileEntity;
use crate::core::types::VersionLabel;
use crate::ocfl::Inventory;

/// Where a logical path was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Present in the head state.
    ResolvedAtHead { physical: String },

    /// Absent from head, present in these versions.
    ResolvedInEarlierVersion {
        versions: BTreeMap<VersionLabel, String>,
    },

    /// Absent from every version.
    Unresolved,
}

impl ResolutionOutcome {
    /// Physical path at head, if resolved there.
    pub fn head_physical(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::ResolvedAtHead { physical } => Some(physical),
            _ => None,
        }
    }

    /// Whether the catalog and the head state agree on this file.
    pub fn is_consistent(&self) -> bool {
        matches!(self, ResolutionOutcome::ResolvedAtHead { .. })
    }
}

/// Resolve a logical path against an inventory.
pub fn resolve(inventory: &Inventory, logical: &str) -> ResolutionOutcome {
    if let Some(physical) = inventory
        .find_in_head(logical)
        .and_then(|digest| inventory.physical_for_hash(digest))
    {
        return ResolutionOutcome::ResolvedAtHead {
            physical: physical.to_string(),
        };
    }

    let versions: BTreeMap<VersionLabel, String> = inventory
        .versions
        .keys()
        .filter_map(|label| {
            let digest = inventory.find_in_version(label, logical)?;
            let physical = inventory.physical_for_hash(digest)?;
            Some((label.clone(), physical.to_string()))
        })
        .collect();

    if versions.is_empty() {
        ResolutionOutcome::Unresolved
    } else {
        ResolutionOutcome::ResolvedInEarlierVersion { versions }
    }
}

/// A file entity with its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCheck {
    pub file: FileEntity,
    pub outcome: ResolutionOutcome,
}

/// Resolve every File entity in a record's catalog, in catalog order.
pub fn check_record(record: &CatalogRecord) -> Vec<FileCheck> {
    record
        .graph
        .file_entities()
        .into_iter()
        .map(|file| {
            let outcome = resolve(&record.inventory, &file.id);
            FileCheck { file, outcome }
        })
        .collect()
}
