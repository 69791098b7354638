//! ocfl::inventory
//!
//! Typed model of an OCFL object inventory.
//!
//! # Structure
//!
//! An inventory records the full version history of one object:
//!
//! - `head` names the current version
//! - `versions` maps each version label to its state, a mapping from
//!   content digest to the logical paths that digest had in that version
//! - `manifest` maps each content digest to the physical paths (relative to
//!   the object root) holding those bytes, across all versions
//!
//! # Invariants
//!
//! After [`Inventory::validate`] succeeds:
//! - `head` is a key of `versions`
//! - every digest in every version state is a key of `manifest`
//! - the digest algorithm is supported
//!
//! A logical path may appear under different digests in different versions
//! (content changed) or vanish from later versions (file removed).
//!
//! # Example
//!
//! ```
//! use ocfl_audit::ocfl::Inventory;
//!
//! let digest = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
//! let inventory: Inventory = serde_json::from_value(serde_json::json!({
//!     "id": "urn:example:1",
//!     "type": "https://ocfl.io/1.1/spec/#inventory",
//!     "digestAlgorithm": "sha256",
//!     "head": "v1",
//!     "manifest": { digest: ["v1/content/data.csv"] },
//!     "versions": { "v1": { "state": { digest: ["data.csv"] } } }
//! })).unwrap();
//!
//! inventory.validate().unwrap();
//! assert_eq!(inventory.find_in_head("data.csv"), Some(digest));
//! assert_eq!(inventory.physical_for_hash(digest), Some("v1/content/data.csv"));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{DigestAlgorithm, TypeError, VersionLabel};

/// Mapping from content digest to paths.
pub type DigestMap = BTreeMap<String, Vec<String>>;

/// Errors from inventory parsing and validation.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The document is not a well-formed inventory.
    #[error("failed to parse inventory: {0}")]
    Parse(String),

    /// The inventory violates a structural invariant.
    #[error("invalid inventory: {0}")]
    Invalid(String),

    /// The inventory uses a digest algorithm we cannot verify.
    #[error(transparent)]
    Algorithm(#[from] TypeError),
}

/// The author of a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One version of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// When the version was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<FixedOffset>>,

    /// Commit-style message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Who created the version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<VersionUser>,

    /// Digest to logical paths for this version
    pub state: DigestMap,
}

impl Version {
    /// Find the digest whose logical-path set contains `logical`.
    pub fn digest_for(&self, logical: &str) -> Option<&str> {
        self.state
            .iter()
            .find(|(_, paths)| paths.iter().any(|p| p == logical))
            .map(|(digest, _)| digest.as_str())
    }
}

/// An OCFL object inventory.
///
/// Unknown fields are tolerated so that extension data does not make an
/// otherwise valid object unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    /// Object identifier
    pub id: String,

    /// Inventory type URI
    #[serde(rename = "type")]
    pub inventory_type: String,

    /// Digest algorithm for manifest keys
    pub digest_algorithm: String,

    /// Current version
    pub head: VersionLabel,

    /// Content directory name (defaults to `content`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_directory: Option<String>,

    /// Digest to physical paths, across all versions
    pub manifest: DigestMap,

    /// Version history, ordered by version number
    pub versions: BTreeMap<VersionLabel, Version>,

    /// Optional extra fixity blocks, keyed by algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixity: Option<BTreeMap<String, DigestMap>>,
}

impl Inventory {
    /// Parse an inventory from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InventoryError> {
        serde_json::from_slice(bytes).map_err(|e| InventoryError::Parse(e.to_string()))
    }

    /// Check the structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Invalid` if head is missing from the version
    /// history, a manifest key is not a digest of the declared algorithm, a
    /// manifest entry lists no paths, or a state digest has no manifest
    /// entry. Returns `InventoryError::Algorithm` for an unsupported digest
    /// algorithm.
    pub fn validate(&self) -> Result<(), InventoryError> {
        let algorithm = self.algorithm()?;

        if !self.versions.contains_key(&self.head) {
            return Err(InventoryError::Invalid(format!(
                "head version '{}' not present in versions",
                self.head
            )));
        }

        for (digest, paths) in &self.manifest {
            if digest.len() != algorithm.hex_len()
                || !digest.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(InventoryError::Invalid(format!(
                    "manifest key '{}' is not a {} digest",
                    digest, algorithm
                )));
            }
            if paths.is_empty() {
                return Err(InventoryError::Invalid(format!(
                    "manifest entry '{}' lists no content paths",
                    digest
                )));
            }
        }

        for (label, version) in &self.versions {
            for digest in version.state.keys() {
                if !self.manifest.contains_key(digest) {
                    return Err(InventoryError::Invalid(format!(
                        "digest '{}' in version '{}' has no manifest entry",
                        digest, label
                    )));
                }
            }
        }

        Ok(())
    }

    /// The digest algorithm used for manifest keys.
    pub fn algorithm(&self) -> Result<DigestAlgorithm, InventoryError> {
        Ok(self.digest_algorithm.parse::<DigestAlgorithm>()?)
    }

    /// The head version.
    ///
    /// Returns `None` only for inventories that failed validation.
    pub fn head_version(&self) -> Option<&Version> {
        self.versions.get(&self.head)
    }

    /// The head version state.
    pub fn head_state(&self) -> Option<&DigestMap> {
        self.head_version().map(|v| &v.state)
    }

    /// Find the digest of a logical path as of head.
    pub fn find_in_head(&self, logical: &str) -> Option<&str> {
        self.head_version().and_then(|v| v.digest_for(logical))
    }

    /// Find the digest of a logical path in a given version.
    pub fn find_in_version(&self, version: &VersionLabel, logical: &str) -> Option<&str> {
        self.versions.get(version).and_then(|v| v.digest_for(logical))
    }

    /// First physical path recorded for a digest.
    pub fn physical_for_hash(&self, digest: &str) -> Option<&str> {
        self.manifest
            .get(digest)
            .and_then(|paths| paths.first())
            .map(|p| p.as_str())
    }

    /// Digest whose manifest entry contains a physical path.
    pub fn hash_for_physical(&self, physical: &str) -> Option<&str> {
        self.manifest
            .iter()
            .find(|(_, paths)| paths.iter().any(|p| p == physical))
            .map(|(digest, _)| digest.as_str())
    }
}
