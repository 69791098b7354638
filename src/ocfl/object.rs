//! ocfl::object
//!
//! A single versioned object in the store.
//!
//! # Layout
//!
//! ```text
//! <object root>/
//! ├── 0=ocfl_object_1.1      # object declaration
//! ├── inventory.json         # inventory as of head
//! ├── v1/content/...
//! └── v2/content/...
//! ```
//!
//! Physical paths in the manifest are relative to the object root.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::inventory::{Inventory, InventoryError};

/// Inventory filename at the object root.
pub const INVENTORY_FILE: &str = "inventory.json";

/// Prefix of the object declaration file.
pub const OBJECT_DECLARATION_PREFIX: &str = "0=ocfl_object_";

/// Errors from object access.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// The inventory file could not be read.
    #[error("failed to read inventory '{path}': {source}")]
    InventoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The inventory could not be parsed or failed validation.
    #[error("inventory '{path}': {source}")]
    Inventory {
        path: PathBuf,
        source: InventoryError,
    },

    /// The logical path is not part of the head version.
    #[error("'{logical}' is not present in head version {head}")]
    NotInHead { logical: String, head: String },

    /// The head state references a digest with no manifest entry.
    #[error("digest '{0}' has no manifest entry")]
    MissingManifestEntry(String),
}

/// A versioned object located in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcflObject {
    /// Absolute object root
    root: PathBuf,
    /// Path relative to the repository root, `/`-separated
    path: String,
}

impl OcflObject {
    /// Create an object handle.
    ///
    /// `path` is the object's location relative to the repository root.
    pub fn new(root: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            path: path.into(),
        }
    }

    /// Absolute object root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the repository root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read and validate the object's inventory.
    pub fn inventory(&self) -> Result<Inventory, ObjectError> {
        let path = self.root.join(INVENTORY_FILE);
        let bytes = fs::read(&path).map_err(|e| ObjectError::InventoryRead {
            path: path.clone(),
            source: e,
        })?;

        let inventory = Inventory::from_slice(&bytes).map_err(|e| ObjectError::Inventory {
            path: path.clone(),
            source: e,
        })?;

        inventory
            .validate()
            .map_err(|e| ObjectError::Inventory { path, source: e })?;

        Ok(inventory)
    }

    /// Absolute path of a manifest (physical) path.
    pub fn physical_path(&self, physical: &str) -> PathBuf {
        self.root.join(physical)
    }

    /// Resolve a logical path as of head to a file on disk.
    ///
    /// # Errors
    ///
    /// Returns `ObjectError::NotInHead` if the head state does not contain
    /// the logical path.
    pub fn head_file_path(
        &self,
        inventory: &Inventory,
        logical: &str,
    ) -> Result<PathBuf, ObjectError> {
        let digest = inventory
            .find_in_head(logical)
            .ok_or_else(|| ObjectError::NotInHead {
                logical: logical.to_string(),
                head: inventory.head.to_string(),
            })?;

        let physical = inventory
            .physical_for_hash(digest)
            .ok_or_else(|| ObjectError::MissingManifestEntry(digest.to_string()))?;

        Ok(self.physical_path(physical))
    }
}

/// Check whether a directory carries an object declaration.
pub fn is_object_root(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    entries.flatten().any(|entry| {
        entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(OBJECT_DECLARATION_PREFIX))
            .unwrap_or(false)
            && entry.file_type().map(|t| t.is_file()).unwrap_or(false)
    })
}
