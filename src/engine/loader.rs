//! engine::loader
//!
//! Builds a [`CatalogRecord`] for each object in a repository.
//!
//! # Catalog selection
//!
//! The catalog is whichever accepted filename appears first, in priority
//! order, in the head state of the object. Its digest is resolved through
//! the manifest to a physical file, which is parsed as JSON-LD. Catalogs
//! that exist only in superseded versions are ignored.
//!
//! Objects that cannot be loaded are returned in [`LoadedRecords::skipped`]
//! with the reason; they never stop the remaining objects from loading.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{CatalogError, CatalogGraph};
use crate::ocfl::{Inventory, ObjectError, OcflObject, Repository, RepositoryError, UnreadablePath};

/// Errors loading a single object.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Inventory could not be read or is invalid.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// No accepted catalog filename in the head state.
    #[error("no catalog in head state (accepted: {})", accepted.join(", "))]
    CatalogNotFound { accepted: Vec<String> },

    /// The catalog file exists in the inventory but could not be read.
    #[error("failed to read catalog '{path}': {source}")]
    CatalogUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The catalog file is not a usable JSON-LD graph.
    #[error("catalog '{catalog}' is unparsable: {source}")]
    CatalogUnparsable {
        catalog: String,
        source: CatalogError,
    },
}

/// An object with its inventory and parsed catalog.
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    /// Repository-relative object path
    pub path: String,
    /// Parsed catalog graph
    pub graph: CatalogGraph,
    /// Logical name of the catalog that was used
    pub catalog_file: String,
    /// Object handle
    pub object: OcflObject,
    /// Validated inventory
    pub inventory: Inventory,
}

/// An object that produced no record.
#[derive(Debug)]
pub struct SkippedObject {
    pub path: String,
    pub error: LoadError,
}

/// Result of loading a whole repository.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<CatalogRecord>,
    pub skipped: Vec<SkippedObject>,
    /// Directories the repository walk could not enter
    pub unreadable: Vec<UnreadablePath>,
}

/// Load one object's record.
///
/// # Errors
///
/// See [`LoadError`]. Nothing here writes to the store.
pub fn load_record(object: &OcflObject, catalogs: &[String]) -> Result<CatalogRecord, LoadError> {
    let inventory = object.inventory()?;

    let catalog_file = catalogs
        .iter()
        .find(|name| inventory.find_in_head(name).is_some())
        .ok_or_else(|| LoadError::CatalogNotFound {
            accepted: catalogs.to_vec(),
        })?
        .clone();

    let path = object.head_file_path(&inventory, &catalog_file)?;
    let bytes = fs::read(&path).map_err(|e| LoadError::CatalogUnreadable {
        path: path.clone(),
        source: e,
    })?;

    let graph = CatalogGraph::from_slice(&bytes).map_err(|e| LoadError::CatalogUnparsable {
        catalog: catalog_file.clone(),
        source: e,
    })?;

    tracing::debug!(
        object = object.path(),
        catalog = %catalog_file,
        nodes = graph.nodes().len(),
        "catalog loaded"
    );

    Ok(CatalogRecord {
        path: object.path().to_string(),
        graph,
        catalog_file,
        object: object.clone(),
        inventory,
    })
}

/// Load records for every object in a repository.
///
/// # Errors
///
/// Only a failure to enumerate the repository is an error; per-object
/// failures are collected in `skipped`.
pub fn load_records(repo: &Repository, catalogs: &[String]) -> Result<LoadedRecords, RepositoryError> {
    let listing = repo.objects()?;
    let mut loaded = LoadedRecords {
        unreadable: listing.unreadable,
        ..Default::default()
    };

    for object in listing.objects {
        match load_record(&object, catalogs) {
            Ok(record) => loaded.records.push(record),
            Err(error) => loaded.skipped.push(SkippedObject {
                path: object.path().to_string(),
                error,
            }),
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn catalogs() -> Vec<String> {
        crate::core::config::DEFAULT_CATALOG_FILES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn write_object(root: &Path, files: &[(&str, &str, &[u8])]) -> OcflObject {
        fs::create_dir_all(root).unwrap();
        fs::write(root.join("0=ocfl_object_1.1"), "ocfl_object_1.1\n").unwrap();

        let mut manifest = serde_json::Map::new();
        let mut state = serde_json::Map::new();
        for (tag, logical, bytes) in files {
            let digest = tag.repeat(64);
            let physical = format!("v1/content/{}", logical);
            let full = root.join(&physical);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, bytes).unwrap();
            manifest.insert(digest.to_string(), json!([physical]));
            state.insert(digest.to_string(), json!([logical]));
        }

        let inventory = json!({
            "id": "urn:test",
            "type": "https://ocfl.io/1.1/spec/#inventory",
            "digestAlgorithm": "sha512",
            "head": "v1",
            "manifest": manifest,
            "versions": { "v1": { "state": state } }
        });
        fs::write(root.join("inventory.json"), inventory.to_string()).unwrap();
        OcflObject::new(root, "obj")
    }

    #[test]
    fn loads_catalog_from_head() {
        let temp = TempDir::new().unwrap();
        let crate_doc = json!({ "@graph": [{ "@id": "./", "@type": "Dataset" }] }).to_string();
        let object = write_object(
            temp.path(),
            &[("aa", "ro-crate-metadata.json", crate_doc.as_bytes())],
        );

        let record = load_record(&object, &catalogs()).unwrap();
        assert_eq!(record.catalog_file, "ro-crate-metadata.json");
        assert_eq!(record.path, "obj");
        assert!(record.graph.root_dataset().is_some());
    }

    #[test]
    fn priority_order_wins() {
        let temp = TempDir::new().unwrap();
        let first = json!({ "@graph": [{ "@id": "first" }] }).to_string();
        let second = json!({ "@graph": [{ "@id": "second" }] }).to_string();
        let object = write_object(
            temp.path(),
            &[
                ("aa", "ro-crate-metadata.jsonld", second.as_bytes()),
                ("bb", "ro-crate-metadata.json", first.as_bytes()),
            ],
        );

        let record = load_record(&object, &catalogs()).unwrap();
        assert_eq!(record.catalog_file, "ro-crate-metadata.json");
        assert!(record.graph.get("first").is_some());
    }

    #[test]
    fn missing_catalog_is_reported() {
        let temp = TempDir::new().unwrap();
        let object = write_object(temp.path(), &[("aa", "data.csv", b"1,2")]);

        let err = load_record(&object, &catalogs()).unwrap_err();
        match err {
            LoadError::CatalogNotFound { accepted } => assert_eq!(accepted, catalogs()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparsable_catalog_is_reported() {
        let temp = TempDir::new().unwrap();
        let object = write_object(temp.path(), &[("aa", "ro-crate-metadata.json", b"{not json")]);

        let err = load_record(&object, &catalogs()).unwrap_err();
        assert!(matches!(err, LoadError::CatalogUnparsable { .. }));
    }

    #[test]
    fn missing_catalog_bytes_are_unreadable() {
        let temp = TempDir::new().unwrap();
        let object = write_object(temp.path(), &[("aa", "ro-crate-metadata.json", b"{}")]);
        fs::remove_file(temp.path().join("v1/content/ro-crate-metadata.json")).unwrap();

        let err = load_record(&object, &catalogs()).unwrap_err();
        assert!(matches!(err, LoadError::CatalogUnreadable { .. }));
    }

    #[test]
    fn load_records_collects_skipped_objects() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("0=ocfl_1.1"), "ocfl_1.1\n").unwrap();
        let crate_doc = json!({ "@graph": [{ "@id": "./", "@type": "Dataset" }] }).to_string();
        write_object(
            &temp.path().join("a"),
            &[("aa", "ro-crate-metadata.json", crate_doc.as_bytes())],
        );
        write_object(&temp.path().join("b"), &[("bb", "data.csv", b"1,2")]);

        let repo = Repository::open(temp.path()).unwrap();
        let loaded = load_records(&repo, &catalogs()).unwrap();

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].path, "a");
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].path, "b");
        assert!(matches!(loaded.skipped[0].error, LoadError::CatalogNotFound { .. }));
        assert!(loaded.unreadable.is_empty());
    }
}
