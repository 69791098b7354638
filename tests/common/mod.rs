//! Shared fixtures: on-disk OCFL storage roots with RO-Crate catalogs.
//!
//! Objects are written the way an OCFL client would: each version records
//! its full state, and content is stored once, under the first version
//! that introduced it.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use sha2::{Digest, Sha512};
use tempfile::TempDir;

pub const CATALOG: &str = "ro-crate-metadata.json";
pub const NAMESPACE: &str = "public_ocfl";

/// SHA-512 of `bytes` as lowercase hex.
pub fn sha512_hex(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}

/// A temporary OCFL storage root.
pub struct StorageRoot {
    dir: TempDir,
}

impl StorageRoot {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0=ocfl_1.1"), "ocfl_1.1\n").unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Start an object at a repository-relative path.
    pub fn object(&self, path: &str) -> ObjectBuilder {
        ObjectBuilder {
            root: self.dir.path().join(path),
            versions: Vec::new(),
        }
    }
}

/// Builds one object version by version.
pub struct ObjectBuilder {
    root: PathBuf,
    versions: Vec<Vec<(String, Vec<u8>)>>,
}

impl ObjectBuilder {
    /// Add a version holding exactly these logical files.
    pub fn version(mut self, files: &[(&str, &[u8])]) -> Self {
        self.versions.push(
            files
                .iter()
                .map(|(p, b)| (p.to_string(), b.to_vec()))
                .collect(),
        );
        self
    }

    /// Write declaration, content and inventory. Returns the object root.
    pub fn write(self) -> PathBuf {
        fs::create_dir_all(&self.root).unwrap();
        fs::write(self.root.join("0=ocfl_object_1.1"), "ocfl_object_1.1\n").unwrap();

        let mut manifest: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut versions = serde_json::Map::new();

        for (i, files) in self.versions.iter().enumerate() {
            let label = format!("v{}", i + 1);
            let mut state: BTreeMap<String, Vec<String>> = BTreeMap::new();

            for (logical, bytes) in files {
                let digest = sha512_hex(bytes);
                if !manifest.contains_key(&digest) {
                    let physical = format!("{}/content/{}", label, logical);
                    let full = self.root.join(&physical);
                    fs::create_dir_all(full.parent().unwrap()).unwrap();
                    fs::write(&full, bytes).unwrap();
                    manifest.insert(digest.clone(), vec![physical]);
                }
                state.entry(digest).or_default().push(logical.clone());
            }

            versions.insert(
                label,
                json!({
                    "created": "2024-01-01T00:00:00Z",
                    "message": "fixture",
                    "state": state
                }),
            );
        }

        let inventory = json!({
            "id": format!("urn:fixture:{}", self.root.display()),
            "type": "https://ocfl.io/1.1/spec/#inventory",
            "digestAlgorithm": "sha512",
            "head": format!("v{}", self.versions.len()),
            "contentDirectory": "content",
            "manifest": manifest,
            "versions": versions
        });
        fs::write(
            self.root.join("inventory.json"),
            serde_json::to_vec_pretty(&inventory).unwrap(),
        )
        .unwrap();

        self.root
    }
}

/// An RO-Crate catalog listing `files`, optionally with a namespaced
/// identifier.
pub fn ro_crate(identifier: Option<&str>, files: &[&str]) -> Vec<u8> {
    let mut root = json!({
        "@id": "./",
        "@type": "Dataset",
        "hasPart": files.iter().map(|f| json!({ "@id": f })).collect::<Vec<_>>()
    });

    let mut graph: Vec<Value> = vec![json!({
        "@id": CATALOG,
        "@type": "CreativeWork",
        "about": { "@id": "./" }
    })];

    if let Some(id) = identifier {
        root["identifier"] = json!([{ "@id": "#ident" }]);
        graph.push(json!({
            "@id": "#ident",
            "@type": "PropertyValue",
            "name": NAMESPACE,
            "value": id
        }));
    }
    graph.insert(1, root);

    for file in files {
        graph.push(json!({ "@id": file, "@type": "File" }));
    }

    serde_json::to_vec(&json!({
        "@context": "https://w3id.org/ro/crate/1.1/context",
        "@graph": graph
    }))
    .unwrap()
}
