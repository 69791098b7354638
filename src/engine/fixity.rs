//! engine::fixity
//!
//! Compares fetched bytes against the digest recorded in the manifest.
//!
//! The expected digest is the manifest key whose path list contains the
//! resolved physical path; manifest keys are content digests already, so
//! nothing is recomputed on the store side. The observed digest is computed
//! by streaming the local file through the inventory's algorithm.
//!
//! A physical path with no manifest entry is a separate outcome
//! ([`FixityResult::ManifestEntryNotFound`]), not a mismatch.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::core::types::{ContentDigest, DigestAlgorithm, TypeError};
use crate::ocfl::{Inventory, InventoryError};

/// Read size for hashing.
const CHUNK_SIZE: usize = 64 * 1024;

/// Errors from fixity validation.
#[derive(Debug, Error)]
pub enum FixityError {
    /// The local file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    /// The inventory's digest algorithm is unusable.
    #[error(transparent)]
    Algorithm(#[from] InventoryError),

    /// The manifest key is not a hex digest.
    #[error("manifest key is not a digest: {0}")]
    ManifestDigest(#[from] TypeError),
}

/// Outcome of a fixity comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FixityResult {
    /// Both digests are known.
    Compared {
        expected: ContentDigest,
        observed: ContentDigest,
    },

    /// No manifest entry lists the physical path.
    ManifestEntryNotFound { physical: String },
}

impl FixityResult {
    /// Whether the digests were compared and are equal.
    pub fn is_match(&self) -> bool {
        matches!(self, FixityResult::Compared { expected, observed } if expected == observed)
    }
}

fn hash_reader<D: Digest>(mut reader: impl Read) -> io::Result<ContentDigest> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentDigest::from_bytes(&hasher.finalize()))
}

/// Digest a file's full contents.
pub fn digest_file(path: &Path, algorithm: DigestAlgorithm) -> Result<ContentDigest, FixityError> {
    let io_err = |source| FixityError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    match algorithm {
        DigestAlgorithm::Sha256 => hash_reader::<Sha256>(file),
        DigestAlgorithm::Sha512 => hash_reader::<Sha512>(file),
    }
    .map_err(io_err)
}

/// Compare an observed digest with the manifest entry for `physical`.
///
/// # Errors
///
/// Returns `FixityError::ManifestDigest` if the correlated manifest key is
/// not a hex string.
pub fn compare(
    inventory: &Inventory,
    physical: &str,
    observed: ContentDigest,
) -> Result<FixityResult, FixityError> {
    let Some(key) = inventory.hash_for_physical(physical) else {
        return Ok(FixityResult::ManifestEntryNotFound {
            physical: physical.to_string(),
        });
    };

    Ok(FixityResult::Compared {
        expected: ContentDigest::new(key)?,
        observed,
    })
}

/// Digest a local file and compare it with the manifest entry for `physical`.
pub fn validate(
    inventory: &Inventory,
    physical: &str,
    local: &Path,
) -> Result<FixityResult, FixityError> {
    let algorithm = inventory.algorithm()?;
    let observed = digest_file(local, algorithm)?;
    compare(inventory, physical, observed)
}
