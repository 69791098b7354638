//! ocfl::repository
//!
//! Storage root discovery and object enumeration.
//!
//! # Layout
//!
//! A storage root carries a declaration file (`0=ocfl_1.0` or `0=ocfl_1.1`).
//! Objects may sit at any depth below it; a storage layout such as pairtree
//! nests them under intermediate directories. A directory is an object root
//! when it carries an object declaration, and enumeration never descends
//! into an object.
//!
//! A directory below the root that cannot be read is recorded in the
//! listing and the walk moves on; only an unreadable root stops it.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use super::object::{is_object_root, OcflObject};

/// Prefix of the storage root declaration file.
pub const ROOT_DECLARATION_PREFIX: &str = "0=ocfl_1.";

/// Errors opening or walking a repository.
///
/// These are the only errors that abort an audit run.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository root '{0}' does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("'{0}' is not an OCFL storage root (no 0=ocfl_1.x declaration)")]
    NotAStorageRoot(PathBuf),

    #[error("failed to read repository root '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk repository: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A path below the root that enumeration could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadablePath {
    /// Repository-relative path
    pub path: String,
    pub reason: String,
}

/// Result of walking a storage root.
#[derive(Debug, Default)]
pub struct ObjectListing {
    /// Object roots, sorted by path
    pub objects: Vec<OcflObject>,
    /// Directories the walk could not enter
    pub unreadable: Vec<UnreadablePath>,
}

/// An opened, read-only OCFL storage root.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Open a storage root.
    ///
    /// # Errors
    ///
    /// Fails if the path is not a directory or has no storage root
    /// declaration.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(RepositoryError::NotADirectory(root));
        }

        let entries = fs::read_dir(&root).map_err(|e| RepositoryError::Io {
            path: root.clone(),
            source: e,
        })?;

        let declared = entries.flatten().any(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(ROOT_DECLARATION_PREFIX))
                .unwrap_or(false)
        });

        if !declared {
            return Err(RepositoryError::NotAStorageRoot(root));
        }

        Ok(Self { root })
    }

    /// The storage root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate every object in the repository, sorted by path.
    ///
    /// # Errors
    ///
    /// Fails only when the storage root itself cannot be read. Unreadable
    /// directories further down are returned in
    /// [`ObjectListing::unreadable`].
    pub fn objects(&self) -> Result<ObjectListing, RepositoryError> {
        let mut listing = ObjectListing::default();
        let mut walker = WalkDir::new(&self.root).sort_by_file_name().into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| relative_path(&self.root, p))
                        .unwrap_or_default();
                    tracing::warn!(path = %path, error = %err, "skipping unreadable path");
                    listing.unreadable.push(UnreadablePath {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }

            if is_object_root(entry.path()) {
                listing.objects.push(OcflObject::new(
                    entry.path(),
                    relative_path(&self.root, entry.path()),
                ));
                walker.skip_current_dir();
            }
        }

        tracing::debug!(
            root = %self.root.display(),
            count = listing.objects.len(),
            unreadable = listing.unreadable.len(),
            "enumerated objects"
        );

        Ok(listing)
    }

    /// Look up one object by its repository-relative path.
    pub fn object(&self, path: &str) -> Option<OcflObject> {
        let root = self.root.join(path);
        is_object_root(&root).then(|| OcflObject::new(root, path.trim_matches('/')))
    }
}

/// Repository-relative path with `/` separators on every platform.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("0=ocfl_1.1"), "ocfl_1.1\n").unwrap();
        temp
    }

    fn declare_object(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("0=ocfl_object_1.1"), "ocfl_object_1.1\n").unwrap();
    }

    #[test]
    fn open_requires_directory() {
        let temp = TempDir::new().unwrap();
        let result = Repository::open(temp.path().join("missing"));
        assert!(matches!(result, Err(RepositoryError::NotADirectory(_))));
    }

    #[test]
    fn open_requires_declaration() {
        let temp = TempDir::new().unwrap();
        let result = Repository::open(temp.path());
        assert!(matches!(result, Err(RepositoryError::NotAStorageRoot(_))));
    }

    #[test]
    fn enumerates_nested_objects_sorted() {
        let temp = storage_root();
        declare_object(&temp.path().join("b/obj2"));
        declare_object(&temp.path().join("a/x/obj1"));
        declare_object(&temp.path().join("c"));
        fs::create_dir_all(temp.path().join("empty/dir")).unwrap();

        let repo = Repository::open(temp.path()).unwrap();
        let paths: Vec<String> = repo
            .objects()
            .unwrap()
            .objects
            .iter()
            .map(|o| o.path().to_string())
            .collect();

        assert_eq!(paths, vec!["a/x/obj1", "b/obj2", "c"]);
    }

    #[test]
    fn does_not_descend_into_objects() {
        let temp = storage_root();
        let outer = temp.path().join("outer");
        declare_object(&outer);
        // A declaration inside an object's content is data, not an object.
        declare_object(&outer.join("v1/content/inner"));

        let repo = Repository::open(temp.path()).unwrap();
        let objects = repo.objects().unwrap().objects;
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].path(), "outer");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_does_not_stop_the_walk() {
        use std::os::unix::fs::PermissionsExt;

        let temp = storage_root();
        declare_object(&temp.path().join("a"));
        let locked = temp.path().join("b");
        fs::create_dir_all(locked.join("obj")).unwrap();
        declare_object(&temp.path().join("c"));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not bind the superuser.
        let enforced = fs::read_dir(&locked).is_err();

        let repo = Repository::open(temp.path()).unwrap();
        let listing = repo.objects();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if !enforced {
            return;
        }

        let listing = listing.unwrap();
        let paths: Vec<&str> = listing.objects.iter().map(|o| o.path()).collect();
        assert_eq!(paths, vec!["a", "c"]);
        assert_eq!(listing.unreadable.len(), 1);
        assert_eq!(listing.unreadable[0].path, "b");
    }

    #[test]
    fn lookup_single_object() {
        let temp = storage_root();
        declare_object(&temp.path().join("ab/cd"));

        let repo = Repository::open(temp.path()).unwrap();
        assert!(repo.object("ab/cd").is_some());
        assert!(repo.object("ab").is_none());
    }
}
