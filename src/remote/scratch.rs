//! remote::scratch
//!
//! Dedicated download area.
//!
//! Every download gets its own file named `<uuid>-<basename>`, so
//! concurrent fetches never share a destination, even for the same
//! logical path of different objects.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A directory downloads are written into.
#[derive(Debug, Clone)]
pub struct ScratchArea {
    dir: PathBuf,
}

impl ScratchArea {
    /// Create the area, making the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The scratch directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A fresh destination path for a logical file.
    pub fn allocate(&self, logical: &str) -> PathBuf {
        let base = logical
            .rsplit('/')
            .find(|s| !s.is_empty())
            .map(sanitize)
            .unwrap_or_else(|| "download".to_string());

        self.dir.join(format!("{}-{}", Uuid::new_v4(), base))
    }

    /// Remove a file previously allocated here.
    ///
    /// Paths outside the scratch directory are left alone.
    pub fn discard(&self, path: &Path) -> io::Result<()> {
        if path.parent() != Some(self.dir.as_path()) {
            return Ok(());
        }
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
