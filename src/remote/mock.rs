//! remote::mock
//!
//! Mock fetcher for deterministic testing.
//!
//! # Design
//!
//! The mock fetcher serves files from memory, keyed by identifier and
//! logical path, and writes them to the requested destination exactly as a
//! real download would. Failures can be injected per request and every
//! call is recorded for verification.
//!
//! # Example
//!
//! ```
//! use ocfl_audit::remote::mock::MockFetcher;
//! use ocfl_audit::remote::{Fetcher, FetchRequest, NoProgress};
//!
//! # tokio_test::block_on(async {
//! let fetcher = MockFetcher::new();
//! fetcher.insert("obj-1", "a.txt", b"alpha".to_vec());
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let dest = dir.path().join("a.txt");
//! let fetched = fetcher
//!     .fetch(&FetchRequest::new("obj-1", "a.txt"), &dest, &NoProgress)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(fetched.bytes, 5);
//! assert_eq!(std::fs::read(&dest).unwrap(), b"alpha");
//! # });
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{FetchError, FetchProgress, FetchRequest, FetchedFile, Fetcher, ProgressObserver};

/// Mock fetcher for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockFetcherInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockFetcherInner {
    /// Served files by (identifier, path).
    files: HashMap<(String, String), Vec<u8>>,
    /// Injected failures by (identifier, path).
    failures: HashMap<(String, String), FailOn>,
    /// Recorded requests.
    operations: Vec<FetchRequest>,
}

/// Injected failure for a request.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail before writing anything.
    Immediately(FetchError),
    /// Write this many bytes, then fail.
    AfterBytes(usize, FetchError),
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for an identifier and path.
    pub fn insert(&self, identifier: &str, path: &str, bytes: Vec<u8>) {
        self.lock()
            .files
            .insert((identifier.to_string(), path.to_string()), bytes);
    }

    /// Make a request fail.
    pub fn fail_on(&self, identifier: &str, path: &str, failure: FailOn) {
        self.lock()
            .failures
            .insert((identifier.to_string(), path.to_string()), failure);
    }

    /// Requests seen so far, in call order.
    pub fn operations(&self) -> Vec<FetchRequest> {
        self.lock().operations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockFetcherInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        dest: &Path,
        progress: &dyn ProgressObserver,
    ) -> Result<FetchedFile, FetchError> {
        let key = (request.identifier.clone(), request.path.clone());
        let (bytes, failure) = {
            let mut inner = self.lock();
            inner.operations.push(request.clone());
            (inner.files.get(&key).cloned(), inner.failures.get(&key).cloned())
        };

        let write = |data: &[u8]| {
            std::fs::write(dest, data).map_err(|e| FetchError::Write {
                path: dest.to_path_buf(),
                message: e.to_string(),
            })
        };

        match failure {
            Some(FailOn::Immediately(err)) => return Err(err),
            Some(FailOn::AfterBytes(n, err)) => {
                let data = bytes.unwrap_or_default();
                write(&data[..n.min(data.len())])?;
                return Err(err);
            }
            None => {}
        }

        let Some(data) = bytes else {
            return Err(FetchError::Status {
                status: 404,
                url: format!("mock://{}/{}", request.identifier, request.path),
            });
        };

        let total = Some(data.len() as u64);
        progress.on_progress(request, FetchProgress { received: 0, total });
        write(&data)?;
        progress.on_progress(
            request,
            FetchProgress {
                received: data.len() as u64,
                total,
            },
        );

        Ok(FetchedFile {
            path: dest.to_path_buf(),
            bytes: data.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::NoProgress;
    use tempfile::TempDir;

    #[tokio::test]
    async fn unknown_file_is_404() {
        let fetcher = MockFetcher::new();
        let dir = TempDir::new().unwrap();
        let err = fetcher
            .fetch(&FetchRequest::new("o", "p"), &dir.path().join("x"), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn partial_failure_leaves_partial_file() {
        let fetcher = MockFetcher::new();
        fetcher.insert("o", "p", b"0123456789".to_vec());
        fetcher.fail_on(
            "o",
            "p",
            FailOn::AfterBytes(4, FetchError::Network("connection reset".into())),
        );

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("x");
        let err = fetcher
            .fetch(&FetchRequest::new("o", "p"), &dest, &NoProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(std::fs::read(&dest).unwrap(), b"0123");
    }

    #[tokio::test]
    async fn records_operations() {
        let fetcher = MockFetcher::new();
        fetcher.insert("o", "a", vec![1]);
        let dir = TempDir::new().unwrap();

        let _ = fetcher
            .fetch(&FetchRequest::new("o", "a"), &dir.path().join("1"), &NoProgress)
            .await;
        let _ = fetcher
            .fetch(&FetchRequest::new("o", "b"), &dir.path().join("2"), &NoProgress)
            .await;

        let ops = fetcher.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].path, "b");
    }
}
