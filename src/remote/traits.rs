//! remote::traits
//!
//! Fetcher trait and request/response types.
//!
//! # Design
//!
//! The `Fetcher` trait is async because fetching involves network I/O.
//! A fetch is a single attempt: no retries happen here, and the caller
//! decides whether to continue with the next file.
//!
//! # Example
//!
//! ```ignore
//! use ocfl_audit::remote::{Fetcher, FetchRequest, NoProgress};
//!
//! async fn download(fetcher: &dyn Fetcher) -> Result<(), FetchError> {
//!     let request = FetchRequest::new("obj-42", "data/a.csv");
//!     let fetched = fetcher.fetch(&request, Path::new("/tmp/a.csv"), &NoProgress).await?;
//!     println!("{} bytes", fetched.bytes);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from remote fetch operations.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request cannot be expressed as an unambiguous URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Network or connection error (including mid-stream failures).
    #[error("network error: {0}")]
    Network(String),

    /// Writing the local file failed.
    #[error("failed to write '{path}': {message}")]
    Write { path: PathBuf, message: String },

    /// The body ended before the declared content length.
    #[error("truncated transfer: received {received} of {expected} bytes")]
    Truncated { received: u64, expected: u64 },
}

impl FetchError {
    /// Whether the local destination may hold a partial file.
    pub fn may_leave_partial(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Write { .. } | FetchError::Truncated { .. }
        )
    }
}

/// A request for one file of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Resolved object identifier
    pub identifier: String,
    /// Logical path within the object
    pub path: String,
}

impl FetchRequest {
    /// Create a request.
    pub fn new(identifier: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.into(),
        }
    }

    /// Build `{base}/{identifier}/{path}`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` for empty parts, `.`/`..`
    /// segments, whitespace, `?` or `#`. No percent-encoding is applied, so
    /// anything that would need it is refused rather than guessed at.
    ///
    /// # Example
    ///
    /// ```
    /// use ocfl_audit::remote::FetchRequest;
    ///
    /// let req = FetchRequest::new("obj-1", "data/a.csv");
    /// assert_eq!(
    ///     req.url("https://oni.example.org/ocfl/").unwrap(),
    ///     "https://oni.example.org/ocfl/obj-1/data/a.csv"
    /// );
    /// assert!(FetchRequest::new("obj-1", "../secret").url("https://x").is_err());
    /// ```
    pub fn url(&self, base: &str) -> Result<String, FetchError> {
        let base = base.trim_end_matches('/');
        if base.is_empty() {
            return Err(FetchError::InvalidRequest("empty endpoint".to_string()));
        }
        check_part("identifier", &self.identifier)?;
        check_part("path", &self.path)?;

        Ok(format!("{}/{}/{}", base, self.identifier, self.path))
    }
}

fn check_part(what: &str, value: &str) -> Result<(), FetchError> {
    if value.is_empty() {
        return Err(FetchError::InvalidRequest(format!("empty {}", what)));
    }
    if value.starts_with('/') {
        return Err(FetchError::InvalidRequest(format!(
            "{} '{}' must not start with '/'",
            what, value
        )));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
        return Err(FetchError::InvalidRequest(format!(
            "{} '{}' is not path-safe",
            what, value
        )));
    }
    if value.split('/').any(|seg| seg == ".." || seg == "." || seg.is_empty()) {
        return Err(FetchError::InvalidRequest(format!(
            "{} '{}' has an empty or relative segment",
            what, value
        )));
    }
    Ok(())
}

/// Cumulative transfer progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    /// Bytes written so far
    pub received: u64,
    /// Declared content length, if the endpoint sent one
    pub total: Option<u64>,
}

impl FetchProgress {
    /// Completion percentage, when the total is known.
    pub fn percent(&self) -> Option<u8> {
        match self.total {
            Some(0) => Some(100),
            Some(total) => Some(((self.received.min(total) * 100) / total) as u8),
            None => None,
        }
    }
}

/// Receives progress updates during a transfer.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, request: &FetchRequest, progress: FetchProgress);

    /// The transfer for `request` ended, successfully or not.
    fn on_finished(&self, _request: &FetchRequest) {}
}

/// Observer that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _request: &FetchRequest, _progress: FetchProgress) {}
}

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    /// Local file holding the bytes
    pub path: PathBuf,
    /// Bytes written
    pub bytes: u64,
}

/// Streams remote files to local storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so that one fetcher can serve
/// concurrent downloads.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one file to `dest`.
    ///
    /// Success is returned only after the local file has been flushed.
    /// On failure, whatever was written so far stays at `dest`.
    async fn fetch(
        &self,
        request: &FetchRequest,
        dest: &Path,
        progress: &dyn ProgressObserver,
    ) -> Result<FetchedFile, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_with_single_slashes() {
        let req = FetchRequest::new("obj", "a/b.txt");
        assert_eq!(req.url("http://h/base").unwrap(), "http://h/base/obj/a/b.txt");
        assert_eq!(req.url("http://h/base//").unwrap(), "http://h/base/obj/a/b.txt");
    }

    #[test]
    fn url_rejects_unsafe_parts() {
        let base = "http://h";
        assert!(FetchRequest::new("", "a").url(base).is_err());
        assert!(FetchRequest::new("obj", "").url(base).is_err());
        assert!(FetchRequest::new("obj", "/abs").url(base).is_err());
        assert!(FetchRequest::new("obj", "a b").url(base).is_err());
        assert!(FetchRequest::new("obj", "a?x=1").url(base).is_err());
        assert!(FetchRequest::new("obj", "a#frag").url(base).is_err());
        assert!(FetchRequest::new("obj", "a//b").url(base).is_err());
        assert!(FetchRequest::new("obj", "a/./b").url(base).is_err());
        assert!(FetchRequest::new("..", "a").url(base).is_err());
        assert!(FetchRequest::new("obj", "a").url("").is_err());
    }

    #[test]
    fn percent_handles_edges() {
        let p = FetchProgress {
            received: 50,
            total: Some(200),
        };
        assert_eq!(p.percent(), Some(25));
        assert_eq!(
            FetchProgress {
                received: 0,
                total: Some(0)
            }
            .percent(),
            Some(100)
        );
        assert_eq!(
            FetchProgress {
                received: 10,
                total: None
            }
            .percent(),
            None
        );
    }

    #[test]
    fn partial_classification() {
        assert!(FetchError::Network("reset".into()).may_leave_partial());
        assert!(FetchError::Truncated {
            received: 1,
            expected: 2
        }
        .may_leave_partial());
        assert!(!FetchError::Status {
            status: 404,
            url: "u".into()
        }
        .may_leave_partial());
        assert!(!FetchError::InvalidRequest("x".into()).may_leave_partial());
    }
}
