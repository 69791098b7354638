//! remote::http
//!
//! HTTP fetcher using reqwest.
//!
//! # Design
//!
//! A fetch is a plain `GET {base}/{identifier}/{path}`. The body is consumed
//! as a byte stream and written chunk by chunk, so memory use does not grow
//! with file size. Progress is reported against the `Content-Length` header
//! when the endpoint sends one.
//!
//! If a local write fails, the function returns immediately and the
//! response stream is dropped with it, which closes the connection instead
//! of draining the rest of the body.
//!
//! # Example
//!
//! ```ignore
//! use ocfl_audit::remote::{http::HttpFetcher, Fetcher, FetchRequest, NoProgress};
//!
//! let fetcher = HttpFetcher::new("https://oni.example.org/ocfl")?;
//! let fetched = fetcher
//!     .fetch(&FetchRequest::new("obj-42", "data.csv"), dest, &NoProgress)
//!     .await?;
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use super::traits::{FetchError, FetchProgress, FetchRequest, FetchedFile, Fetcher, ProgressObserver};

/// User-Agent header value for requests.
const USER_AGENT_VALUE: &str = concat!("ocfl-audit/", env!("CARGO_PKG_VERSION"));

/// Fetcher for an HTTP(S) access endpoint.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client for making requests
    client: Client,
    /// Endpoint base URL
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher with no request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, None)
    }

    /// Create a fetcher with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        Self::with_options(base_url, timeout, None)
    }

    /// Create a fetcher with an optional timeout and User-Agent override.
    ///
    /// Without an override the User-Agent is `ocfl-audit/<version>`.
    pub fn with_options(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
        user_agent: Option<&str>,
    ) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(user_agent.unwrap_or(USER_AGENT_VALUE));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// The endpoint base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn write_error(dest: &Path, err: std::io::Error) -> FetchError {
    FetchError::Write {
        path: dest.to_path_buf(),
        message: err.to_string(),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        dest: &Path,
        progress: &dyn ProgressObserver,
    ) -> Result<FetchedFile, FetchError> {
        let url = request.url(&self.base_url)?;
        tracing::debug!(%url, dest = %dest.display(), "fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let total = response.content_length();
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| write_error(dest, e))?;

        let mut received: u64 = 0;
        progress.on_progress(request, FetchProgress { received, total });

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    file.flush().await.map_err(|e| write_error(dest, e))?;
                    return Err(match total {
                        Some(expected) if received < expected => {
                            FetchError::Truncated { received, expected }
                        }
                        _ => FetchError::Network(e.to_string()),
                    });
                }
            };
            file.write_all(&chunk)
                .await
                .map_err(|e| write_error(dest, e))?;
            received += chunk.len() as u64;
            progress.on_progress(request, FetchProgress { received, total });
        }

        file.flush().await.map_err(|e| write_error(dest, e))?;
        file.sync_all().await.map_err(|e| write_error(dest, e))?;

        if let Some(expected) = total {
            if received < expected {
                return Err(FetchError::Truncated { received, expected });
            }
        }

        Ok(FetchedFile {
            path: dest.to_path_buf(),
            bytes: received,
        })
    }
}
