//! remote
//!
//! Streaming retrieval of archived files from a remote access endpoint.
//!
//! # Architecture
//!
//! The `Fetcher` trait defines the interface; the audit engine holds an
//! `Arc<dyn Fetcher>` and never names a concrete implementation.
//!
//! - Remote fetches run only for files that resolved at head locally
//! - A failed fetch never aborts the audit; it is reported and skipped
//! - Downloads land in a [`ScratchArea`], never in the store
//!
//! # Modules
//!
//! - `traits`: `Fetcher` trait and request/response types
//! - [`http`]: HTTP implementation using reqwest
//! - [`mock`]: Mock implementation for deterministic testing
//! - [`scratch`]: Collision-free download destinations

pub mod http;
pub mod mock;
pub mod scratch;
mod traits;

pub use http::HttpFetcher;
pub use scratch::ScratchArea;
pub use traits::*;
