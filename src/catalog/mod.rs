//! catalog
//!
//! RO-Crate metadata catalog access.
//!
//! # Modules
//!
//! - [`graph`] - Typed projection of the JSON-LD `@graph`
//! - [`index`] - Identifier lookup and File entity extraction
//!
//! # Example
//!
//! ```
//! use ocfl_audit::catalog::{resolve_identifier, CatalogGraph};
//!
//! let graph = CatalogGraph::from_json(&serde_json::json!({
//!     "@graph": [
//!         { "@id": "./", "@type": "Dataset" },
//!         { "@id": "data.csv", "@type": "File" }
//!     ]
//! })).unwrap();
//!
//! let ident = resolve_identifier(&graph, "public_ocfl", "ab/cd/obj");
//! assert!(ident.is_fallback());
//! assert_eq!(graph.file_entities()[0].id, "data.csv");
//! ```

pub mod graph;
pub mod index;

pub use graph::{CatalogGraph, CatalogNode, IdentifierRef};
pub use index::{resolve_identifier, FileEntity, IdentifierSource, ObjectIdentifier};

use thiserror::Error;

/// Errors from catalog parsing.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// The document is JSON but not a usable JSON-LD graph.
    #[error("malformed catalog: {0}")]
    Malformed(String),
}
