//! catalog::index
//!
//! Extracts what the audit needs from a catalog graph: the object's
//! namespaced identifier and its File entities.
//!
//! # Identifier fallback
//!
//! A catalog without an identifier in the requested namespace is not an
//! error. The caller supplies a fallback (the object's store path) and the
//! returned [`ObjectIdentifier`] records which source was used, so reports
//! keyed by the store path are never mistaken for catalog identifiers.

use serde::Serialize;

use super::graph::{CatalogGraph, IdentifierRef};

/// Type of a namespaced identifier node.
const PROPERTY_VALUE: &str = "PropertyValue";

/// A logical file reference extracted from a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntity {
    /// `@id`, interpreted as a path relative to the object
    pub id: String,
    /// Declared `@type` values
    pub types: Vec<String>,
}

/// Where an object identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierSource {
    /// Found in the catalog under the requested namespace.
    Catalog,
    /// Substituted by the caller.
    Fallback,
}

/// The identifier used for an object downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectIdentifier {
    pub value: String,
    pub source: IdentifierSource,
}

impl ObjectIdentifier {
    /// Whether the fallback was substituted.
    pub fn is_fallback(&self) -> bool {
        self.source == IdentifierSource::Fallback
    }
}

impl CatalogGraph {
    /// Value of the root dataset's identifier in `namespace`.
    ///
    /// Looks at the root dataset's `identifier` values for a
    /// `PropertyValue` (referenced or inline) whose `name` is `namespace`.
    pub fn named_identifier(&self, namespace: &str) -> Option<String> {
        let root = self.root_dataset()?;

        root.identifiers.iter().find_map(|ident| match ident {
            IdentifierRef::Reference(id) => self
                .get(id)
                .filter(|node| node.has_type(PROPERTY_VALUE))
                .filter(|node| node.name.as_deref() == Some(namespace))
                .and_then(|node| node.value.clone()),
            IdentifierRef::Inline { types, name, value } => {
                let typed = types.is_empty() || types.iter().any(|t| t == PROPERTY_VALUE);
                (typed && name.as_deref() == Some(namespace))
                    .then(|| value.clone())
                    .flatten()
            }
            IdentifierRef::Literal(_) => None,
        })
    }

    /// Every `File` entity, in document order.
    pub fn file_entities(&self) -> Vec<FileEntity> {
        self.nodes()
            .iter()
            .filter(|node| node.is_file())
            .map(|node| FileEntity {
                id: node.id.clone(),
                types: node.types.clone(),
            })
            .collect()
    }
}

/// Resolve the identifier for an object, substituting `fallback` if the
/// namespace has no match.
pub fn resolve_identifier(graph: &CatalogGraph, namespace: &str, fallback: &str) -> ObjectIdentifier {
    match graph.named_identifier(namespace) {
        Some(value) => ObjectIdentifier {
            value,
            source: IdentifierSource::Catalog,
        },
        None => ObjectIdentifier {
            value: fallback.to_string(),
            source: IdentifierSource::Fallback,
        },
    }
}
