//! catalog::graph
//!
//! Typed projection of an RO-Crate JSON-LD graph.
//!
//! # Design
//!
//! The catalog is a flattened JSON-LD document whose `@graph` array holds
//! one object per entity. Only a handful of properties drive the audit, so
//! each entity is projected onto [`CatalogNode`] and everything else is
//! discarded at parse time:
//!
//! - `@id` and `@type` (string or array)
//! - `name` and `value` (for `PropertyValue` identifiers)
//! - `about` (metadata descriptor to root dataset)
//! - `identifier` (string, reference, inline object, or an array of them)

use serde_json::Value;

use super::CatalogError;

/// Metadata descriptor ids, one per accepted catalog filename form.
const DESCRIPTOR_IDS: &[&str] = &["ro-crate-metadata.json", "ro-crate-metadata.jsonld"];

/// Conventional root dataset id.
const ROOT_ID: &str = "./";

/// An `identifier` property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierRef {
    /// A plain string identifier.
    Literal(String),
    /// A reference to another node (`{"@id": ...}`).
    Reference(String),
    /// An inline `PropertyValue`-like object.
    Inline {
        types: Vec<String>,
        name: Option<String>,
        value: Option<String>,
    },
}

/// One entity in the catalog graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogNode {
    pub id: String,
    pub types: Vec<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub about: Option<String>,
    pub identifiers: Vec<IdentifierRef>,
}

impl CatalogNode {
    /// Whether the node declares the given type.
    pub fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }

    /// Whether the node is a `File` entity.
    pub fn is_file(&self) -> bool {
        self.has_type("File")
    }

    fn from_value(index: usize, value: &Value) -> Result<Self, CatalogError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CatalogError::Malformed(format!("@graph[{}] is not an object", index)))?;

        let id = obj
            .get("@id")
            .and_then(Value::as_str)
            .ok_or_else(|| CatalogError::Malformed(format!("@graph[{}] has no @id", index)))?
            .to_string();

        Ok(Self {
            id,
            types: string_list(obj.get("@type")),
            name: scalar_string(obj.get("name")),
            value: scalar_string(obj.get("value")),
            about: obj.get("about").and_then(reference_id),
            identifiers: identifier_refs(obj.get("identifier")),
        })
    }
}

/// The parsed catalog graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogGraph {
    nodes: Vec<CatalogNode>,
}

impl CatalogGraph {
    /// Parse a JSON-LD document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` if `@graph` is missing or not an
    /// array, or if any entity lacks an `@id`.
    pub fn from_json(document: &Value) -> Result<Self, CatalogError> {
        let graph = document
            .get("@graph")
            .and_then(Value::as_array)
            .ok_or_else(|| CatalogError::Malformed("missing @graph array".to_string()))?;

        let nodes = graph
            .iter()
            .enumerate()
            .map(|(i, v)| CatalogNode::from_value(i, v))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { nodes })
    }

    /// Parse a JSON-LD document from bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let document: Value =
            serde_json::from_slice(bytes).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::from_json(&document)
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> &[CatalogNode] {
        &self.nodes
    }

    /// Look up a node by `@id`.
    pub fn get(&self, id: &str) -> Option<&CatalogNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The root dataset.
    ///
    /// Found through the metadata descriptor's `about`, falling back to the
    /// conventional `./` id.
    pub fn root_dataset(&self) -> Option<&CatalogNode> {
        DESCRIPTOR_IDS
            .iter()
            .filter_map(|id| self.get(id))
            .find_map(|descriptor| descriptor.about.as_deref())
            .and_then(|root| self.get(root))
            .or_else(|| self.get(ROOT_ID))
    }
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.first().and_then(|v| scalar_string(Some(v))),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => obj.get("@id").and_then(Value::as_str).map(str::to_string),
        Value::Array(items) => items.iter().find_map(reference_id),
        _ => None,
    }
}

fn identifier_refs(value: Option<&Value>) -> Vec<IdentifierRef> {
    let items: Vec<&Value> = match value {
        None => return Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(IdentifierRef::Literal(s.clone())),
            Value::Object(obj) => match obj.get("@id").and_then(Value::as_str) {
                Some(id) if obj.len() == 1 => Some(IdentifierRef::Reference(id.to_string())),
                _ => Some(IdentifierRef::Inline {
                    types: string_list(obj.get("@type")),
                    name: scalar_string(obj.get("name")),
                    value: scalar_string(obj.get("value")),
                }),
            },
            _ => None,
        })
        .collect()
}
