//! ocfl
//!
//! Read-only access to an OCFL object store.
//!
//! # Modules
//!
//! - [`inventory`] - Typed inventory model (head, versions, manifest)
//! - [`object`] - A single versioned object and its inventory
//! - [`repository`] - Storage root discovery and object enumeration
//!
//! # Invariants
//!
//! Nothing in this module writes to the store. The auditor reports
//! inconsistencies; it never repairs them.

pub mod inventory;
pub mod object;
pub mod repository;

pub use inventory::{DigestMap, Inventory, InventoryError, Version};
pub use object::{ObjectError, OcflObject};
pub use repository::{ObjectListing, Repository, RepositoryError, UnreadablePath};
