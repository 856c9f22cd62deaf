//! Document registry
//!
//! Records documents keyed by a unique id, in a public or a private scope,
//! and pairs every creation or state change with an audit entry written in
//! the same host transaction.
//!
//! # Guarantees
//!
//! - A mutation and its audit entry persist together or not at all
//! - Exactly one audit entry per successful mutation
//! - Audit entries are never rewritten or deleted
//! - No operation deletes a document
//!
//! # Not enforced
//!
//! - Uniqueness on create: a repeated id overwrites
//! - Any transition graph: any state may follow any state
//! - Field validation

mod document;
mod errors;
#[allow(clippy::module_inception)]
mod registry;
mod store;

pub use document::{DocumentKind, PrivateDocument, PublicDocument, StatefulDocument};
pub use errors::{RegistryError, RegistryErrorCode, RegistryResult, Severity};
pub use registry::{
    PrivateRegistry, PublicRegistry, Registry, RegistryOptions, DEFAULT_SCAN_PAGE_SIZE,
};
pub use store::DocumentStore;
