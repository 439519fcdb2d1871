//! # Heron Registry
//!
//! The resource registry maps protocol type names and runtime kinds to
//! [`RegistryEntry`] values: descriptor, resource repository, relationship
//! repositories keyed by target kind, and an optional parent entry.
//!
//! The registry is built once with [`ResourceRegistry::builder`] and is
//! read-only afterwards, so it is shared across requests behind an `Arc`
//! without locking.
//!
//! Registration-time checks:
//!
//! - the kind hierarchy (declared parents and subtypes) must be acyclic;
//! - protocol type names must be unique;
//! - a registration may bind at most one relationship repository per target kind.
//!
//! Lookups by runtime kind fall back through declared parents, so a resource
//! of an unregistered subtype resolves to its nearest registered ancestor.

#![doc(html_root_url = "https://docs.rs/heron-registry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod entry;
mod registry;

pub use entry::{RegistryEntry, RelationshipBinding};
pub use registry::{ResourceRegistration, ResourceRegistry, ResourceRegistryBuilder};
