//! # Heron Test
//!
//! Test utilities for Heron: in-memory repositories and a set of fixture
//! resource types with seeded data.
//!
//! - [`InMemoryResourceRepository`] - insertion-ordered storage with
//!   auto-assigned integer ids; records every resource passed to `save`.
//! - [`InMemoryRelationshipRepository`] - stores relations inside the source
//!   repository and records every mutation as a [`RelationCall`].
//! - [`fixtures`] - `tasks`, `projects`, `users`, `documents`, `memoranda`.
//!
//! ## Example
//!
//! ```
//! use heron_test::fixtures::Fixture;
//!
//! let fixture = Fixture::new();
//! let registry = fixture.build_registry("http://localhost:8080").unwrap();
//! assert_eq!(registry.entry_by_type("tasks").unwrap().kind().as_str(), "Task");
//! assert_eq!(fixture.tasks.len(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/heron-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
mod relationship;
mod repository;

pub use relationship::{InMemoryRelationshipRepository, RelationCall, RelationOp};
pub use repository::InMemoryResourceRepository;
