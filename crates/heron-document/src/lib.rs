//! # Heron Document
//!
//! Document model and serializer for the Heron document protocol.
//!
//! - [`Document`] - top-level document: `data`, `included`, `meta`, `links`
//! - [`ResourceObject`] - one rendered resource with relationship links and linkage
//! - [`DocumentSerializer`] - renders [`heron_core::Resource`] values using the
//!   registry for type names and link URLs, honoring sparse fieldsets and
//!   lazy relationships

#![doc(html_root_url = "https://docs.rs/heron-document/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod document;
mod serializer;

pub use document::{
    Document, PrimaryData, RelationshipLinks, RelationshipObject, ResourceLinks, ResourceObject,
};
pub use serializer::DocumentSerializer;
