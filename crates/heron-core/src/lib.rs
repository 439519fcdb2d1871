//! # Heron Core
//!
//! Core types and traits shared by the Heron crates.
//!
//! - [`Resource`], [`ResourceKind`], [`ResourceId`] - dynamic resource representation
//! - [`ResourceDescriptor`] - static per-type metadata (id, attributes, relationships)
//! - [`ResourceRepository`] / [`RelationshipRepository`] - storage capabilities
//! - [`JsonPath`] / [`RequestBody`] - parsed boundary inputs
//! - [`Response`] - controller result envelope
//! - [`HeronError`] - standard error type

#![doc(html_root_url = "https://docs.rs/heron-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod context;
mod descriptor;
mod error;
mod path;
mod repository;
mod resource;
mod response;

pub use body::{BodyData, DataBody, Linkage, RelationshipBody, RequestBody, ResourceIdentifier};
pub use context::RequestId;
pub use descriptor::{
    AttributeField, Cardinality, IdField, RelationshipField, ResourceDescriptor,
    ResourceDescriptorBuilder,
};
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, HeronError, HeronResult};
pub use path::{JsonPath, PathElement, PathIds};
pub use repository::{
    Links, LinksRepository, Meta, MetaRepository, RelationshipRepository, ResourceList,
    ResourceRepository,
};
pub use resource::{AttributeType, AttributeValue, IdType, RelationValue, Resource, ResourceId, ResourceKind};
pub use response::{Payload, Response};
