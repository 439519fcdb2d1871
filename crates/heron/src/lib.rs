//! # Heron
//!
//! Resource dispatch and document assembly for JSON:API-style services.
//!
//! Heron maps a parsed request (method, path, query parameters and an
//! optional body) onto user-supplied resource and relationship repositories,
//! then assembles the JSON:API response document, including compound
//! documents built from `include` paths and default inclusions.
//!
//! ## Crates
//!
//! - [`core`]: resources, descriptors, repositories, paths and errors
//! - [`query`]: query string parsing into typed parameters
//! - [`registry`]: the resource registry and subtype resolution
//! - [`document`]: response document serialization
//! - [`dispatch`]: controllers, include resolution and the dispatcher
//! - [`config`]: layered configuration
//! - [`telemetry`]: structured logging setup
//!
//! ## Example
//!
//! ```rust,ignore
//! use heron::prelude::*;
//!
//! let heron = Heron::builder()
//!     .config(ConfigLoader::new().with_optional_file("heron.toml")?.with_env_prefix("HERON").load()?)
//!     .register(ResourceRegistration::new(task_descriptor, tasks).relationship("Project", task_project))
//!     .register(ResourceRegistration::new(project_descriptor, projects))
//!     .build()?;
//! heron.init_logging()?;
//!
//! let response = heron.handle("GET", "/tasks/1", "include[Task]=project", None).await;
//! ```

#![doc(html_root_url = "https://docs.rs/heron/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;

pub use app::{Heron, HeronBuilder, HeronResponse};

pub use heron_config as config;
pub use heron_core as core;
pub use heron_dispatch as dispatch;
pub use heron_document as document;
pub use heron_query as query;
pub use heron_registry as registry;
pub use heron_telemetry as telemetry;

/// Commonly used types.
pub mod prelude {
    pub use crate::{Heron, HeronBuilder, HeronResponse};
    pub use heron_config::{ConfigLoader, HeronConfig};
    pub use heron_core::{
        AttributeType, AttributeValue, Cardinality, HeronError, HeronResult, IdType, Links, Meta,
        RelationValue, RelationshipField, RelationshipRepository, Resource, ResourceDescriptor,
        ResourceId, ResourceKind, ResourceList, ResourceRepository,
    };
    pub use heron_dispatch::{Controller, RequestDispatcher};
    pub use heron_query::QueryParams;
    pub use heron_registry::{ResourceRegistration, ResourceRegistry};
    pub use http::{Method, StatusCode};
}
