//! Controller response envelope.

use crate::{Linkage, Links, Meta, Resource};
use http::StatusCode;

/// What a controller produced as primary data.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No document body.
    Empty,
    /// A single resource, or `null`.
    Resource(Option<Resource>),
    /// A collection of resources.
    Collection(Vec<Resource>),
    /// Relationship linkage, or `null`.
    Linkage(Option<Linkage>),
}

impl Payload {
    /// Returns the primary resources, if the payload carries resources.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        match self {
            Self::Resource(Some(resource)) => std::slice::from_ref(resource),
            Self::Collection(resources) => resources,
            Self::Empty | Self::Resource(None) | Self::Linkage(_) => &[],
        }
    }
}

/// Typed result of a controller.
///
/// # Example
///
/// ```rust
/// use heron_core::{Payload, Resource, Response};
/// use http::StatusCode;
///
/// let response = Response::new(StatusCode::CREATED, Payload::Resource(Some(Resource::new("Task"))));
/// assert_eq!(response.status, StatusCode::CREATED);
/// assert_eq!(response.payload.resources().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status to report.
    pub status: StatusCode,
    /// Primary data.
    pub payload: Payload,
    /// Top-level meta.
    pub meta: Option<Meta>,
    /// Top-level links.
    pub links: Option<Links>,
}

impl Response {
    /// Creates a response without meta or links.
    #[must_use]
    pub fn new(status: StatusCode, payload: Payload) -> Self {
        Self {
            status,
            payload,
            meta: None,
            links: None,
        }
    }

    /// Creates a `204 No Content` response.
    #[must_use]
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, Payload::Empty)
    }

    /// Sets top-level meta.
    #[must_use]
    pub fn with_meta(mut self, meta: Option<Meta>) -> Self {
        self.meta = meta;
        self
    }

    /// Sets top-level links.
    #[must_use]
    pub fn with_links(mut self, links: Option<Links>) -> Self {
        self.links = links;
        self
    }
}
