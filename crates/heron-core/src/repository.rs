//! Repository capabilities.
//!
//! Storage is plugged in through two async traits:
//!
//! - [`ResourceRepository`] finds, saves and deletes resources of one type.
//! - [`RelationshipRepository`] reads and mutates one relationship between
//!   a source type and a target type.
//!
//! A resource repository may additionally contribute top-level `meta` and
//! `links` by exposing [`MetaRepository`] / [`LinksRepository`] through
//! [`ResourceRepository::meta_capability`] and
//! [`ResourceRepository::links_capability`].

use crate::{HeronResult, Resource, ResourceId};
use async_trait::async_trait;
use heron_query::QueryParams;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Free-form document `meta` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta(serde_json::Map<String, serde_json::Value>);

impl Meta {
    /// Creates an empty meta object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns one entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Returns `true` when there is no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Document `links` object: link name to URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(IndexMap<String, String>);

impl Links {
    /// Creates an empty links object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, href: impl Into<String>) -> Self {
        self.0.insert(name.into(), href.into());
        self
    }

    /// Returns one link.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns `true` when there is no link.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Items returned by a collection find, with optional list-level meta.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceList {
    /// The resources.
    pub items: Vec<Resource>,
    /// Meta describing the list (totals, cursors).
    pub meta: Option<Meta>,
}

impl ResourceList {
    /// Creates a list without meta.
    #[must_use]
    pub fn new(items: Vec<Resource>) -> Self {
        Self { items, meta: None }
    }

    /// Attaches list meta.
    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl From<Vec<Resource>> for ResourceList {
    fn from(items: Vec<Resource>) -> Self {
        Self::new(items)
    }
}

/// Storage of one resource type.
#[async_trait]
pub trait ResourceRepository: Send + Sync + 'static {
    /// Finds one resource by id; `Ok(None)` when it does not exist.
    async fn find_one(&self, id: &ResourceId, params: &QueryParams) -> HeronResult<Option<Resource>>;

    /// Finds all resources matching the query parameters.
    async fn find_all(&self, params: &QueryParams) -> HeronResult<ResourceList>;

    /// Finds the resources with the given ids; missing ids are skipped.
    async fn find_all_by_ids(
        &self,
        ids: &[ResourceId],
        params: &QueryParams,
    ) -> HeronResult<ResourceList>;

    /// Persists a resource, assigning an id when it has none.
    async fn save(&self, resource: Resource) -> HeronResult<Resource>;

    /// Deletes a resource.
    async fn delete(&self, id: &ResourceId) -> HeronResult<()>;

    /// Returns the meta capability, if implemented.
    fn meta_capability(&self) -> Option<&dyn MetaRepository> {
        None
    }

    /// Returns the links capability, if implemented.
    fn links_capability(&self) -> Option<&dyn LinksRepository> {
        None
    }
}

/// Storage of one relationship between a source type and a target type.
///
/// `field` names the relationship field on the source resource.
#[async_trait]
pub trait RelationshipRepository: Send + Sync + 'static {
    /// Sets a to-one relation; `None` clears it.
    async fn set_relation(
        &self,
        source: &Resource,
        target_id: Option<ResourceId>,
        field: &str,
    ) -> HeronResult<()>;

    /// Replaces a to-many relation; an empty list clears it.
    async fn set_relations(
        &self,
        source: &Resource,
        target_ids: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()>;

    /// Appends targets to a to-many relation.
    async fn add_relations(
        &self,
        source: &Resource,
        target_ids: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()>;

    /// Removes targets from a to-many relation.
    async fn remove_relations(
        &self,
        source: &Resource,
        target_ids: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()>;

    /// Finds the target of a to-one relation.
    async fn find_one_target(
        &self,
        source_id: &ResourceId,
        field: &str,
        params: &QueryParams,
    ) -> HeronResult<Option<Resource>>;

    /// Finds the targets of a to-many relation.
    async fn find_many_targets(
        &self,
        source_id: &ResourceId,
        field: &str,
        params: &QueryParams,
    ) -> HeronResult<ResourceList>;
}

/// Optional capability contributing document `meta`.
pub trait MetaRepository: Send + Sync {
    /// Returns meta for a response.
    ///
    /// `root` is the id addressed by the request, if any; `resources` is the
    /// primary data.
    fn meta(
        &self,
        root: Option<&ResourceId>,
        resources: &[Resource],
        params: &QueryParams,
    ) -> Option<Meta>;
}

/// Optional capability contributing document `links`.
pub trait LinksRepository: Send + Sync {
    /// Returns top-level links for a response.
    fn links(&self, resources: &[Resource], params: &QueryParams) -> Option<Links>;
}
