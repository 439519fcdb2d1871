//! In-memory resource repository.

use async_trait::async_trait;
use heron_core::{
    HeronResult, Links, LinksRepository, Meta, MetaRepository, Resource, ResourceId, ResourceKind,
    ResourceList, ResourceRepository,
};
use heron_query::QueryParams;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// Resource repository backed by an insertion-ordered map.
///
/// Resources saved without an id receive the next integer id. Every resource
/// passed to [`ResourceRepository::save`] is recorded, as received, so tests
/// can assert on what the repository saw.
///
/// # Example
///
/// ```
/// use heron_core::Resource;
/// use heron_test::InMemoryResourceRepository;
///
/// let repository = InMemoryResourceRepository::new("Task");
/// let task = repository.insert(Resource::new("Task").with_attribute("name", "x"));
/// assert_eq!(task.id().unwrap().to_string(), "1");
/// assert_eq!(repository.len(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryResourceRepository {
    kind: ResourceKind,
    resources: RwLock<IndexMap<ResourceId, Resource>>,
    next_id: AtomicI64,
    saved: Mutex<Vec<Resource>>,
    meta: Option<Meta>,
    links: Option<Links>,
}

impl InMemoryResourceRepository {
    /// Creates an empty repository for `kind`.
    #[must_use]
    pub fn new(kind: impl Into<ResourceKind>) -> Self {
        Self {
            kind: kind.into(),
            resources: RwLock::new(IndexMap::new()),
            next_id: AtomicI64::new(1),
            saved: Mutex::new(Vec::new()),
            meta: None,
            links: None,
        }
    }

    /// Enables the meta capability, returning `meta` for every response.
    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Enables the links capability, returning `links` for every response.
    #[must_use]
    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    /// Returns the kind stored by this repository.
    #[must_use]
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Stores a resource directly, assigning an id if it has none.
    pub fn insert(&self, mut resource: Resource) -> Resource {
        let id = match resource.id() {
            Some(id) => {
                if let ResourceId::Integer(value) = id {
                    self.next_id.fetch_max(*value + 1, Ordering::SeqCst);
                }
                id.clone()
            }
            None => {
                let id = ResourceId::Integer(self.next_id.fetch_add(1, Ordering::SeqCst));
                resource.set_id(id.clone());
                id
            }
        };
        self.resources.write().insert(id, resource.clone());
        resource
    }

    /// Returns a stored resource.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<Resource> {
        self.resources.read().get(id).cloned()
    }

    /// Replaces a stored resource.
    pub(crate) fn put(&self, resource: Resource) {
        if let Some(id) = resource.id().cloned() {
            self.resources.write().insert(id, resource);
        }
    }

    /// Returns the number of stored resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.read().len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.read().is_empty()
    }

    /// Returns every resource received by `save`, oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<Resource> {
        self.saved.lock().clone()
    }

    /// Returns the last resource received by `save`.
    #[must_use]
    pub fn last_saved(&self) -> Option<Resource> {
        self.saved.lock().last().cloned()
    }
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn find_one(&self, id: &ResourceId, _params: &QueryParams) -> HeronResult<Option<Resource>> {
        Ok(self.get(id))
    }

    async fn find_all(&self, _params: &QueryParams) -> HeronResult<ResourceList> {
        Ok(ResourceList::new(
            self.resources.read().values().cloned().collect(),
        ))
    }

    async fn find_all_by_ids(
        &self,
        ids: &[ResourceId],
        _params: &QueryParams,
    ) -> HeronResult<ResourceList> {
        let resources = self.resources.read();
        Ok(ResourceList::new(
            ids.iter().filter_map(|id| resources.get(id).cloned()).collect(),
        ))
    }

    async fn save(&self, resource: Resource) -> HeronResult<Resource> {
        self.saved.lock().push(resource.clone());
        let saved = self.insert(resource);
        debug!(resource_kind = %self.kind, resource_id = ?saved.id(), "Saved resource");
        Ok(saved)
    }

    async fn delete(&self, id: &ResourceId) -> HeronResult<()> {
        self.resources.write().shift_remove(id);
        Ok(())
    }

    fn meta_capability(&self) -> Option<&dyn MetaRepository> {
        self.meta.as_ref().map(|_| self as &dyn MetaRepository)
    }

    fn links_capability(&self) -> Option<&dyn LinksRepository> {
        self.links.as_ref().map(|_| self as &dyn LinksRepository)
    }
}

impl MetaRepository for InMemoryResourceRepository {
    fn meta(
        &self,
        _root: Option<&ResourceId>,
        _resources: &[Resource],
        _params: &QueryParams,
    ) -> Option<Meta> {
        self.meta.clone()
    }
}

impl LinksRepository for InMemoryResourceRepository {
    fn links(&self, _resources: &[Resource], _params: &QueryParams) -> Option<Links> {
        self.links.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_assigns_ids() {
        let repository = InMemoryResourceRepository::new("Task");
        repository.insert(Resource::new("Task").with_id(7));

        let saved = repository.save(Resource::new("Task")).await.unwrap();
        assert_eq!(saved.id(), Some(&ResourceId::Integer(8)));
        assert_eq!(repository.saved().len(), 1);
        assert!(repository.last_saved().unwrap().id().is_none());
    }

    #[tokio::test]
    async fn test_find_all_by_ids_skips_missing() {
        let repository = InMemoryResourceRepository::new("Task");
        repository.insert(Resource::new("Task").with_id(1));
        repository.insert(Resource::new("Task").with_id(2));

        let found = repository
            .find_all_by_ids(&[2.into(), 9.into(), 1.into()], &QueryParams::new())
            .await
            .unwrap();
        let ids: Vec<_> = found.items.iter().filter_map(Resource::id).cloned().collect();
        assert_eq!(ids, vec![ResourceId::Integer(2), ResourceId::Integer(1)]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repository = InMemoryResourceRepository::new("Task");
        repository.insert(Resource::new("Task").with_id(1));
        repository.delete(&1.into()).await.unwrap();
        assert!(repository.is_empty());
    }

    #[test]
    fn test_capabilities_opt_in() {
        let plain = InMemoryResourceRepository::new("Task");
        assert!(plain.meta_capability().is_none());
        assert!(plain.links_capability().is_none());

        let with_meta = InMemoryResourceRepository::new("Task")
            .with_meta(Meta::new().with("total", 0))
            .with_links(Links::new().with("self", "http://localhost/tasks"));
        let meta = with_meta
            .meta_capability()
            .and_then(|m| m.meta(None, &[], &QueryParams::new()));
        assert_eq!(meta.unwrap().get("total"), Some(&0.into()));
        assert!(with_meta.links_capability().is_some());
    }
}
