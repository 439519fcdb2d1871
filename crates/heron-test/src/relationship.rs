//! In-memory relationship repository.

use crate::InMemoryResourceRepository;
use async_trait::async_trait;
use heron_core::{
    HeronError, HeronResult, RelationValue, RelationshipRepository, Resource, ResourceId,
    ResourceList,
};
use heron_query::QueryParams;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Relationship mutation recorded by [`InMemoryRelationshipRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOp {
    /// `set_relation`
    Set,
    /// `set_relations`
    SetMany,
    /// `add_relations`
    Add,
    /// `remove_relations`
    Remove,
}

/// One recorded relationship mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationCall {
    /// Operation invoked.
    pub op: RelationOp,
    /// Id of the source resource.
    pub source_id: Option<ResourceId>,
    /// Target ids as received; empty for a cleared to-one relation.
    pub target_ids: Vec<ResourceId>,
    /// Relationship field name.
    pub field: String,
}

/// Relationship repository that stores relations inside the source
/// repository's resources.
///
/// Targets are copied from the target repository when a relation is set, and
/// re-read from it on every find, so related resources are always current.
#[derive(Debug)]
pub struct InMemoryRelationshipRepository {
    source: Arc<InMemoryResourceRepository>,
    target: Arc<InMemoryResourceRepository>,
    calls: Mutex<Vec<RelationCall>>,
}

impl InMemoryRelationshipRepository {
    /// Creates a repository linking `source` resources to `target` resources.
    #[must_use]
    pub fn new(
        source: Arc<InMemoryResourceRepository>,
        target: Arc<InMemoryResourceRepository>,
    ) -> Self {
        Self {
            source,
            target,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns every recorded mutation, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RelationCall> {
        self.calls.lock().clone()
    }

    /// Returns the most recent mutation.
    #[must_use]
    pub fn last_call(&self) -> Option<RelationCall> {
        self.calls.lock().last().cloned()
    }

    fn record(&self, op: RelationOp, source: &Resource, target_ids: &[ResourceId], field: &str) {
        debug!(
            ?op,
            resource_kind = %source.kind(),
            resource_id = ?source.id(),
            field,
            targets = target_ids.len(),
            "Relationship mutation"
        );
        self.calls.lock().push(RelationCall {
            op,
            source_id: source.id().cloned(),
            target_ids: target_ids.to_vec(),
            field: field.to_string(),
        });
    }

    fn load_target(&self, id: &ResourceId) -> HeronResult<Resource> {
        self.target
            .get(id)
            .ok_or_else(|| HeronError::not_found_resource(self.target.kind().as_str(), id.to_string()))
    }

    fn load_targets(&self, ids: &[ResourceId]) -> HeronResult<Vec<Resource>> {
        ids.iter().map(|id| self.load_target(id)).collect()
    }

    /// Applies `update` to the stored copy of `source`.
    fn update_source(&self, source: &Resource, update: impl FnOnce(&mut Resource)) -> HeronResult<()> {
        let id = source.id().ok_or_else(|| {
            HeronError::internal(format!("{} resource has no id", source.kind()))
        })?;
        let mut stored = self.source.get(id).unwrap_or_else(|| source.clone());
        update(&mut stored);
        self.source.put(stored);
        Ok(())
    }

    fn stored_target_ids(&self, source_id: &ResourceId, field: &str) -> Vec<ResourceId> {
        self.source
            .get(source_id)
            .map(|source| source.relation_ids(field))
            .unwrap_or_default()
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryRelationshipRepository {
    async fn set_relation(
        &self,
        source: &Resource,
        target_id: Option<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        let ids: Vec<_> = target_id.into_iter().collect();
        self.record(RelationOp::Set, source, &ids, field);
        let target = ids.first().map(|id| self.load_target(id)).transpose()?;
        self.update_source(source, |stored| match target {
            Some(target) => stored.set_relation(field, RelationValue::One(Box::new(target))),
            None => {
                stored.clear_relation(field);
            }
        })
    }

    async fn set_relations(
        &self,
        source: &Resource,
        target_ids: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        self.record(RelationOp::SetMany, source, &target_ids, field);
        let targets = self.load_targets(&target_ids)?;
        self.update_source(source, |stored| {
            stored.set_relation(field, RelationValue::Many(targets));
        })
    }

    async fn add_relations(
        &self,
        source: &Resource,
        target_ids: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        self.record(RelationOp::Add, source, &target_ids, field);
        let targets = self.load_targets(&target_ids)?;
        self.update_source(source, |stored| {
            let mut current = match stored.clear_relation(field) {
                Some(RelationValue::Many(items)) => items,
                Some(RelationValue::One(item)) => vec![*item],
                None => Vec::new(),
            };
            current.extend(targets);
            stored.set_relation(field, RelationValue::Many(current));
        })
    }

    async fn remove_relations(
        &self,
        source: &Resource,
        target_ids: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        self.record(RelationOp::Remove, source, &target_ids, field);
        self.update_source(source, |stored| {
            if let Some(RelationValue::Many(items)) = stored.relation_mut(field) {
                items.retain(|item| item.id().map_or(true, |id| !target_ids.contains(id)));
            }
        })
    }

    async fn find_one_target(
        &self,
        source_id: &ResourceId,
        field: &str,
        _params: &QueryParams,
    ) -> HeronResult<Option<Resource>> {
        Ok(self
            .stored_target_ids(source_id, field)
            .first()
            .and_then(|id| self.target.get(id)))
    }

    async fn find_many_targets(
        &self,
        source_id: &ResourceId,
        field: &str,
        _params: &QueryParams,
    ) -> HeronResult<ResourceList> {
        let ids = self.stored_target_ids(source_id, field);
        Ok(ResourceList::new(
            ids.iter().filter_map(|id| self.target.get(id)).collect(),
        ))
    }
}
