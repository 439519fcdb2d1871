//! Inclusion resolution.
//!
//! Collects the resources that go into a document's `included` array from
//! two sources:
//!
//! - **Default inclusion**: every relationship flagged `include_by_default`,
//!   followed recursively until `max_depth` is reached.
//! - **Explicit inclusion**: `include[Type]=a.b` paths, walked segment by
//!   segment from each primary resource. A missing relation flagged
//!   `lookup_if_null` is fetched through its relationship repository first.
//!
//! Resolution is best-effort. A path that names an unknown field, hits a
//! `null`, or fails in a repository contributes nothing and is logged.

use futures_util::future::{join_all, BoxFuture, FutureExt};
use heron_core::{
    Cardinality, HeronResult, RelationValue, RelationshipField, Resource, ResourceIdentifier,
};
use heron_query::{IncludedRelationsParams, QueryParams};
use heron_registry::{RegistryEntry, ResourceRegistry};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default recursion cap for default inclusion.
pub const DEFAULT_MAX_DEPTH: usize = 42;

/// Resolves included resources for a response.
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    registry: Arc<ResourceRegistry>,
    max_depth: usize,
}

impl IncludeResolver {
    /// Creates a resolver with the given default-inclusion depth cap.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>, max_depth: usize) -> Self {
        Self {
            registry,
            max_depth,
        }
    }

    /// Returns the default-inclusion depth cap.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Loads on-demand relations of `resources`, then returns every
    /// included resource, deduplicated by `{type, id}` in discovery order.
    ///
    /// Relations fetched on demand are attached to `resources`, so the
    /// serializer renders their linkage.
    pub async fn resolve(&self, resources: &mut [Resource], params: &QueryParams) -> Vec<Resource> {
        join_all(
            resources
                .iter_mut()
                .map(|resource| self.load_inclusions(resource, params)),
        )
        .await;

        let mut included = IndexMap::new();
        for resource in resources.iter() {
            self.collect_defaults(resource, 0, &mut included);
            if let Some(inclusions) = self.inclusions(resource, params) {
                for inclusion in inclusions.iter() {
                    self.collect_path(resource, inclusion.path_list(), &mut included);
                }
            }
        }
        included.into_values().collect()
    }

    fn inclusions<'p>(
        &self,
        resource: &Resource,
        params: &'p QueryParams,
    ) -> Option<&'p IncludedRelationsParams> {
        let entry = self.registry.find_for_kind(resource.kind())?;
        params
            .included_relations()
            .get_any(&entry.descriptor().scopes())
    }

    async fn load_inclusions(&self, resource: &mut Resource, params: &QueryParams) {
        let Some(inclusions) = self.inclusions(resource, params) else {
            return;
        };
        for inclusion in inclusions.iter() {
            self.load_path(resource, inclusion.path_list(), params).await;
        }
    }

    fn load_path<'a>(
        &'a self,
        resource: &'a mut Resource,
        segments: &'a [String],
        params: &'a QueryParams,
    ) -> BoxFuture<'a, ()> {
        async move {
            let Some((name, rest)) = segments.split_first() else {
                return;
            };
            let Some(entry) = self.registry.find_for_kind(resource.kind()) else {
                return;
            };
            let Some(field) = entry.descriptor().relationship(name) else {
                debug!(resource_type = entry.type_name(), field = %name, "Unknown inclusion field");
                return;
            };

            if resource.relation(name).is_none() && field.lookup_if_null {
                match self.lookup(entry, field, resource, params).await {
                    Ok(Some(value)) => resource.set_relation(name.clone(), value),
                    Ok(None) => return,
                    Err(err) => {
                        warn!(
                            resource_type = entry.type_name(),
                            field = %name,
                            error = %err,
                            "Inclusion lookup failed"
                        );
                        return;
                    }
                }
            }

            if rest.is_empty() {
                return;
            }
            if let Some(value) = resource.relation_mut(name) {
                for target in value.iter_mut() {
                    self.load_path(target, rest, params).await;
                }
            }
        }
        .boxed()
    }

    async fn lookup(
        &self,
        entry: &RegistryEntry,
        field: &RelationshipField,
        resource: &Resource,
        params: &QueryParams,
    ) -> HeronResult<Option<RelationValue>> {
        let Some(id) = resource.id() else {
            return Ok(None);
        };
        let repository = self
            .registry
            .relationship_repository_for(entry, &field.target)?;
        Ok(match field.cardinality {
            Cardinality::ToOne => repository
                .find_one_target(id, &field.name, params)
                .await?
                .map(|target| RelationValue::One(Box::new(target))),
            Cardinality::ToMany => Some(RelationValue::Many(
                repository.find_many_targets(id, &field.name, params).await?.items,
            )),
        })
    }

    fn collect_defaults(
        &self,
        resource: &Resource,
        depth: usize,
        included: &mut IndexMap<ResourceIdentifier, Resource>,
    ) {
        if depth >= self.max_depth {
            return;
        }
        let Some(entry) = self.registry.find_for_kind(resource.kind()) else {
            return;
        };
        let defaults = entry
            .descriptor()
            .relationships()
            .iter()
            .filter(|field| field.include_by_default);
        for field in defaults {
            let Some(value) = resource.relation(&field.name) else {
                continue;
            };
            for target in value.iter() {
                self.insert(target, included);
                self.collect_defaults(target, depth + 1, included);
            }
        }
    }

    /// Follows one explicit include path; every resource along it, not only
    /// the last hop, goes into `included`.
    fn collect_path(
        &self,
        resource: &Resource,
        segments: &[String],
        included: &mut IndexMap<ResourceIdentifier, Resource>,
    ) {
        let Some((name, rest)) = segments.split_first() else {
            return;
        };
        let Some(value) = resource.relation(name) else {
            return;
        };
        for target in value.iter() {
            self.insert(target, included);
            self.collect_path(target, rest, included);
        }
    }

    fn insert(&self, resource: &Resource, included: &mut IndexMap<ResourceIdentifier, Resource>) {
        match self.registry.identifier(resource) {
            Ok(identifier) => {
                included
                    .entry(identifier)
                    .or_insert_with(|| resource.clone());
            }
            Err(err) => {
                warn!(resource_type = %resource.kind(), error = %err, "Skipping included resource");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{AttributeType, ResourceDescriptor, ResourceId};
    use heron_registry::ResourceRegistration;
    use heron_test::{fixtures, InMemoryRelationshipRepository, InMemoryResourceRepository};

    fn identifiers(resources: &[Resource]) -> Vec<(String, String)> {
        resources
            .iter()
            .map(|r| (r.kind().to_string(), r.id().map(ToString::to_string).unwrap_or_default()))
            .collect()
    }

    /// `Alpha` and `Beta` include each other by default.
    fn cyclic_registry() -> Arc<ResourceRegistry> {
        let alphas = Arc::new(InMemoryResourceRepository::new("Alpha"));
        let betas = Arc::new(InMemoryResourceRepository::new("Beta"));
        let alpha = ResourceDescriptor::builder("Alpha", "alphas")
            .attribute("name", AttributeType::String)
            .relationship(RelationshipField::to_one("beta", "Beta").include_by_default())
            .build();
        let beta = ResourceDescriptor::builder("Beta", "betas")
            .attribute("name", AttributeType::String)
            .relationship(RelationshipField::to_many("alphas", "Alpha").include_by_default())
            .build();
        let registry = ResourceRegistry::builder(fixtures::BASE_URL)
            .register(ResourceRegistration::new(alpha, alphas.clone()).relationship(
                "Beta",
                Arc::new(InMemoryRelationshipRepository::new(alphas.clone(), betas.clone())),
            ))
            .register(ResourceRegistration::new(beta, betas.clone()).relationship(
                "Alpha",
                Arc::new(InMemoryRelationshipRepository::new(betas, alphas)),
            ))
            .build()
            .unwrap();
        Arc::new(registry)
    }

    /// Alternates `Alpha`/`Beta` for `len` levels, reusing ids 1 and 2.
    fn cyclic_chain(len: usize, distinct: bool) -> Resource {
        let mut node: Option<Resource> = None;
        for level in (0..len).rev() {
            let id = if distinct { level as i64 + 1 } else { 1 };
            node = Some(if level % 2 == 0 {
                let alpha = Resource::new("Alpha").with_id(id);
                match node {
                    Some(beta) => alpha.with_to_one("beta", beta),
                    None => alpha,
                }
            } else {
                let beta = Resource::new("Beta").with_id(id);
                match node {
                    Some(alpha) => beta.with_to_many("alphas", vec![alpha]),
                    None => beta,
                }
            });
        }
        node.unwrap()
    }

    #[tokio::test]
    async fn test_explicit_to_one() {
        let resolver = IncludeResolver::new(fixtures::registry(), DEFAULT_MAX_DEPTH);
        let params = QueryParams::from_query_string("include[Task]=project").unwrap();
        let mut resources = vec![Resource::new("Task")
            .with_id(1)
            .with_to_one("project", Resource::new("Project").with_id(2))];

        let included = resolver.resolve(&mut resources, &params).await;
        assert_eq!(identifiers(&included), vec![("Project".into(), "2".into())]);
    }

    #[tokio::test]
    async fn test_lookup_if_null_fetches_relation() {
        let resolver = IncludeResolver::new(fixtures::registry(), DEFAULT_MAX_DEPTH);
        let params = QueryParams::from_query_string("include[tasks]=project").unwrap();
        let mut resources = vec![Resource::new("Task").with_id(1)];

        let included = resolver.resolve(&mut resources, &params).await;
        assert_eq!(identifiers(&included), vec![("Project".into(), "2".into())]);
        assert_eq!(resources[0].relation_ids("project"), vec![ResourceId::Integer(2)]);
    }

    #[tokio::test]
    async fn test_intermediate_resources_included() {
        let resolver = IncludeResolver::new(fixtures::registry(), DEFAULT_MAX_DEPTH);
        let params = QueryParams::from_query_string("include[Task]=project.tasks").unwrap();
        let project = Resource::new("Project")
            .with_id(2)
            .with_to_many("tasks", vec![Resource::new("Task").with_id(3)]);
        let mut resources = vec![Resource::new("Task").with_id(1).with_to_one("project", project)];

        let included = resolver.resolve(&mut resources, &params).await;
        assert_eq!(
            identifiers(&included),
            vec![("Project".into(), "2".into()), ("Task".into(), "3".into())]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_paths_are_skipped() {
        let resolver = IncludeResolver::new(fixtures::registry(), DEFAULT_MAX_DEPTH);
        let params =
            QueryParams::from_query_string("include[Task]=owner,project.owner,assignees").unwrap();
        let mut resources = vec![Resource::new("Task").with_id(3)];

        let included = resolver.resolve(&mut resources, &params).await;
        assert!(included.is_empty());
    }

    #[tokio::test]
    async fn test_default_inclusion() {
        let resolver = IncludeResolver::new(fixtures::registry(), DEFAULT_MAX_DEPTH);
        let alice = Resource::new("User").with_id("alice");
        let mut resources = vec![
            Resource::new("Document").with_id(10).with_to_one("author", alice.clone()),
            Resource::new("Memorandum").with_id(11).with_to_one("author", alice),
        ];

        let included = resolver.resolve(&mut resources, &QueryParams::new()).await;
        assert_eq!(identifiers(&included), vec![("User".into(), "alice".into())]);
    }

    #[tokio::test]
    async fn test_cyclic_defaults_terminate_without_duplicates() {
        let resolver = IncludeResolver::new(cyclic_registry(), DEFAULT_MAX_DEPTH);
        let mut resources = vec![cyclic_chain(100, false)];

        let included = resolver.resolve(&mut resources, &QueryParams::new()).await;
        assert_eq!(
            identifiers(&included),
            vec![("Beta".into(), "1".into()), ("Alpha".into(), "1".into())]
        );
    }

    #[tokio::test]
    async fn test_depth_cap() {
        let resolver = IncludeResolver::new(cyclic_registry(), 5);
        let mut resources = vec![cyclic_chain(20, true)];

        let included = resolver.resolve(&mut resources, &QueryParams::new()).await;
        assert_eq!(included.len(), 5);
        assert_eq!(resolver.max_depth(), 5);
    }
}
