//! Registry construction and lookup.

use crate::{RegistryEntry, RelationshipBinding};
use heron_core::{
    HeronError, HeronResult, RelationshipRepository, Resource, ResourceDescriptor,
    ResourceIdentifier, ResourceKind, ResourceRepository,
};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::debug;

/// Registration of one resource type.
///
/// # Example
///
/// ```rust,ignore
/// let registration = ResourceRegistration::new(task_descriptor, task_repository)
///     .relationship("Project", task_to_project)
///     .parent("Document");
/// ```
pub struct ResourceRegistration {
    descriptor: ResourceDescriptor,
    resource_repository: Arc<dyn ResourceRepository>,
    relationships: Vec<RelationshipBinding>,
    parent: Option<ResourceKind>,
}

impl ResourceRegistration {
    /// Creates a registration binding `descriptor` to `resource_repository`.
    #[must_use]
    pub fn new(descriptor: ResourceDescriptor, resource_repository: Arc<dyn ResourceRepository>) -> Self {
        Self {
            descriptor,
            resource_repository,
            relationships: Vec::new(),
            parent: None,
        }
    }

    /// Binds a relationship repository for relationships targeting `target`.
    #[must_use]
    pub fn relationship(
        mut self,
        target: impl Into<ResourceKind>,
        repository: Arc<dyn RelationshipRepository>,
    ) -> Self {
        self.relationships.push(RelationshipBinding::new(target, repository));
        self
    }

    /// Declares the parent kind of this resource.
    #[must_use]
    pub fn parent(mut self, parent: impl Into<ResourceKind>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Returns the kind being registered.
    #[must_use]
    pub fn kind(&self) -> &ResourceKind {
        self.descriptor.kind()
    }
}

/// Builder for [`ResourceRegistry`].
pub struct ResourceRegistryBuilder {
    service_url: String,
    registrations: IndexMap<ResourceKind, ResourceRegistration>,
    subtypes: IndexMap<ResourceKind, ResourceKind>,
}

impl ResourceRegistryBuilder {
    fn new(service_url: String) -> Self {
        Self {
            service_url,
            registrations: IndexMap::new(),
            subtypes: IndexMap::new(),
        }
    }

    /// Registers a resource type. A later registration of the same kind
    /// replaces the earlier one.
    #[must_use]
    pub fn register(mut self, registration: ResourceRegistration) -> Self {
        let kind = registration.kind().clone();
        if self.registrations.insert(kind.clone(), registration).is_some() {
            debug!(resource_kind = %kind, "Replacing earlier registration");
        }
        self
    }

    /// Declares `child` as a subtype of `parent` without registering it.
    ///
    /// Resources of kind `child` then resolve to the nearest registered
    /// ancestor's entry.
    #[must_use]
    pub fn subtype(mut self, child: impl Into<ResourceKind>, parent: impl Into<ResourceKind>) -> Self {
        self.subtypes.insert(child.into(), parent.into());
        self
    }

    /// Validates the registrations and builds the registry.
    ///
    /// Fails with [`HeronError::Registration`] when:
    /// - the kind hierarchy has a cycle,
    /// - a parent chain never reaches a registered kind,
    /// - two kinds share a protocol type name,
    /// - one registration binds two relationship repositories to the same target,
    /// - a relationship field has no repository bound for its target, on the
    ///   entry or any of its ancestors.
    pub fn build(self) -> HeronResult<ResourceRegistry> {
        let mut hierarchy = self.subtypes;
        for (kind, registration) in &self.registrations {
            if let Some(parent) = &registration.parent {
                hierarchy.insert(kind.clone(), parent.clone());
            }
        }
        check_acyclic(&hierarchy)?;
        check_parents_known(&hierarchy, &self.registrations)?;

        let mut type_names: IndexMap<&str, &ResourceKind> = IndexMap::new();
        for (kind, registration) in &self.registrations {
            let type_name = registration.descriptor.type_name();
            if let Some(existing) = type_names.insert(type_name, kind) {
                return Err(HeronError::registration(format!(
                    "Type name '{type_name}' is registered for both {existing} and {kind}"
                )));
            }

            let mut targets = IndexSet::new();
            for binding in &registration.relationships {
                if !targets.insert(binding.target()) {
                    return Err(HeronError::registration(format!(
                        "{kind} binds more than one relationship repository to {}",
                        binding.target()
                    )));
                }
            }
        }

        let mut pending = self.registrations;
        let order: Vec<ResourceKind> = pending.keys().cloned().collect();
        let mut built: IndexMap<ResourceKind, Arc<RegistryEntry>> = IndexMap::new();
        for kind in &order {
            build_entry(kind, &hierarchy, &mut pending, &mut built);
        }
        // Parents may have been built first; keep registration order.
        let entries: IndexMap<ResourceKind, Arc<RegistryEntry>> = order
            .into_iter()
            .filter_map(|kind| built.shift_remove(&kind).map(|entry| (kind, entry)))
            .collect();

        for entry in entries.values() {
            for field in entry.descriptor().relationships() {
                if entry.find_relationship_repository(&field.target).is_none() {
                    return Err(HeronError::registration(format!(
                        "No relationship repository bound for {}.{} targeting {}",
                        entry.kind(),
                        field.name,
                        field.target
                    )));
                }
            }
        }

        debug!(
            resources = entries.len(),
            service_url = %self.service_url,
            "Resource registry built"
        );

        Ok(ResourceRegistry {
            service_url: self.service_url,
            entries,
            hierarchy,
        })
    }
}

fn check_acyclic(hierarchy: &IndexMap<ResourceKind, ResourceKind>) -> HeronResult<()> {
    for start in hierarchy.keys() {
        let mut seen = IndexSet::new();
        seen.insert(start);
        let mut current = start;
        while let Some(parent) = hierarchy.get(current) {
            if !seen.insert(parent) {
                return Err(HeronError::registration(format!(
                    "Cyclic resource hierarchy through {start}"
                )));
            }
            current = parent;
        }
    }
    Ok(())
}

/// Every declared parent must resolve, possibly through other subtypes, to a
/// registered kind. Expects an acyclic hierarchy.
fn check_parents_known(
    hierarchy: &IndexMap<ResourceKind, ResourceKind>,
    registrations: &IndexMap<ResourceKind, ResourceRegistration>,
) -> HeronResult<()> {
    for (child, parent) in hierarchy {
        let mut current = parent;
        while !registrations.contains_key(current) {
            match hierarchy.get(current) {
                Some(next) => current = next,
                None => {
                    return Err(HeronError::registration(format!(
                        "Parent {parent} of {child} is not a registered resource kind"
                    )))
                }
            }
        }
    }
    Ok(())
}

/// Builds the entry for `kind` after its nearest registered ancestor.
fn build_entry(
    kind: &ResourceKind,
    hierarchy: &IndexMap<ResourceKind, ResourceKind>,
    pending: &mut IndexMap<ResourceKind, ResourceRegistration>,
    entries: &mut IndexMap<ResourceKind, Arc<RegistryEntry>>,
) -> Option<Arc<RegistryEntry>> {
    if let Some(entry) = entries.get(kind) {
        return Some(Arc::clone(entry));
    }
    let registration = pending.shift_remove(kind)?;

    let mut parent = None;
    let mut ancestor = hierarchy.get(kind);
    while let Some(candidate) = ancestor {
        if let Some(entry) = build_entry(candidate, hierarchy, pending, entries) {
            parent = Some(entry);
            break;
        }
        ancestor = hierarchy.get(candidate);
    }

    let entry = Arc::new(RegistryEntry::new(
        Arc::new(registration.descriptor),
        registration.resource_repository,
        registration.relationships,
        parent,
    ));
    entries.insert(kind.clone(), Arc::clone(&entry));
    Some(entry)
}

/// Read-only mapping from resource types to registry entries.
///
/// Built once at startup; lookups never lock.
///
/// # Example
///
/// ```rust,ignore
/// let registry = ResourceRegistry::builder("http://localhost:8080")
///     .register(ResourceRegistration::new(tasks, task_repository))
///     .subtype("UrgentTask", "Task")
///     .build()?;
///
/// let entry = registry.entry_for_kind(&"UrgentTask".into())?;
/// assert_eq!(entry.type_name(), "tasks");
/// ```
#[derive(Debug)]
pub struct ResourceRegistry {
    service_url: String,
    entries: IndexMap<ResourceKind, Arc<RegistryEntry>>,
    hierarchy: IndexMap<ResourceKind, ResourceKind>,
}

impl ResourceRegistry {
    /// Creates a registry builder; `service_url` prefixes every rendered link.
    #[must_use]
    pub fn builder(service_url: impl Into<String>) -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::new(service_url.into().trim_end_matches('/').to_string())
    }

    /// Returns the service URL.
    #[must_use]
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Iterates over the entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<RegistryEntry>> {
        self.entries.values()
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry whose protocol type name is `type_name`.
    #[must_use]
    pub fn find_by_type(&self, type_name: &str) -> Option<&Arc<RegistryEntry>> {
        self.entries.values().find(|entry| entry.type_name() == type_name)
    }

    /// Looks up an entry by protocol type name.
    pub fn entry_by_type(&self, type_name: &str) -> HeronResult<&Arc<RegistryEntry>> {
        self.find_by_type(type_name)
            .ok_or_else(|| HeronError::resource_type_not_found(type_name))
    }

    /// Finds the entry for `kind`, walking declared parents when `kind`
    /// itself is not registered.
    #[must_use]
    pub fn find_for_kind(&self, kind: &ResourceKind) -> Option<&Arc<RegistryEntry>> {
        let mut current = Some(kind);
        while let Some(candidate) = current {
            if let Some(entry) = self.entries.get(candidate) {
                return Some(entry);
            }
            current = self.hierarchy.get(candidate);
        }
        None
    }

    /// Looks up an entry by runtime kind.
    pub fn entry_for_kind(&self, kind: &ResourceKind) -> HeronResult<&Arc<RegistryEntry>> {
        self.find_for_kind(kind)
            .ok_or_else(|| HeronError::resource_type_not_found(kind.as_str()))
    }

    /// Returns `true` if `kind` is `ancestor` or descends from it.
    #[must_use]
    pub fn is_kind_of(&self, kind: &ResourceKind, ancestor: &ResourceKind) -> bool {
        let mut current = Some(kind);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.hierarchy.get(candidate);
        }
        false
    }

    /// Returns the relationship repository of `entry` bound to `target`.
    pub fn relationship_repository_for(
        &self,
        entry: &RegistryEntry,
        target: &ResourceKind,
    ) -> HeronResult<Arc<dyn RelationshipRepository>> {
        entry
            .find_relationship_repository(target)
            .cloned()
            .ok_or_else(|| {
                HeronError::relationship_repository_not_found(entry.kind().as_str(), target.as_str())
            })
    }

    /// Returns the collection URL of an entry, `{service_url}/{type_name}`.
    #[must_use]
    pub fn resource_url(&self, entry: &RegistryEntry) -> String {
        format!("{}/{}", self.service_url, entry.type_name())
    }

    /// Returns the `{type, id}` identifier of a resource.
    pub fn identifier(&self, resource: &Resource) -> HeronResult<ResourceIdentifier> {
        let entry = self.entry_for_kind(resource.kind())?;
        let id = resource.id().ok_or_else(|| {
            HeronError::internal(format!("{} resource has no id", resource.kind()))
        })?;
        Ok(ResourceIdentifier::new(entry.type_name(), id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use heron_core::{AttributeType, RelationshipField, ResourceId, ResourceList};
    use heron_query::QueryParams;

    struct NoopRepository;

    #[async_trait]
    impl ResourceRepository for NoopRepository {
        async fn find_one(&self, _: &ResourceId, _: &QueryParams) -> HeronResult<Option<Resource>> {
            Ok(None)
        }
        async fn find_all(&self, _: &QueryParams) -> HeronResult<ResourceList> {
            Ok(ResourceList::default())
        }
        async fn find_all_by_ids(&self, _: &[ResourceId], _: &QueryParams) -> HeronResult<ResourceList> {
            Ok(ResourceList::default())
        }
        async fn save(&self, resource: Resource) -> HeronResult<Resource> {
            Ok(resource)
        }
        async fn delete(&self, _: &ResourceId) -> HeronResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl RelationshipRepository for NoopRepository {
        async fn set_relation(&self, _: &Resource, _: Option<ResourceId>, _: &str) -> HeronResult<()> {
            Ok(())
        }
        async fn set_relations(&self, _: &Resource, _: Vec<ResourceId>, _: &str) -> HeronResult<()> {
            Ok(())
        }
        async fn add_relations(&self, _: &Resource, _: Vec<ResourceId>, _: &str) -> HeronResult<()> {
            Ok(())
        }
        async fn remove_relations(&self, _: &Resource, _: Vec<ResourceId>, _: &str) -> HeronResult<()> {
            Ok(())
        }
        async fn find_one_target(&self, _: &ResourceId, _: &str, _: &QueryParams) -> HeronResult<Option<Resource>> {
            Ok(None)
        }
        async fn find_many_targets(&self, _: &ResourceId, _: &str, _: &QueryParams) -> HeronResult<ResourceList> {
            Ok(ResourceList::default())
        }
    }

    fn descriptor(kind: &str, type_name: &str) -> ResourceDescriptor {
        ResourceDescriptor::builder(kind, type_name)
            .attribute("name", AttributeType::String)
            .build()
    }

    fn registration(kind: &str, type_name: &str) -> ResourceRegistration {
        ResourceRegistration::new(descriptor(kind, type_name), Arc::new(NoopRepository))
    }

    #[test]
    fn test_lookup_by_type_name() {
        let registry = ResourceRegistry::builder("http://localhost:8080/")
            .register(registration("Task", "tasks"))
            .register(registration("Project", "projects"))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.service_url(), "http://localhost:8080");
        let entry = registry.entry_by_type("projects").unwrap();
        assert_eq!(entry.kind().as_str(), "Project");
        assert_eq!(registry.resource_url(entry), "http://localhost:8080/projects");

        let err = registry.entry_by_type("Project").unwrap_err();
        assert!(matches!(err, HeronError::NotFound { .. }));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ResourceRegistry::builder("http://localhost")
            .register(registration("Task", "tasks"))
            .register(ResourceRegistration::new(
                ResourceDescriptor::builder("Task", "tasks")
                    .attribute("title", AttributeType::String)
                    .build(),
                Arc::new(NoopRepository),
            ))
            .build()
            .unwrap();

        let entry = registry.entry_by_type("tasks").unwrap();
        assert!(entry.descriptor().attribute("title").is_some());
        assert!(entry.descriptor().attribute("name").is_none());
    }

    #[test]
    fn test_kind_lookup_walks_ancestors() {
        let registry = ResourceRegistry::builder("http://localhost")
            .register(registration("Task", "tasks"))
            .subtype("UrgentTask", "Task")
            .subtype("CriticalTask", "UrgentTask")
            .build()
            .unwrap();

        let entry = registry.entry_for_kind(&"CriticalTask".into()).unwrap();
        assert_eq!(entry.type_name(), "tasks");
        assert!(registry.is_kind_of(&"CriticalTask".into(), &"Task".into()));
        assert!(!registry.is_kind_of(&"Task".into(), &"UrgentTask".into()));

        let err = registry.entry_for_kind(&"Comment".into()).unwrap_err();
        assert!(matches!(err, HeronError::NotFound { .. }));
    }

    #[test]
    fn test_registered_parent_entry() {
        let registry = ResourceRegistry::builder("http://localhost")
            .register(registration("Memorandum", "memoranda").parent("Document"))
            .register(registration("Document", "documents"))
            .build()
            .unwrap();

        let memo = registry.entry_by_type("memoranda").unwrap();
        let document = registry.entry_by_type("documents").unwrap();
        assert_eq!(memo.parent().unwrap().kind().as_str(), "Document");
        assert!(memo.has_ancestor(document));
        assert!(!document.has_ancestor(memo));

        let kinds: Vec<_> = registry.entries().map(|e| e.kind().as_str()).collect();
        assert_eq!(kinds, ["Memorandum", "Document"]);
    }

    #[test]
    fn test_cyclic_hierarchy_rejected() {
        let err = ResourceRegistry::builder("http://localhost")
            .register(registration("A", "as").parent("B"))
            .register(registration("B", "bs").parent("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, HeronError::Registration { .. }));
    }

    #[test]
    fn test_duplicate_relationship_target_rejected() {
        let err = ResourceRegistry::builder("http://localhost")
            .register(
                registration("Task", "tasks")
                    .relationship("Project", Arc::new(NoopRepository))
                    .relationship("Project", Arc::new(NoopRepository)),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("more than one relationship repository"));
    }

    #[test]
    fn test_duplicate_type_name_rejected() {
        let err = ResourceRegistry::builder("http://localhost")
            .register(registration("Task", "tasks"))
            .register(registration("Todo", "tasks"))
            .build()
            .unwrap_err();
        assert!(matches!(err, HeronError::Registration { .. }));
    }

    #[test]
    fn test_relationship_repository_lookup() {
        let task = ResourceDescriptor::builder("Task", "tasks")
            .relationship(RelationshipField::to_one("project", "Project"))
            .relationship(RelationshipField::to_many("assignees", "User"))
            .build();
        let registry = ResourceRegistry::builder("http://localhost")
            .register(
                ResourceRegistration::new(task, Arc::new(NoopRepository))
                    .relationship("Project", Arc::new(NoopRepository))
                    .relationship("User", Arc::new(NoopRepository)),
            )
            .build()
            .unwrap();

        let entry = registry.entry_by_type("tasks").unwrap();
        assert!(registry
            .relationship_repository_for(entry, &"Project".into())
            .is_ok());
        assert!(matches!(
            registry.relationship_repository_for(entry, &"Comment".into()),
            Err(HeronError::RelationshipRepositoryNotFound { .. })
        ));
    }

    #[test]
    fn test_unbound_relationship_rejected() {
        let task = ResourceDescriptor::builder("Task", "tasks")
            .relationship(RelationshipField::to_one("project", "Project"))
            .relationship(RelationshipField::to_many("assignees", "User"))
            .build();
        let err = ResourceRegistry::builder("http://localhost")
            .register(
                ResourceRegistration::new(task, Arc::new(NoopRepository))
                    .relationship("Project", Arc::new(NoopRepository)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, HeronError::Registration { .. }));
        assert!(err.to_string().contains("Task.assignees"));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let err = ResourceRegistry::builder("http://localhost")
            .register(registration("Memorandum", "memoranda").parent("Ghost"))
            .build()
            .unwrap_err();
        assert!(matches!(err, HeronError::Registration { .. }));
        assert!(err.to_string().contains("Ghost"));

        let err = ResourceRegistry::builder("http://localhost")
            .register(registration("Task", "tasks"))
            .subtype("UrgentTask", "Ghost")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn test_subtype_inherits_parent_relationship_repositories() {
        let registry = ResourceRegistry::builder("http://localhost")
            .register(registration("Document", "documents").relationship("User", Arc::new(NoopRepository)))
            .register(registration("Memorandum", "memoranda").parent("Document"))
            .build()
            .unwrap();

        let memo = registry.entry_by_type("memoranda").unwrap();
        assert!(registry.relationship_repository_for(memo, &"User".into()).is_ok());
    }

    #[test]
    fn test_identifier() {
        let registry = ResourceRegistry::builder("http://localhost")
            .register(registration("Task", "tasks"))
            .subtype("UrgentTask", "Task")
            .build()
            .unwrap();

        let identifier = registry
            .identifier(&Resource::new("UrgentTask").with_id(3))
            .unwrap();
        assert_eq!(identifier, ResourceIdentifier::new("tasks", "3"));
        assert!(registry.identifier(&Resource::new("Task")).is_err());
    }
}
