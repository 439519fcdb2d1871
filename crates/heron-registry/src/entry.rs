//! Registry entries.

use heron_core::{RelationshipRepository, ResourceDescriptor, ResourceKind, ResourceRepository};
use std::fmt;
use std::sync::Arc;

/// A relationship repository bound to one target kind.
#[derive(Clone)]
pub struct RelationshipBinding {
    target: ResourceKind,
    repository: Arc<dyn RelationshipRepository>,
}

impl RelationshipBinding {
    /// Binds `repository` to `target`.
    #[must_use]
    pub fn new(target: impl Into<ResourceKind>, repository: Arc<dyn RelationshipRepository>) -> Self {
        Self {
            target: target.into(),
            repository,
        }
    }

    /// Returns the target kind.
    #[must_use]
    pub fn target(&self) -> &ResourceKind {
        &self.target
    }

    /// Returns the repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn RelationshipRepository> {
        &self.repository
    }
}

impl fmt::Debug for RelationshipBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipBinding")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Everything the registry knows about one resource type.
///
/// Entries are immutable once the registry is built. `parent` points at the
/// entry of the nearest registered ancestor kind, if any.
pub struct RegistryEntry {
    descriptor: Arc<ResourceDescriptor>,
    resource_repository: Arc<dyn ResourceRepository>,
    relationship_repositories: Vec<RelationshipBinding>,
    parent: Option<Arc<RegistryEntry>>,
}

impl RegistryEntry {
    pub(crate) fn new(
        descriptor: Arc<ResourceDescriptor>,
        resource_repository: Arc<dyn ResourceRepository>,
        relationship_repositories: Vec<RelationshipBinding>,
        parent: Option<Arc<RegistryEntry>>,
    ) -> Self {
        Self {
            descriptor,
            resource_repository,
            relationship_repositories,
            parent,
        }
    }

    /// Returns the resource descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    /// Returns the resource kind.
    #[must_use]
    pub fn kind(&self) -> &ResourceKind {
        self.descriptor.kind()
    }

    /// Returns the protocol type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.descriptor.type_name()
    }

    /// Returns the resource repository.
    #[must_use]
    pub fn resource_repository(&self) -> &Arc<dyn ResourceRepository> {
        &self.resource_repository
    }

    /// Returns the relationship repository bindings in registration order.
    #[must_use]
    pub fn relationship_repositories(&self) -> &[RelationshipBinding] {
        &self.relationship_repositories
    }

    /// Returns the parent entry, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<RegistryEntry>> {
        self.parent.as_ref()
    }

    /// Returns `true` if `ancestor` is somewhere on this entry's parent chain.
    #[must_use]
    pub fn has_ancestor(&self, ancestor: &RegistryEntry) -> bool {
        let mut current = self.parent.as_deref();
        while let Some(entry) = current {
            if entry.kind() == ancestor.kind() {
                return true;
            }
            current = entry.parent.as_deref();
        }
        false
    }

    /// Finds the relationship repository bound to `target` on this entry or,
    /// failing that, on its ancestors.
    #[must_use]
    pub fn find_relationship_repository(
        &self,
        target: &ResourceKind,
    ) -> Option<&Arc<dyn RelationshipRepository>> {
        self.relationship_repositories
            .iter()
            .find(|binding| &binding.target == target)
            .map(RelationshipBinding::repository)
            .or_else(|| {
                self.parent
                    .as_deref()
                    .and_then(|parent| parent.find_relationship_repository(target))
            })
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("kind", self.kind())
            .field("type_name", &self.type_name())
            .field("relationship_repositories", &self.relationship_repositories)
            .field("parent", &self.parent.as_ref().map(|p| p.kind().clone()))
            .finish_non_exhaustive()
    }
}
