//! Fixture resource types and seeded repositories.
//!
//! | Kind | Type name | Id | Fields |
//! |------|-----------|----|--------|
//! | `Task` | `tasks` | integer | `name`, `description`, `priority`; `project` (to-one, lookup if null), `assignees` (to-many `User`) |
//! | `UrgentTask` | - | - | subtype of `Task` |
//! | `Project` | `projects` | integer | `name`; `tasks` (to-many `Task`) |
//! | `User` | `users` | string | `name` |
//! | `Document` | `documents` | integer | `title`; `author` (to-one `User`, included by default), `watchers` (to-many `User`, lazy) |
//! | `Memorandum` | `memoranda` | integer | `title`, `recipient`; `author` (to-one `User`, included by default); parent `Document` |
//!
//! Seed data: projects 2 (`Heron`) and 5 (`Kestrel`); users `alice` and `bob`;
//! task 1 in project 2 assigned to `alice`; task 3 without a project;
//! document 10 written by `alice` and watched by `bob`.

use crate::{InMemoryRelationshipRepository, InMemoryResourceRepository};
use heron_core::{
    AttributeType, HeronResult, IdType, RelationshipField, Resource, ResourceDescriptor,
};
use heron_registry::{ResourceRegistration, ResourceRegistry, ResourceRegistryBuilder};
use std::sync::Arc;

/// Service URL used by [`registry`].
pub const BASE_URL: &str = "http://localhost:8080";

/// Descriptor of `Task` / `tasks`.
#[must_use]
pub fn task_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::builder("Task", "tasks")
        .attribute("name", AttributeType::String)
        .attribute("description", AttributeType::String)
        .attribute("priority", AttributeType::Integer)
        .relationship(RelationshipField::to_one("project", "Project").lookup_if_null())
        .relationship(RelationshipField::to_many("assignees", "User"))
        .build()
}

/// Descriptor of `Project` / `projects`.
#[must_use]
pub fn project_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::builder("Project", "projects")
        .attribute("name", AttributeType::String)
        .relationship(RelationshipField::to_many("tasks", "Task"))
        .build()
}

/// Descriptor of `User` / `users`.
#[must_use]
pub fn user_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::builder("User", "users")
        .id("id", IdType::String)
        .attribute("name", AttributeType::String)
        .build()
}

/// Descriptor of `Document` / `documents`.
#[must_use]
pub fn document_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::builder("Document", "documents")
        .attribute("title", AttributeType::String)
        .relationship(RelationshipField::to_one("author", "User").include_by_default())
        .relationship(RelationshipField::to_many("watchers", "User").lazy())
        .build()
}

/// Descriptor of `Memorandum` / `memoranda`.
#[must_use]
pub fn memorandum_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::builder("Memorandum", "memoranda")
        .attribute("title", AttributeType::String)
        .attribute("recipient", AttributeType::String)
        .relationship(RelationshipField::to_one("author", "User").include_by_default())
        .build()
}

/// Seeded repositories for the fixture types.
///
/// Every repository is reachable so tests can assert on saved resources and
/// recorded relationship calls.
#[derive(Debug)]
pub struct Fixture {
    /// `Task` resources.
    pub tasks: Arc<InMemoryResourceRepository>,
    /// `Project` resources.
    pub projects: Arc<InMemoryResourceRepository>,
    /// `User` resources.
    pub users: Arc<InMemoryResourceRepository>,
    /// `Document` resources.
    pub documents: Arc<InMemoryResourceRepository>,
    /// `Memorandum` resources.
    pub memoranda: Arc<InMemoryResourceRepository>,
    /// `Task` to `Project`.
    pub task_project: Arc<InMemoryRelationshipRepository>,
    /// `Task` to `User`.
    pub task_assignees: Arc<InMemoryRelationshipRepository>,
    /// `Project` to `Task`.
    pub project_tasks: Arc<InMemoryRelationshipRepository>,
    /// `Document` to `User`.
    pub document_users: Arc<InMemoryRelationshipRepository>,
}

impl Fixture {
    /// Creates and seeds the repositories.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryResourceRepository::new("Task"));
        let projects = Arc::new(InMemoryResourceRepository::new("Project"));
        let users = Arc::new(InMemoryResourceRepository::new("User"));
        let documents = Arc::new(InMemoryResourceRepository::new("Document"));
        let memoranda = Arc::new(InMemoryResourceRepository::new("Memorandum"));

        let heron = projects.insert(Resource::new("Project").with_id(2).with_attribute("name", "Heron"));
        projects.insert(Resource::new("Project").with_id(5).with_attribute("name", "Kestrel"));
        let alice = users.insert(Resource::new("User").with_id("alice").with_attribute("name", "Alice"));
        let bob = users.insert(Resource::new("User").with_id("bob").with_attribute("name", "Bob"));

        tasks.insert(
            Resource::new("Task")
                .with_id(1)
                .with_attribute("name", "write docs")
                .with_attribute("priority", 1)
                .with_to_one("project", heron)
                .with_to_many("assignees", vec![alice.clone()]),
        );
        tasks.insert(
            Resource::new("Task")
                .with_id(3)
                .with_attribute("name", "review")
                .with_attribute("priority", 2),
        );
        documents.insert(
            Resource::new("Document")
                .with_id(10)
                .with_attribute("title", "Design notes")
                .with_to_one("author", alice)
                .with_to_many("watchers", vec![bob]),
        );

        let relationship = |source: &Arc<InMemoryResourceRepository>, target: &Arc<InMemoryResourceRepository>| {
            Arc::new(InMemoryRelationshipRepository::new(Arc::clone(source), Arc::clone(target)))
        };

        Self {
            task_project: relationship(&tasks, &projects),
            task_assignees: relationship(&tasks, &users),
            project_tasks: relationship(&projects, &tasks),
            document_users: relationship(&documents, &users),
            tasks,
            projects,
            users,
            documents,
            memoranda,
        }
    }

    /// Returns the registrations of every fixture type.
    #[must_use]
    pub fn registrations(&self) -> Vec<ResourceRegistration> {
        vec![
            ResourceRegistration::new(task_descriptor(), self.tasks.clone())
                .relationship("Project", self.task_project.clone())
                .relationship("User", self.task_assignees.clone()),
            ResourceRegistration::new(project_descriptor(), self.projects.clone())
                .relationship("Task", self.project_tasks.clone()),
            ResourceRegistration::new(user_descriptor(), self.users.clone()),
            ResourceRegistration::new(document_descriptor(), self.documents.clone())
                .relationship("User", self.document_users.clone()),
            ResourceRegistration::new(memorandum_descriptor(), self.memoranda.clone())
                .parent("Document"),
        ]
    }

    /// Returns a registry builder with every fixture type registered.
    #[must_use]
    pub fn registry_builder(&self, service_url: &str) -> ResourceRegistryBuilder {
        self.registrations()
            .into_iter()
            .fold(ResourceRegistry::builder(service_url), ResourceRegistryBuilder::register)
            .subtype("UrgentTask", "Task")
    }

    /// Builds the fixture registry.
    pub fn build_registry(&self, service_url: &str) -> HeronResult<Arc<ResourceRegistry>> {
        self.registry_builder(service_url).build().map(Arc::new)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the fixture registry over freshly seeded repositories.
///
/// # Panics
///
/// Never for the fixture types; they always pass registration checks.
#[must_use]
pub fn registry() -> Arc<ResourceRegistry> {
    Fixture::new()
        .build_registry(BASE_URL)
        .expect("fixture registrations are valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::ResourceId;

    #[test]
    fn test_registry_layout() {
        let registry = registry();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.entry_for_kind(&"UrgentTask".into()).unwrap().type_name(), "tasks");
        let memo = registry.entry_by_type("memoranda").unwrap();
        assert_eq!(memo.parent().unwrap().type_name(), "documents");
        assert!(registry.relationship_repository_for(memo, &"User".into()).is_ok());
    }

    #[test]
    fn test_seed_data() {
        let fixture = Fixture::new();
        let task = fixture.tasks.get(&1.into()).unwrap();
        assert_eq!(task.relation_ids("project"), vec![ResourceId::Integer(2)]);
        assert!(fixture.tasks.get(&3.into()).unwrap().relation("project").is_none());
        assert_eq!(fixture.users.len(), 2);
    }
}
