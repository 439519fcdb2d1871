//! Resource and document rendering.

use crate::{
    Document, PrimaryData, RelationshipLinks, RelationshipObject, ResourceLinks, ResourceObject,
};
use heron_core::{
    AttributeValue, Cardinality, HeronError, HeronResult, Linkage, Payload, RelationValue,
    RelationshipField, Resource, Response,
};
use heron_query::QueryParams;
use heron_registry::ResourceRegistry;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::trace;

/// Renders resources into wire documents.
///
/// Rendering rules per resource:
///
/// - `type` comes from the registry entry of the resource's kind.
/// - Attributes and relationships are filtered by `fields[Scope]` where the
///   scope names the resource's own type; an empty or absent fieldset renders
///   every field.
/// - Every relationship carries `self` and `related` links. Its linkage is
///   `{type, id}` for to-one, an array for to-many, `null` / `[]` when unset.
/// - Lazy relationships omit the linkage unless an inclusion path scoped to
///   the resource's type starts with the field.
#[derive(Debug, Clone)]
pub struct DocumentSerializer {
    registry: Arc<ResourceRegistry>,
}

impl DocumentSerializer {
    /// Creates a serializer over `registry`.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Renders a controller response and its included resources.
    ///
    /// Returns `None` for a response without primary data, meta or links.
    pub fn serialize(
        &self,
        response: &Response,
        included: &[Resource],
        params: &QueryParams,
    ) -> HeronResult<Option<Document>> {
        if response.payload == Payload::Empty && response.meta.is_none() && response.links.is_none()
        {
            return Ok(None);
        }

        let data = match &response.payload {
            Payload::Empty => None,
            Payload::Resource(resource) => Some(PrimaryData::Resource(
                resource
                    .as_ref()
                    .map(|r| self.resource_object(r, params).map(Box::new))
                    .transpose()?,
            )),
            Payload::Collection(resources) => Some(PrimaryData::Collection(
                resources
                    .iter()
                    .map(|r| self.resource_object(r, params))
                    .collect::<HeronResult<_>>()?,
            )),
            Payload::Linkage(linkage) => Some(PrimaryData::Linkage(linkage.clone())),
        };

        let mut seen: IndexSet<_> = response
            .payload
            .resources()
            .iter()
            .filter_map(|r| self.registry.identifier(r).ok())
            .collect();
        let mut rendered = Vec::with_capacity(included.len());
        for resource in included {
            let object = self.resource_object(resource, params)?;
            if seen.insert(object.identifier()) {
                rendered.push(object);
            }
        }

        Ok(Some(Document {
            data,
            included: rendered,
            meta: response.meta.clone(),
            links: response.links.clone(),
        }))
    }

    /// Renders one resource.
    pub fn resource_object(
        &self,
        resource: &Resource,
        params: &QueryParams,
    ) -> HeronResult<ResourceObject> {
        let entry = self.registry.entry_for_kind(resource.kind())?;
        let descriptor = entry.descriptor();
        let id = resource
            .id()
            .ok_or_else(|| {
                HeronError::internal(format!(
                    "Cannot render {} resource without an id",
                    resource.kind()
                ))
            })?
            .to_string();

        let scopes = descriptor.scopes();
        let fields = params.included_fields().get_any(&scopes);
        let allowed = |name: &str| fields.map_or(true, |f| f.allows(name));
        let includes = params.included_relations().get_any(&scopes);

        let attributes: IndexMap<String, AttributeValue> = descriptor
            .attributes()
            .iter()
            .filter(|field| allowed(&field.name))
            .map(|field| {
                let value = resource
                    .attribute(&field.name)
                    .cloned()
                    .unwrap_or(AttributeValue::Null);
                (field.name.clone(), value)
            })
            .collect();

        let self_link = format!("{}/{id}", self.registry.resource_url(entry));
        let mut relationships = IndexMap::new();
        for field in descriptor.relationships() {
            if !allowed(&field.name) {
                continue;
            }
            let explicitly_included = includes.is_some_and(|inc| inc.starts_with(&field.name));
            let data = if field.lazy && !explicitly_included {
                trace!(
                    resource_type = descriptor.type_name(),
                    field = %field.name,
                    "Omitting linkage of lazy relationship"
                );
                None
            } else {
                Some(self.linkage(field, resource.relation(&field.name))?)
            };
            relationships.insert(
                field.name.clone(),
                RelationshipObject {
                    links: RelationshipLinks {
                        self_link: format!("{self_link}/relationships/{}", field.name),
                        related: format!("{self_link}/{}", field.name),
                    },
                    data,
                },
            );
        }

        Ok(ResourceObject {
            resource_type: descriptor.type_name().to_string(),
            id,
            attributes,
            relationships,
            links: ResourceLinks { self_link },
        })
    }

    /// Renders the linkage of a relationship value.
    pub fn linkage(
        &self,
        field: &RelationshipField,
        value: Option<&RelationValue>,
    ) -> HeronResult<Option<Linkage>> {
        let identifiers = value
            .map(|v| {
                v.iter()
                    .map(|target| self.registry.identifier(target))
                    .collect::<HeronResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(match field.cardinality {
            Cardinality::ToOne => identifiers.into_iter().next().map(Linkage::One),
            Cardinality::ToMany => Some(Linkage::Many(identifiers)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{Meta, ResourceIdentifier};
    use heron_test::fixtures;
    use http::StatusCode;
    use proptest::prelude::*;

    fn serializer() -> DocumentSerializer {
        DocumentSerializer::new(fixtures::registry())
    }

    fn task() -> Resource {
        Resource::new("Task")
            .with_id(1)
            .with_attribute("name", "write docs")
            .with_attribute("priority", 2)
            .with_to_one("project", Resource::new("Project").with_id(2))
            .with_to_many(
                "assignees",
                vec![Resource::new("User").with_id("alice"), Resource::new("User").with_id("bob")],
            )
    }

    #[test]
    fn test_resource_object_full() {
        let object = serializer()
            .resource_object(&task(), &QueryParams::new())
            .unwrap();

        assert_eq!(object.resource_type, "tasks");
        assert_eq!(object.id, "1");
        assert_eq!(object.attributes["name"], AttributeValue::from("write docs"));
        assert_eq!(object.attributes["description"], AttributeValue::Null);
        assert_eq!(object.links.self_link, "http://localhost:8080/tasks/1");

        let project = &object.relationships["project"];
        assert_eq!(
            project.links.self_link,
            "http://localhost:8080/tasks/1/relationships/project"
        );
        assert_eq!(project.links.related, "http://localhost:8080/tasks/1/project");
        assert_eq!(
            project.linkage(),
            Some(&Linkage::One(ResourceIdentifier::new("projects", "2")))
        );

        let Some(Linkage::Many(assignees)) = object.relationships["assignees"].linkage() else {
            panic!("expected to-many linkage");
        };
        assert_eq!(assignees[1], ResourceIdentifier::new("users", "bob"));
    }

    #[test]
    fn test_unset_relationships_render_null_and_empty() {
        let object = serializer()
            .resource_object(&Resource::new("Task").with_id(3), &QueryParams::new())
            .unwrap();
        assert_eq!(object.relationships["project"].data, Some(None));
        assert_eq!(
            object.relationships["assignees"].data,
            Some(Some(Linkage::Many(vec![])))
        );
    }

    #[test]
    fn test_sparse_fields_scoped_by_type() {
        let params = QueryParams::from_query_string("fields[tasks]=name,project&fields[Project]=name")
            .unwrap();
        let object = serializer().resource_object(&task(), &params).unwrap();

        let attributes: Vec<_> = object.attributes.keys().map(String::as_str).collect();
        assert_eq!(attributes, ["name"]);
        let relationships: Vec<_> = object.relationships.keys().map(String::as_str).collect();
        assert_eq!(relationships, ["project"]);
    }

    #[test]
    fn test_lazy_relationship_linkage() {
        let document = Resource::new("Document")
            .with_id(10)
            .with_to_many("watchers", vec![Resource::new("User").with_id("bob")]);

        let object = serializer()
            .resource_object(&document, &QueryParams::new())
            .unwrap();
        assert!(object.relationships["watchers"].data.is_none());

        let params = QueryParams::from_query_string("include[Document]=watchers").unwrap();
        let object = serializer().resource_object(&document, &params).unwrap();
        assert!(object.relationships["watchers"].linkage().is_some());

        let params = QueryParams::from_query_string("include[Task]=watchers").unwrap();
        let object = serializer().resource_object(&document, &params).unwrap();
        assert!(object.relationships["watchers"].data.is_none());
    }

    #[test]
    fn test_subtype_renders_with_registered_type() {
        let object = serializer()
            .resource_object(&Resource::new("UrgentTask").with_id(8), &QueryParams::new())
            .unwrap();
        assert_eq!(object.resource_type, "tasks");
    }

    #[test]
    fn test_unregistered_kind_is_not_found() {
        let err = serializer()
            .resource_object(&Resource::new("Comment").with_id(1), &QueryParams::new())
            .unwrap_err();
        assert!(matches!(err, HeronError::NotFound { .. }));
    }

    #[test]
    fn test_serialize_excludes_primary_from_included() {
        let project = Resource::new("Project").with_id(2).with_attribute("name", "Heron");
        let response = Response::new(StatusCode::OK, Payload::Resource(Some(task())));
        let included = vec![project.clone(), project, task()];

        let document = serializer()
            .serialize(&response, &included, &QueryParams::new())
            .unwrap()
            .unwrap();

        assert_eq!(document.resource().unwrap().id, "1");
        assert_eq!(document.included.len(), 1);
        assert_eq!(document.included[0].identifier(), ResourceIdentifier::new("projects", "2"));
    }

    #[test]
    fn test_serialize_no_content() {
        let serializer = serializer();
        let params = QueryParams::new();
        assert!(serializer
            .serialize(&Response::no_content(), &[], &params)
            .unwrap()
            .is_none());

        let response = Response::no_content().with_meta(Some(Meta::new().with("touched", true)));
        let document = serializer.serialize(&response, &[], &params).unwrap().unwrap();
        assert!(document.data.is_none());
        assert_eq!(document.to_value()["meta"]["touched"], true);
    }

    #[test]
    fn test_linkage_ids_parse_back() {
        let serializer = serializer();
        let object = serializer.resource_object(&task(), &QueryParams::new()).unwrap();
        let Some(Linkage::One(project)) = object.relationships["project"].linkage() else {
            panic!("expected to-one linkage");
        };
        let entry = serializer.registry().entry_by_type(&project.resource_type).unwrap();
        let id = entry.descriptor().id_type().parse(&project.resource_type, &project.id).unwrap();
        assert_eq!(id, heron_core::ResourceId::Integer(2));
    }

    proptest! {
        #[test]
        fn test_sparse_fieldset_idempotent(mask in prop::collection::vec(any::<bool>(), 3)) {
            let names = ["name", "description", "priority"];
            let selected: Vec<_> = names.iter().zip(&mask).filter(|(_, on)| **on).map(|(n, _)| *n).collect();
            let query = if selected.is_empty() {
                String::new()
            } else {
                format!("fields[Task]={}", selected.join(","))
            };
            let params = QueryParams::from_query_string(&query).unwrap();
            let serializer = serializer();

            let first = serializer.resource_object(&task(), &params).unwrap();
            let second = serializer.resource_object(&task(), &params).unwrap();
            prop_assert_eq!(&first.attributes, &second.attributes);

            let expected = if selected.is_empty() { names.to_vec() } else { selected };
            let rendered: Vec<_> = first.attributes.keys().map(String::as_str).collect();
            prop_assert_eq!(rendered, expected);
        }
    }
}
