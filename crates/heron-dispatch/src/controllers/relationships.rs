//! Controllers for `/type/id/relationships/field` paths.

use super::support::{
    compatible_entry, endpoint_entry, fetch_related, meta_and_links, path_id, require_body,
    Related, MULTIPLE_DATA, NON_MULTIPLE_DATA, NO_DATA,
};
use crate::Controller;
use async_trait::async_trait;
use heron_core::{
    BodyData, DataBody, HeronError, HeronResult, JsonPath, Linkage, Payload, RelationshipRepository,
    RequestBody, Resource, ResourceId, Response,
};
use heron_query::QueryParams;
use heron_registry::{RegistryEntry, ResourceRegistry};
use http::{Method, StatusCode};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// `GET /type/id/relationships/field`: the linkage as primary data.
#[derive(Debug, Clone)]
pub struct RelationshipsResourceGet {
    registry: Arc<ResourceRegistry>,
}

impl RelationshipsResourceGet {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Controller for RelationshipsResourceGet {
    fn name(&self) -> &'static str {
        "relationships-resource-get"
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        method == Method::GET && path.is_relationship() && path.has_single_id()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let linkage = match fetch_related(&self.registry, path, params).await? {
            Related::One(target) => target
                .map(|target| self.registry.identifier(&target).map(Linkage::One))
                .transpose()?,
            Related::Many(list) => Some(Linkage::Many(
                list.items
                    .iter()
                    .map(|target| self.registry.identifier(target))
                    .collect::<HeronResult<_>>()?,
            )),
        };
        Ok(Response::new(StatusCode::OK, Payload::Linkage(linkage)))
    }
}

/// Per-verb semantics of a relationship mutation.
#[async_trait]
pub trait RelationshipVerb: Send + Sync + 'static {
    /// Method this verb answers to.
    fn method(&self) -> Method;

    /// Controller name, used in logs.
    fn name(&self) -> &'static str;

    /// Applies the verb to a to-one relationship; `None` is `"data": null`.
    async fn process_to_one(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        target: Option<ResourceId>,
        field: &str,
    ) -> HeronResult<()>;

    /// Applies the verb to a to-many relationship.
    async fn process_to_many(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        targets: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()>;
}

/// `POST`: appends to-many targets, sets a to-one target.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddRelationships;

#[async_trait]
impl RelationshipVerb for AddRelationships {
    fn method(&self) -> Method {
        Method::POST
    }

    fn name(&self) -> &'static str {
        "relationships-resource-post"
    }

    async fn process_to_one(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        target: Option<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        repository.set_relation(source, target, field).await
    }

    async fn process_to_many(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        targets: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        repository.add_relations(source, targets, field).await
    }
}

/// `PATCH`: replaces the relation; an empty array clears a to-many relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceRelationships;

#[async_trait]
impl RelationshipVerb for ReplaceRelationships {
    fn method(&self) -> Method {
        Method::PATCH
    }

    fn name(&self) -> &'static str {
        "relationships-resource-patch"
    }

    async fn process_to_one(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        target: Option<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        repository.set_relation(source, target, field).await
    }

    async fn process_to_many(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        targets: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        repository.set_relations(source, targets, field).await
    }
}

/// `DELETE`: removes to-many targets, clears a to-one relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveRelationships;

#[async_trait]
impl RelationshipVerb for RemoveRelationships {
    fn method(&self) -> Method {
        Method::DELETE
    }

    fn name(&self) -> &'static str {
        "relationships-resource-delete"
    }

    async fn process_to_one(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        _target: Option<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        repository.set_relation(source, None, field).await
    }

    async fn process_to_many(
        &self,
        repository: &dyn RelationshipRepository,
        source: &Resource,
        targets: Vec<ResourceId>,
        field: &str,
    ) -> HeronResult<()> {
        repository.remove_relations(source, targets, field).await
    }
}

/// Relationship mutation controller, parameterized by its verb.
///
/// The body shape must follow the field's cardinality: an array for to-many
/// ("Non-multiple data in body" otherwise), a single object or `null` for
/// to-one ("Multiple data in body" otherwise). Every target id is parsed and
/// type-checked before the relationship repository is called.
///
/// Responds `204 No Content` with the owning resource's meta and links.
pub struct RelationshipsResourceUpsert<V> {
    registry: Arc<ResourceRegistry>,
    verb: V,
}

/// `POST /type/id/relationships/field`
pub type RelationshipsResourcePost = RelationshipsResourceUpsert<AddRelationships>;
/// `PATCH /type/id/relationships/field`
pub type RelationshipsResourcePatch = RelationshipsResourceUpsert<ReplaceRelationships>;
/// `DELETE /type/id/relationships/field`
pub type RelationshipsResourceDelete = RelationshipsResourceUpsert<RemoveRelationships>;

impl<V: RelationshipVerb + Default> RelationshipsResourceUpsert<V> {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self::with_verb(registry, V::default())
    }
}

impl<V: RelationshipVerb> RelationshipsResourceUpsert<V> {
    /// Creates the controller with an explicit verb.
    #[must_use]
    pub fn with_verb(registry: Arc<ResourceRegistry>, verb: V) -> Self {
        Self { registry, verb }
    }

    fn target_ids(
        &self,
        target: &RegistryEntry,
        items: &[DataBody],
        error: impl Fn(String) -> HeronError,
    ) -> HeronResult<Vec<ResourceId>> {
        items.iter().map(|item| self.target_id(target, item, &error)).collect()
    }

    fn target_id(
        &self,
        target: &RegistryEntry,
        item: &DataBody,
        error: &impl Fn(String) -> HeronError,
    ) -> HeronResult<ResourceId> {
        let entry = compatible_entry(&self.registry, target, &item.resource_type)?;
        let raw = item
            .id
            .as_deref()
            .ok_or_else(|| error(format!("Missing id in {} linkage", item.resource_type)))?;
        entry.descriptor().id_type().parse(entry.type_name(), raw)
    }
}

impl<V> fmt::Debug for RelationshipsResourceUpsert<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipsResourceUpsert")
            .field("resources", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<V: RelationshipVerb> Controller for RelationshipsResourceUpsert<V> {
    fn name(&self) -> &'static str {
        self.verb.name()
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        *method == self.verb.method() && path.is_relationship() && path.has_single_id()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let method = self.verb.method();
        let entry = endpoint_entry(&self.registry, path)?;
        let body = require_body(&method, entry, body)?;
        let id = path_id(entry, path)?;
        let name = path
            .element()
            .map(|element| element.field())
            .ok_or_else(|| HeronError::not_found(format!("Invalid path: {path}")))?;
        let field = entry
            .descriptor()
            .relationship(name)
            .ok_or_else(|| HeronError::field_not_found(entry.type_name(), name))?;
        let target = self.registry.entry_for_kind(&field.target)?;
        let relationships = self
            .registry
            .relationship_repository_for(entry, &field.target)?;
        let error = |message: String| HeronError::request_body(method.as_str(), entry.type_name(), message);

        let resources = entry.resource_repository();
        let source = resources
            .find_one(&id, params)
            .await?
            .ok_or_else(|| HeronError::not_found_resource(entry.type_name(), id.to_string()))?;

        if field.is_to_many() {
            let items = match &body.data {
                Some(BodyData::Multiple(items)) => items,
                Some(BodyData::Single(_)) => return Err(error(NON_MULTIPLE_DATA.to_string())),
                None => return Err(error(NO_DATA.to_string())),
            };
            let targets = self.target_ids(target, items, error)?;
            debug!(
                controller = self.verb.name(),
                resource_type = entry.type_name(),
                resource_id = %id,
                field = name,
                targets = targets.len(),
                "Updating to-many relationship"
            );
            self.verb
                .process_to_many(relationships.as_ref(), &source, targets, name)
                .await?;
        } else {
            let item = match &body.data {
                Some(BodyData::Single(item)) => item.as_ref(),
                Some(BodyData::Multiple(_)) => return Err(error(MULTIPLE_DATA.to_string())),
                None => return Err(error(NO_DATA.to_string())),
            };
            let target_id = item
                .map(|item| self.target_id(target, item, &error))
                .transpose()?;
            debug!(
                controller = self.verb.name(),
                resource_type = entry.type_name(),
                resource_id = %id,
                field = name,
                target = ?target_id,
                "Updating to-one relationship"
            );
            self.verb
                .process_to_one(relationships.as_ref(), &source, target_id, name)
                .await?;
        }

        let (meta, links) = meta_and_links(
            resources.as_ref(),
            Some(&id),
            std::slice::from_ref(&source),
            params,
        );
        Ok(Response::no_content().with_meta(meta).with_links(links))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::ResourceIdentifier;
    use heron_test::fixtures::Fixture;
    use heron_test::RelationOp;

    fn setup() -> (Fixture, Arc<ResourceRegistry>) {
        let fixture = Fixture::new();
        let registry = fixture.build_registry("http://localhost:8080").unwrap();
        (fixture, registry)
    }

    fn user(id: &str) -> DataBody {
        let mut data = DataBody::new("users");
        data.id = Some(id.into());
        data
    }

    fn project(id: &str) -> DataBody {
        let mut data = DataBody::new("projects");
        data.id = Some(id.into());
        data
    }

    #[tokio::test]
    async fn test_get_linkage() {
        let (_, registry) = setup();
        let controller = RelationshipsResourceGet::new(registry);
        let path = JsonPath::parse("/tasks/1/relationships/project").unwrap();
        assert!(controller.is_acceptable(&path, &Method::GET));

        let response = controller.handle(&path, &QueryParams::new(), None).await.unwrap();
        assert_eq!(
            response.payload,
            Payload::Linkage(Some(Linkage::One(ResourceIdentifier::new("projects", "2"))))
        );

        let response = controller
            .handle(&JsonPath::parse("/tasks/3/relationships/project").unwrap(), &QueryParams::new(), None)
            .await
            .unwrap();
        assert_eq!(response.payload, Payload::Linkage(None));
    }

    #[tokio::test]
    async fn test_verbs_accept_their_method() {
        let (_, registry) = setup();
        let path = JsonPath::parse("/tasks/1/relationships/assignees").unwrap();
        assert!(RelationshipsResourcePost::new(Arc::clone(&registry)).is_acceptable(&path, &Method::POST));
        assert!(RelationshipsResourcePatch::new(Arc::clone(&registry)).is_acceptable(&path, &Method::PATCH));
        assert!(RelationshipsResourceDelete::new(Arc::clone(&registry)).is_acceptable(&path, &Method::DELETE));
        assert!(!RelationshipsResourcePost::new(registry).is_acceptable(&path, &Method::PATCH));
    }

    #[tokio::test]
    async fn test_several_ids_not_accepted() {
        let (_, registry) = setup();
        let path = JsonPath::parse("/tasks/1,2/relationships/assignees").unwrap();
        assert!(!RelationshipsResourceGet::new(Arc::clone(&registry)).is_acceptable(&path, &Method::GET));
        assert!(!RelationshipsResourcePost::new(Arc::clone(&registry)).is_acceptable(&path, &Method::POST));
        assert!(!RelationshipsResourcePatch::new(Arc::clone(&registry)).is_acceptable(&path, &Method::PATCH));
        assert!(!RelationshipsResourceDelete::new(registry).is_acceptable(&path, &Method::DELETE));
    }

    #[tokio::test]
    async fn test_add_to_many() {
        let (fixture, registry) = setup();
        let controller = RelationshipsResourcePost::new(registry);
        let response = controller
            .handle(
                &JsonPath::parse("/tasks/1/relationships/assignees").unwrap(),
                &QueryParams::new(),
                Some(&RequestBody::multiple(vec![user("bob")])),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        let call = fixture.task_assignees.last_call().unwrap();
        assert_eq!(call.op, RelationOp::Add);
        assert_eq!(call.target_ids, vec![ResourceId::from("bob")]);
        assert_eq!(
            fixture.tasks.get(&1.into()).unwrap().relation_ids("assignees"),
            vec![ResourceId::from("alice"), ResourceId::from("bob")]
        );
    }

    #[tokio::test]
    async fn test_replace_to_many_with_empty_array() {
        let (fixture, registry) = setup();
        let controller = RelationshipsResourcePatch::new(registry);
        controller
            .handle(
                &JsonPath::parse("/tasks/1/relationships/assignees").unwrap(),
                &QueryParams::new(),
                Some(&RequestBody::multiple(Vec::new())),
            )
            .await
            .unwrap();

        let call = fixture.task_assignees.last_call().unwrap();
        assert_eq!(call.op, RelationOp::SetMany);
        assert!(call.target_ids.is_empty());
    }

    #[tokio::test]
    async fn test_remove_to_one_clears() {
        let (fixture, registry) = setup();
        let controller = RelationshipsResourceDelete::new(registry);
        controller
            .handle(
                &JsonPath::parse("/tasks/1/relationships/project").unwrap(),
                &QueryParams::new(),
                Some(&RequestBody::single(project("2"))),
            )
            .await
            .unwrap();

        let call = fixture.task_project.last_call().unwrap();
        assert_eq!(call.op, RelationOp::Set);
        assert!(call.target_ids.is_empty());
        assert!(fixture.tasks.get(&1.into()).unwrap().relation("project").is_none());
    }

    #[tokio::test]
    async fn test_replace_to_one_with_null() {
        let (fixture, registry) = setup();
        let controller = RelationshipsResourcePatch::new(registry);
        let body: RequestBody = serde_json::from_str(r#"{"data": null}"#).unwrap();
        controller
            .handle(&JsonPath::parse("/tasks/1/relationships/project").unwrap(), &QueryParams::new(), Some(&body))
            .await
            .unwrap();
        assert!(fixture.task_project.last_call().unwrap().target_ids.is_empty());
    }

    #[tokio::test]
    async fn test_cardinality_contract() {
        let (fixture, registry) = setup();
        let controller = RelationshipsResourcePatch::new(registry);
        let params = QueryParams::new();

        let err = controller
            .handle(
                &JsonPath::parse("/tasks/1/relationships/project").unwrap(),
                &params,
                Some(&RequestBody::multiple(vec![project("5")])),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Multiple data in body"));

        let err = controller
            .handle(
                &JsonPath::parse("/tasks/1/relationships/assignees").unwrap(),
                &params,
                Some(&RequestBody::single(user("bob"))),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Non-multiple data in body"));

        assert!(fixture.task_project.calls().is_empty());
        assert!(fixture.task_assignees.calls().is_empty());
    }

    #[tokio::test]
    async fn test_validation_before_mutation() {
        let (fixture, registry) = setup();
        let controller = RelationshipsResourcePost::new(registry);
        let params = QueryParams::new();
        let path = JsonPath::parse("/tasks/1/relationships/assignees").unwrap();

        let err = controller
            .handle(&path, &params, Some(&RequestBody::multiple(vec![user("bob"), project("5")])))
            .await
            .unwrap_err();
        assert!(matches!(err, HeronError::TypeMismatch { .. }));

        let err = controller
            .handle(&path, &params, Some(&RequestBody::multiple(vec![DataBody::new("users")])))
            .await
            .unwrap_err();
        assert!(matches!(err, HeronError::RequestBody { .. }));

        let err = controller.handle(&path, &params, None).await.unwrap_err();
        assert!(matches!(err, HeronError::RequestBody { .. }));

        let err = controller
            .handle(
                &JsonPath::parse("/tasks/1/relationships/owner").unwrap(),
                &params,
                Some(&RequestBody::multiple(vec![user("bob")])),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HeronError::NotFound { .. }));

        assert!(fixture.task_assignees.calls().is_empty());
    }
}
