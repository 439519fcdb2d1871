//! Controllers for `/type` and `/type/id` paths.

use super::support::{
    apply_attributes, apply_relations, compatible_entry, endpoint_entry, path_id, path_ids,
    resolve_relations, single_data, with_repository_info,
};
use crate::Controller;
use async_trait::async_trait;
use heron_core::{
    HeronError, HeronResult, JsonPath, Payload, RequestBody, Resource, ResourceList, Response,
};
use heron_query::QueryParams;
use heron_registry::ResourceRegistry;
use http::{Method, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// `GET /type/id`: one resource.
#[derive(Debug, Clone)]
pub struct ResourceGet {
    registry: Arc<ResourceRegistry>,
}

impl ResourceGet {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Controller for ResourceGet {
    fn name(&self) -> &'static str {
        "resource-get"
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        method == Method::GET && path.is_resource() && !path.is_collection()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let entry = endpoint_entry(&self.registry, path)?;
        let id = path_id(entry, path)?;
        let repository = entry.resource_repository();

        let resource = repository
            .find_one(&id, params)
            .await?
            .ok_or_else(|| HeronError::not_found_resource(entry.type_name(), id.to_string()))?;

        Ok(with_repository_info(
            Response::new(StatusCode::OK, Payload::Resource(Some(resource))),
            repository.as_ref(),
            Some(&id),
            params,
        ))
    }
}

/// `GET /type` and `GET /type/id,id`: a collection.
///
/// The list's own meta takes precedence over the repository's meta
/// capability.
#[derive(Debug, Clone)]
pub struct CollectionGet {
    registry: Arc<ResourceRegistry>,
}

impl CollectionGet {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Controller for CollectionGet {
    fn name(&self) -> &'static str {
        "collection-get"
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        method == Method::GET && path.is_collection()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let entry = endpoint_entry(&self.registry, path)?;
        let repository = entry.resource_repository();

        let ResourceList { items, meta } = if path.ids().is_some() {
            let ids = path_ids(entry, path)?;
            repository.find_all_by_ids(&ids, params).await?
        } else {
            repository.find_all(params).await?
        };

        let response = with_repository_info(
            Response::new(StatusCode::OK, Payload::Collection(items)),
            repository.as_ref(),
            None,
            params,
        );
        Ok(match meta {
            Some(meta) => response.with_meta(Some(meta)),
            None => response,
        })
    }
}

/// `POST /type`: creates a resource.
///
/// The body type must be the endpoint type or a registered subtype. Declared
/// attributes are copied, relationships are resolved to loaded targets before
/// `save`, and the saved resource is re-read by id for the response.
#[derive(Debug, Clone)]
pub struct ResourcePost {
    registry: Arc<ResourceRegistry>,
}

impl ResourcePost {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Controller for ResourcePost {
    fn name(&self) -> &'static str {
        "resource-post"
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        method == Method::POST && path.is_collection() && path.ids().is_none()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let method = Method::POST;
        let endpoint = endpoint_entry(&self.registry, path)?;
        let data = single_data(&method, endpoint, body)?;
        let body_entry = compatible_entry(&self.registry, endpoint, &data.resource_type)?;

        let mut resource = Resource::new(body_entry.kind().clone());
        if let Some(raw) = &data.id {
            resource.set_id(body_entry.descriptor().id_type().parse(body_entry.type_name(), raw)?);
        }
        apply_attributes(&method, body_entry, data, &mut resource)?;
        let relations = resolve_relations(&method, &self.registry, body_entry, data, params).await?;
        apply_relations(&mut resource, relations);

        let repository = endpoint.resource_repository();
        let saved = repository.save(resource).await?;
        let id = saved.id().cloned().ok_or_else(|| {
            HeronError::internal(format!("{} repository saved a resource without an id", endpoint.type_name()))
        })?;
        debug!(resource_type = endpoint.type_name(), resource_id = %id, "Created resource");

        let refetched = repository.find_one(&id, params).await?;
        Ok(with_repository_info(
            Response::new(StatusCode::CREATED, Payload::Resource(refetched)),
            repository.as_ref(),
            None,
            params,
        ))
    }
}

/// `PATCH /type/id`: updates a resource.
///
/// Only attributes and relationships present in the body change.
#[derive(Debug, Clone)]
pub struct ResourcePatch {
    registry: Arc<ResourceRegistry>,
}

impl ResourcePatch {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Controller for ResourcePatch {
    fn name(&self) -> &'static str {
        "resource-patch"
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        method == Method::PATCH && path.is_resource() && !path.is_collection()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let method = Method::PATCH;
        let endpoint = endpoint_entry(&self.registry, path)?;
        let id = path_id(endpoint, path)?;
        let data = single_data(&method, endpoint, body)?;
        let body_entry = compatible_entry(&self.registry, endpoint, &data.resource_type)?;
        if let Some(raw) = data.id.as_deref() {
            let body_id = endpoint.descriptor().id_type().parse(endpoint.type_name(), raw)?;
            if body_id != id {
                return Err(HeronError::request_body(
                    method.as_str(),
                    endpoint.type_name(),
                    "Id in body does not match the path",
                ));
            }
        }

        let repository = endpoint.resource_repository();
        let mut resource = repository
            .find_one(&id, params)
            .await?
            .ok_or_else(|| HeronError::not_found_resource(endpoint.type_name(), id.to_string()))?;
        apply_attributes(&method, body_entry, data, &mut resource)?;
        let relations = resolve_relations(&method, &self.registry, body_entry, data, params).await?;
        apply_relations(&mut resource, relations);

        repository.save(resource).await?;
        debug!(resource_type = endpoint.type_name(), resource_id = %id, "Updated resource");

        let refetched = repository.find_one(&id, params).await?;
        Ok(with_repository_info(
            Response::new(StatusCode::OK, Payload::Resource(refetched)),
            repository.as_ref(),
            Some(&id),
            params,
        ))
    }
}

/// `DELETE /type/id[,id]`: deletes resources.
#[derive(Debug, Clone)]
pub struct ResourceDelete {
    registry: Arc<ResourceRegistry>,
}

impl ResourceDelete {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Controller for ResourceDelete {
    fn name(&self) -> &'static str {
        "resource-delete"
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        method == Method::DELETE && path.is_resource()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        _params: &QueryParams,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let entry = endpoint_entry(&self.registry, path)?;
        let ids = path_ids(entry, path)?;
        let repository = entry.resource_repository();
        for id in &ids {
            repository.delete(id).await?;
            debug!(resource_type = entry.type_name(), resource_id = %id, "Deleted resource");
        }
        Ok(Response::no_content())
    }
}
