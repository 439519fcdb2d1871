//! Validation and body handling shared by the controllers.

use heron_core::{
    AttributeValue, BodyData, Cardinality, DataBody, HeronError, HeronResult, JsonPath, Linkage,
    Links, Meta, PathElement, RelationValue, RelationshipBody, RequestBody, Resource, ResourceId,
    ResourceIdentifier, ResourceList, ResourceRepository, Response,
};
use heron_query::QueryParams;
use heron_registry::{RegistryEntry, ResourceRegistry};
use http::Method;
use std::sync::Arc;
use tracing::trace;

pub(crate) const NO_BODY: &str = "No body provided";
pub(crate) const NO_DATA: &str = "No data field in the body";
pub(crate) const MULTIPLE_DATA: &str = "Multiple data in body";
pub(crate) const NON_MULTIPLE_DATA: &str = "Non-multiple data in body";

/// Resolves the entry addressed by the path's resource name.
pub(crate) fn endpoint_entry<'r>(
    registry: &'r ResourceRegistry,
    path: &JsonPath,
) -> HeronResult<&'r Arc<RegistryEntry>> {
    registry.entry_by_type(path.resource_name())
}

/// Parses every id in the path with the entry's id type.
pub(crate) fn path_ids(entry: &RegistryEntry, path: &JsonPath) -> HeronResult<Vec<ResourceId>> {
    let raw = path
        .ids()
        .ok_or_else(|| HeronError::not_found(format!("Invalid path: {path}")))?;
    entry
        .descriptor()
        .id_type()
        .parse_all(entry.type_name(), raw.iter().map(String::as_str))
}

/// Parses the first id in the path.
pub(crate) fn path_id(entry: &RegistryEntry, path: &JsonPath) -> HeronResult<ResourceId> {
    path_ids(entry, path)?
        .into_iter()
        .next()
        .ok_or_else(|| HeronError::not_found(format!("Invalid path: {path}")))
}

/// Returns the body, failing when it is absent.
pub(crate) fn require_body<'b>(
    method: &Method,
    entry: &RegistryEntry,
    body: Option<&'b RequestBody>,
) -> HeronResult<&'b RequestBody> {
    body.ok_or_else(|| HeronError::request_body(method.as_str(), entry.type_name(), NO_BODY))
}

/// Returns the single resource object of a body.
pub(crate) fn single_data<'b>(
    method: &Method,
    entry: &RegistryEntry,
    body: Option<&'b RequestBody>,
) -> HeronResult<&'b DataBody> {
    let body = require_body(method, entry, body)?;
    let error = |message: &str| HeronError::request_body(method.as_str(), entry.type_name(), message);
    match &body.data {
        Some(BodyData::Multiple(_)) => Err(error(MULTIPLE_DATA)),
        Some(BodyData::Single(Some(data))) => Ok(data),
        Some(BodyData::Single(None)) | None => Err(error(NO_DATA)),
    }
}

/// Resolves the entry of a body type, which must be `expected` or one of its
/// registered subtypes.
pub(crate) fn compatible_entry<'r>(
    registry: &'r ResourceRegistry,
    expected: &RegistryEntry,
    body_type: &str,
) -> HeronResult<&'r Arc<RegistryEntry>> {
    let mismatch = || HeronError::type_mismatch(expected.type_name(), body_type);
    let entry = registry.find_by_type(body_type).ok_or_else(mismatch)?;
    if entry.kind() == expected.kind() || entry.has_ancestor(expected) {
        Ok(entry)
    } else {
        Err(mismatch())
    }
}

/// Copies declared attributes from `data` onto `resource`.
///
/// Unknown attribute names are skipped. A value the declared type rejects
/// fails the request before anything is written.
pub(crate) fn apply_attributes(
    method: &Method,
    entry: &RegistryEntry,
    data: &DataBody,
    resource: &mut Resource,
) -> HeronResult<()> {
    let descriptor = entry.descriptor();
    let mut values = Vec::with_capacity(data.attributes.len());
    for (name, raw) in &data.attributes {
        let Some(field) = descriptor.attribute(name) else {
            trace!(resource_type = entry.type_name(), field = %name, "Ignoring unknown attribute");
            continue;
        };
        let value = AttributeValue::from(raw.clone());
        if !field.value_type.accepts(&value) {
            return Err(HeronError::request_body(
                method.as_str(),
                entry.type_name(),
                format!("Attribute '{name}' expects {:?}", field.value_type),
            ));
        }
        values.push((name.clone(), value));
    }
    for (name, value) in values {
        resource.set_attribute(name, value);
    }
    Ok(())
}

/// Parses a relationship identifier against the target entry.
pub(crate) fn target_id(
    registry: &ResourceRegistry,
    target: &RegistryEntry,
    identifier: &ResourceIdentifier,
) -> HeronResult<ResourceId> {
    let entry = compatible_entry(registry, target, &identifier.resource_type)?;
    entry
        .descriptor()
        .id_type()
        .parse(entry.type_name(), &identifier.id)
}

/// Resolves every relationship of `data` to loaded target resources.
///
/// Targets are fetched through the target's resource repository; a to-one id
/// that does not resolve is `NotFound`. A `None` value clears the relation.
pub(crate) async fn resolve_relations(
    method: &Method,
    registry: &ResourceRegistry,
    entry: &RegistryEntry,
    data: &DataBody,
    params: &QueryParams,
) -> HeronResult<Vec<(String, Option<RelationValue>)>> {
    let descriptor = entry.descriptor();
    let mut resolved = Vec::with_capacity(data.relationships.len());
    for (name, RelationshipBody { data: linkage }) in &data.relationships {
        let field = descriptor
            .relationship(name)
            .ok_or_else(|| HeronError::field_not_found(entry.type_name(), name))?;
        let target = registry.entry_for_kind(&field.target)?;
        let repository = target.resource_repository();

        let value = match (field.cardinality, linkage) {
            (Cardinality::ToOne, None) => None,
            (Cardinality::ToOne, Some(Linkage::One(identifier))) => {
                let id = target_id(registry, target, identifier)?;
                let found = repository.find_one(&id, params).await?.ok_or_else(|| {
                    HeronError::not_found_resource(target.type_name(), id.to_string())
                })?;
                Some(RelationValue::One(Box::new(found)))
            }
            (Cardinality::ToMany, None) => Some(RelationValue::Many(Vec::new())),
            (Cardinality::ToMany, Some(Linkage::Many(identifiers))) => {
                let ids = identifiers
                    .iter()
                    .map(|identifier| target_id(registry, target, identifier))
                    .collect::<HeronResult<Vec<_>>>()?;
                let found = repository.find_all_by_ids(&ids, params).await?;
                Some(RelationValue::Many(found.items))
            }
            (Cardinality::ToOne, Some(Linkage::Many(_))) => {
                return Err(HeronError::request_body(
                    method.as_str(),
                    entry.type_name(),
                    format!("Multiple data in relationship '{name}'"),
                ));
            }
            (Cardinality::ToMany, Some(Linkage::One(_))) => {
                return Err(HeronError::request_body(
                    method.as_str(),
                    entry.type_name(),
                    format!("Non-multiple data in relationship '{name}'"),
                ));
            }
        };
        resolved.push((name.clone(), value));
    }
    Ok(resolved)
}

/// Attaches resolved relations to `resource`.
pub(crate) fn apply_relations(resource: &mut Resource, relations: Vec<(String, Option<RelationValue>)>) {
    for (name, value) in relations {
        match value {
            Some(value) => resource.set_relation(name, value),
            None => {
                resource.clear_relation(&name);
            }
        }
    }
}

/// Returns the meta and links a repository contributes for `resources`.
pub(crate) fn meta_and_links(
    repository: &dyn ResourceRepository,
    root: Option<&ResourceId>,
    resources: &[Resource],
    params: &QueryParams,
) -> (Option<Meta>, Option<Links>) {
    let meta = repository
        .meta_capability()
        .and_then(|capability| capability.meta(root, resources, params));
    let links = repository
        .links_capability()
        .and_then(|capability| capability.links(resources, params));
    (meta, links)
}

/// Decorates a response with repository meta and links over its primary data.
pub(crate) fn with_repository_info(
    response: Response,
    repository: &dyn ResourceRepository,
    root: Option<&ResourceId>,
    params: &QueryParams,
) -> Response {
    let (meta, links) = meta_and_links(repository, root, response.payload.resources(), params);
    response.with_meta(meta).with_links(links)
}

/// Related resources read through a relationship repository.
pub(crate) enum Related {
    One(Option<Resource>),
    Many(ResourceList),
}

/// Resolves the relationship field addressed by `path` and reads its
/// targets for the owning resource.
pub(crate) async fn fetch_related(
    registry: &ResourceRegistry,
    path: &JsonPath,
    params: &QueryParams,
) -> HeronResult<Related> {
    let entry = endpoint_entry(registry, path)?;
    let id = path_id(entry, path)?;
    let name = path
        .element()
        .map(PathElement::field)
        .ok_or_else(|| HeronError::not_found(format!("Invalid path: {path}")))?;
    let field = entry
        .descriptor()
        .relationship(name)
        .ok_or_else(|| HeronError::field_not_found(entry.type_name(), name))?;
    let repository = registry.relationship_repository_for(entry, &field.target)?;

    Ok(match field.cardinality {
        Cardinality::ToOne => Related::One(repository.find_one_target(&id, name, params).await?),
        Cardinality::ToMany => Related::Many(repository.find_many_targets(&id, name, params).await?),
    })
}
