//! Built-in controllers.
//!
//! | Controller | Method | Path |
//! |------------|--------|------|
//! | [`ResourceGet`] | `GET` | `/type/id` |
//! | [`CollectionGet`] | `GET` | `/type`, `/type/id,id` |
//! | [`ResourcePost`] | `POST` | `/type` |
//! | [`ResourcePatch`] | `PATCH` | `/type/id` |
//! | [`ResourceDelete`] | `DELETE` | `/type/id[,id]` |
//! | [`FieldResourceGet`] | `GET` | `/type/id/field` |
//! | [`RelationshipsResourceGet`] | `GET` | `/type/id/relationships/field` |
//! | [`RelationshipsResourcePost`] | `POST` | `/type/id/relationships/field` |
//! | [`RelationshipsResourcePatch`] | `PATCH` | `/type/id/relationships/field` |
//! | [`RelationshipsResourceDelete`] | `DELETE` | `/type/id/relationships/field` |

mod field;
mod relationships;
mod resource;
mod support;

pub use field::FieldResourceGet;
pub use relationships::{
    AddRelationships, RelationshipVerb, RelationshipsResourceDelete, RelationshipsResourceGet,
    RelationshipsResourcePatch, RelationshipsResourcePost, RelationshipsResourceUpsert,
    RemoveRelationships, ReplaceRelationships,
};
pub use resource::{CollectionGet, ResourceDelete, ResourceGet, ResourcePatch, ResourcePost};

use crate::Controller;
use heron_registry::ResourceRegistry;
use std::sync::Arc;

/// Returns the built-in controllers in dispatch order.
#[must_use]
pub fn default_controllers(registry: &Arc<ResourceRegistry>) -> Vec<Arc<dyn Controller>> {
    vec![
        Arc::new(ResourceGet::new(Arc::clone(registry))),
        Arc::new(CollectionGet::new(Arc::clone(registry))),
        Arc::new(ResourcePost::new(Arc::clone(registry))),
        Arc::new(ResourcePatch::new(Arc::clone(registry))),
        Arc::new(ResourceDelete::new(Arc::clone(registry))),
        Arc::new(FieldResourceGet::new(Arc::clone(registry))),
        Arc::new(RelationshipsResourceGet::new(Arc::clone(registry))),
        Arc::new(RelationshipsResourcePost::new(Arc::clone(registry))),
        Arc::new(RelationshipsResourcePatch::new(Arc::clone(registry))),
        Arc::new(RelationshipsResourceDelete::new(Arc::clone(registry))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::JsonPath;
    use heron_test::fixtures;
    use http::Method;

    fn accepting(path: &str, method: &Method) -> Vec<&'static str> {
        let path = JsonPath::parse(path).unwrap();
        default_controllers(&fixtures::registry())
            .iter()
            .filter(|controller| controller.is_acceptable(&path, method))
            .map(|controller| controller.name())
            .collect()
    }

    #[test]
    fn test_exactly_one_controller_per_shape() {
        let cases = [
            ("/tasks/1", Method::GET, "resource-get"),
            ("/tasks/1,3", Method::GET, "collection-get"),
            ("/tasks", Method::GET, "collection-get"),
            ("/tasks", Method::POST, "resource-post"),
            ("/tasks/1", Method::PATCH, "resource-patch"),
            ("/tasks/1,3", Method::DELETE, "resource-delete"),
            ("/tasks/1/project", Method::GET, "field-resource-get"),
            ("/tasks/1/relationships/project", Method::GET, "relationships-resource-get"),
            ("/tasks/1/relationships/assignees", Method::POST, "relationships-resource-post"),
            ("/tasks/1/relationships/assignees", Method::PATCH, "relationships-resource-patch"),
            ("/tasks/1/relationships/assignees", Method::DELETE, "relationships-resource-delete"),
        ];
        for (path, method, name) in cases {
            assert_eq!(accepting(path, &method), vec![name], "{method} {path}");
        }
    }

    #[test]
    fn test_unsupported_shapes() {
        assert!(accepting("/tasks/1", &Method::POST).is_empty());
        assert!(accepting("/tasks", &Method::PATCH).is_empty());
        assert!(accepting("/tasks/1/project", &Method::PATCH).is_empty());
    }
}
