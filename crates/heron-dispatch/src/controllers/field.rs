//! Controller for `/type/id/field` paths.

use super::support::{fetch_related, Related};
use crate::Controller;
use async_trait::async_trait;
use heron_core::{HeronResult, JsonPath, Payload, RequestBody, Response};
use heron_query::QueryParams;
use heron_registry::ResourceRegistry;
use http::{Method, StatusCode};
use std::sync::Arc;

/// `GET /type/id/field`: the related resource(s) as primary data.
#[derive(Debug, Clone)]
pub struct FieldResourceGet {
    registry: Arc<ResourceRegistry>,
}

impl FieldResourceGet {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Controller for FieldResourceGet {
    fn name(&self) -> &'static str {
        "field-resource-get"
    }

    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
        method == Method::GET && path.is_field() && path.has_single_id()
    }

    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        Ok(match fetch_related(&self.registry, path, params).await? {
            Related::One(target) => Response::new(StatusCode::OK, Payload::Resource(target)),
            Related::Many(list) => {
                Response::new(StatusCode::OK, Payload::Collection(list.items)).with_meta(list.meta)
            }
        })
    }
}
