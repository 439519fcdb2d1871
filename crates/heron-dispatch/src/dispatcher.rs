//! Request dispatch.
//!
//! The [`RequestDispatcher`] is the single entry point of the core. For each
//! request it:
//!
//! 1. picks the first controller whose `is_acceptable` returns `true`,
//! 2. runs it,
//! 3. resolves included resources for the primary data,
//! 4. renders the response document.
//!
//! Every dispatch runs inside a `dispatch` span carrying the request id.

use crate::controllers::default_controllers;
use crate::include::{IncludeResolver, DEFAULT_MAX_DEPTH};
use crate::Controller;
use heron_core::{HeronError, HeronResult, JsonPath, Payload, RequestBody, RequestId};
use heron_document::{Document, DocumentSerializer};
use heron_query::QueryParams;
use heron_registry::ResourceRegistry;
use http::{Method, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Rendered outcome of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response document, `None` for `204 No Content`.
    pub document: Option<Document>,
    /// Id of the request.
    pub request_id: RequestId,
}

impl DispatchResponse {
    /// Renders the document as JSON, or `None` when there is no body.
    #[must_use]
    pub fn to_json(&self) -> Option<serde_json::Value> {
        self.document.as_ref().map(Document::to_value)
    }
}

/// Routes requests to controllers and assembles response documents.
pub struct RequestDispatcher {
    registry: Arc<ResourceRegistry>,
    controllers: Vec<Arc<dyn Controller>>,
    serializer: DocumentSerializer,
    includes: IncludeResolver,
}

impl RequestDispatcher {
    /// Creates a dispatcher with the built-in controllers.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self::with_max_depth(registry, DEFAULT_MAX_DEPTH)
    }

    /// Creates a dispatcher with the built-in controllers and a custom
    /// default-inclusion depth cap.
    #[must_use]
    pub fn with_max_depth(registry: Arc<ResourceRegistry>, max_depth: usize) -> Self {
        let controllers = default_controllers(&registry);
        Self::with_controllers(registry, controllers, max_depth)
    }

    /// Creates a dispatcher with an explicit controller list, tried in order.
    #[must_use]
    pub fn with_controllers(
        registry: Arc<ResourceRegistry>,
        controllers: Vec<Arc<dyn Controller>>,
        max_depth: usize,
    ) -> Self {
        Self {
            serializer: DocumentSerializer::new(Arc::clone(&registry)),
            includes: IncludeResolver::new(Arc::clone(&registry), max_depth),
            registry,
            controllers,
        }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Returns the controller names in dispatch order.
    pub fn controller_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.controllers.iter().map(|controller| controller.name())
    }

    /// Dispatches a request under a fresh request id.
    pub async fn dispatch(
        &self,
        path: &JsonPath,
        method: &Method,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> HeronResult<DispatchResponse> {
        self.dispatch_with_id(RequestId::new(), path, method, params, body)
            .await
    }

    /// Dispatches a request under the given request id.
    ///
    /// Fails with `MethodNotAllowed` when no controller accepts the request.
    /// Controller and repository errors are returned unchanged.
    pub async fn dispatch_with_id(
        &self,
        request_id: RequestId,
        path: &JsonPath,
        method: &Method,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> HeronResult<DispatchResponse> {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request_id,
            method = %method,
            path = %path,
        );

        async move {
            let start = Instant::now();
            let result = self.run(path, method, params, body).await;
            let duration = start.elapsed();
            match result {
                Ok((status, document)) => {
                    info!(
                        status = status.as_u16(),
                        duration_ms = %duration.as_millis(),
                        "request completed"
                    );
                    Ok(DispatchResponse {
                        status,
                        document,
                        request_id,
                    })
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        error_code = err.error_code(),
                        duration_ms = %duration.as_millis(),
                        "request failed"
                    );
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        path: &JsonPath,
        method: &Method,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> HeronResult<(StatusCode, Option<Document>)> {
        let controller = self
            .controllers
            .iter()
            .find(|controller| controller.is_acceptable(path, method))
            .ok_or_else(|| HeronError::method_not_allowed(method.as_str(), path.to_string()))?;
        debug!(controller = controller.name(), "Controller selected");

        let mut response = controller.handle(path, params, body).await?;
        let included = match &mut response.payload {
            Payload::Resource(Some(resource)) => {
                self.includes
                    .resolve(std::slice::from_mut(resource), params)
                    .await
            }
            Payload::Collection(resources) => self.includes.resolve(resources, params).await,
            _ => Vec::new(),
        };

        let document = self.serializer.serialize(&response, &included, params)?;
        Ok((response.status, document))
    }
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("controllers", &self.controller_names().collect::<Vec<_>>())
            .field("max_depth", &self.includes.max_depth())
            .finish_non_exhaustive()
    }
}
