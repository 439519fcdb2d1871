//! The `Heron` entry point.

use heron_config::HeronConfig;
use heron_core::{HeronError, HeronResult, JsonPath, RequestBody, RequestId, ResourceKind};
use heron_dispatch::{Controller, RequestDispatcher};
use heron_query::QueryParams;
use heron_registry::{ResourceRegistration, ResourceRegistry};
use heron_telemetry::TelemetryResult;
use http::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// A configured registry and dispatcher.
///
/// # Example
///
/// ```rust,ignore
/// use heron::prelude::*;
///
/// let heron = Heron::builder()
///     .config(HeronConfig::production())
///     .register(ResourceRegistration::new(task_descriptor, tasks))
///     .build()?;
///
/// let response = heron.handle("GET", "/tasks/1", "include[Task]=project", None).await;
/// assert_eq!(response.status, StatusCode::OK);
/// ```
#[derive(Debug)]
pub struct Heron {
    config: HeronConfig,
    dispatcher: RequestDispatcher,
}

impl Heron {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn builder() -> HeronBuilder {
        HeronBuilder::new()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HeronConfig {
        &self.config
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        self.dispatcher.registry()
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Installs the global log subscriber described by the configuration.
    pub fn init_logging(&self) -> TelemetryResult<()> {
        heron_telemetry::init_logging(&self.config.log_config())
    }

    /// Handles a request given as strings.
    ///
    /// `query` is the raw query string, with or without a leading `?`.
    /// `body` is the JSON request body, if any. Failures are rendered as a
    /// JSON:API `errors` document with the matching status.
    pub async fn handle(
        &self,
        method: &str,
        path: &str,
        query: &str,
        body: Option<&str>,
    ) -> HeronResponse {
        let request_id = RequestId::new();
        match self.try_handle(request_id, method, path, query, body).await {
            Ok(response) => response,
            Err(err) => HeronResponse::error(&err, request_id),
        }
    }

    async fn try_handle(
        &self,
        request_id: RequestId,
        method: &str,
        path: &str,
        query: &str,
        body: Option<&str>,
    ) -> HeronResult<HeronResponse> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| HeronError::method_not_allowed(method, path))?;
        let path = JsonPath::parse(path)?;
        let params = QueryParams::from_query_string(query.trim_start_matches('?'))?;
        let body = body
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                serde_json::from_str::<RequestBody>(raw).map_err(|e| {
                    HeronError::request_body(
                        method.as_str(),
                        path.resource_name(),
                        format!("Malformed body: {e}"),
                    )
                })
            })
            .transpose()?;

        let response = self
            .dispatcher
            .dispatch_with_id(request_id, &path, &method, &params, body.as_ref())
            .await?;
        Ok(HeronResponse {
            status: response.status,
            body: response.to_json(),
            request_id,
        })
    }
}

/// Status and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct HeronResponse {
    /// Response status.
    pub status: StatusCode,
    /// JSON body, `None` for `204 No Content`.
    pub body: Option<Value>,
    /// Id of the request.
    pub request_id: RequestId,
}

impl HeronResponse {
    fn error(err: &HeronError, request_id: RequestId) -> Self {
        let envelope = err.to_envelope(Some(&request_id.to_string()));
        Self {
            status: err.status_code(),
            body: serde_json::to_value(envelope).ok(),
            request_id,
        }
    }

    /// Returns `true` for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the `errors[0].detail` message of an error response.
    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.body.as_ref()?.pointer("/errors/0/detail")?.as_str()
    }
}

/// Builder for [`Heron`].
#[derive(Default)]
pub struct HeronBuilder {
    config: HeronConfig,
    registrations: Vec<ResourceRegistration>,
    subtypes: Vec<(ResourceKind, ResourceKind)>,
    controllers: Vec<Arc<dyn Controller>>,
}

impl HeronBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: HeronConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers one resource type.
    #[must_use]
    pub fn register(mut self, registration: ResourceRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Registers several resource types.
    #[must_use]
    pub fn registrations(mut self, registrations: impl IntoIterator<Item = ResourceRegistration>) -> Self {
        self.registrations.extend(registrations);
        self
    }

    /// Declares `child` as a subtype of the registered `parent`.
    #[must_use]
    pub fn subtype(mut self, child: impl Into<ResourceKind>, parent: impl Into<ResourceKind>) -> Self {
        self.subtypes.push((child.into(), parent.into()));
        self
    }

    /// Adds a controller tried before the built-in ones.
    #[must_use]
    pub fn controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controllers.push(controller);
        self
    }

    /// Validates the configuration and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns `HeronError::Registration` for an invalid configuration or a
    /// registration that breaks a registry invariant.
    pub fn build(self) -> HeronResult<Heron> {
        self.config
            .validate()
            .map_err(|e| HeronError::registration(e.to_string()))?;

        let mut builder = ResourceRegistry::builder(self.config.service.base_url.clone());
        for registration in self.registrations {
            builder = builder.register(registration);
        }
        for (child, parent) in self.subtypes {
            builder = builder.subtype(child, parent);
        }
        let registry = Arc::new(builder.build()?);

        let max_depth = self.config.inclusion.max_depth;
        let mut controllers = self.controllers;
        controllers.extend(heron_dispatch::default_controllers(&registry));
        let dispatcher = RequestDispatcher::with_controllers(Arc::clone(&registry), controllers, max_depth);

        info!(
            resources = registry.len(),
            base_url = registry.service_url(),
            max_depth,
            "Heron ready"
        );
        debug!(dispatcher = ?dispatcher, "Controllers registered");
        Ok(Heron {
            config: self.config,
            dispatcher,
        })
    }
}

impl std::fmt::Debug for HeronBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeronBuilder")
            .field("config", &self.config)
            .field("registrations", &self.registrations.len())
            .field("subtypes", &self.subtypes)
            .field("controllers", &self.controllers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_config::ConfigLoader;
    use heron_test::fixtures::Fixture;

    fn heron(fixture: &Fixture) -> Heron {
        Heron::builder()
            .registrations(fixture.registrations())
            .subtype("UrgentTask", "Task")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_handle_get() {
        let fixture = Fixture::new();
        let response = heron(&fixture).handle("GET", "/tasks/1", "", None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.is_success());
        assert_eq!(response.body.unwrap()["data"]["attributes"]["name"], "write docs");
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let fixture = Fixture::new();
        let response = heron(&fixture).handle("GET", "/tasks/99", "", None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        let body = response.body.clone().unwrap();
        assert_eq!(body["errors"][0]["code"], "NOT_FOUND");
        assert_eq!(body["meta"]["request_id"], response.request_id.to_string());
    }

    #[tokio::test]
    async fn test_boundary_errors() {
        let fixture = Fixture::new();
        let heron = heron(&fixture);

        let response = heron.handle("GET", "/tasks/1", "fields[Task][a][b]=x", None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        let response = heron.handle("POST", "/tasks", "", Some("{not json")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.error_detail().unwrap().contains("Malformed body"));

        let response = heron.handle("GET", "/", "", None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let response = heron.handle("PUT", "/tasks/1", "", None).await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_config_base_url() {
        let fixture = Fixture::new();
        let config = ConfigLoader::new()
            .with_string("[service]\nbase_url = \"https://api.example.com\"", "toml")
            .unwrap()
            .load()
            .unwrap();
        let heron = Heron::builder()
            .config(config)
            .registrations(fixture.registrations())
            .build()
            .unwrap();

        let body = heron.handle("GET", "/tasks/1", "", None).await.body.unwrap();
        assert_eq!(body["data"]["links"]["self"], "https://api.example.com/tasks/1");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = HeronConfig::default();
        config.inclusion.max_depth = 0;
        let err = Heron::builder().config(config).build().unwrap_err();
        assert!(matches!(err, HeronError::Registration { .. }));
    }
}
