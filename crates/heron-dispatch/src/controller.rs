//! Controller trait.
//!
//! A [`Controller`] handles one (method, path shape) pair. The dispatcher
//! asks each controller in turn whether it accepts a request and hands the
//! request to the first one that does.

use async_trait::async_trait;
use heron_core::{HeronResult, JsonPath, RequestBody, Response};
use heron_query::QueryParams;
use http::Method;

/// A request controller.
///
/// # Invariants
///
/// - `handle` validates everything it needs (ids, types, body shape,
///   relationship fields) before the first repository mutation.
/// - Repository errors are returned unchanged.
///
/// # Example
///
/// ```rust,ignore
/// struct Ping;
///
/// #[async_trait]
/// impl Controller for Ping {
///     fn name(&self) -> &'static str {
///         "ping"
///     }
///
///     fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool {
///         path.resource_name() == "ping" && method == Method::GET
///     }
///
///     async fn handle(
///         &self,
///         _path: &JsonPath,
///         _params: &QueryParams,
///         _body: Option<&RequestBody>,
///     ) -> HeronResult<Response> {
///         Ok(Response::no_content())
///     }
/// }
/// ```
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    /// Returns the name of this controller, used in logs.
    fn name(&self) -> &'static str;

    /// Returns `true` if this controller handles `method` on `path`.
    fn is_acceptable(&self, path: &JsonPath, method: &Method) -> bool;

    /// Handles the request.
    async fn handle(
        &self,
        path: &JsonPath,
        params: &QueryParams,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response>;
}
