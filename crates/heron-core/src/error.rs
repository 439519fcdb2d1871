//! Error types for Heron.
//!
//! This module provides the [`HeronError`] type, the error returned by every
//! registry lookup, controller and repository call in the workspace.
//!
//! Errors are raised eagerly: a controller validates the path, the body and
//! the registry bindings before it touches a repository, so a request that
//! fails with anything but [`HeronError::Repository`] has not mutated state.
//!
//! | `ErrorCategory` | Status |
//! |---|---|
//! | `Validation` | 400 |
//! | `NotFound` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `Conflict` | 409 |
//! | `Internal` | 500 |

use heron_query::ParametersError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`HeronError`].
pub type HeronResult<T> = Result<T, HeronError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed request: body, identifiers or query parameters.
    Validation,
    /// Unknown resource type, field or identifier.
    NotFound,
    /// No controller accepts the path and method.
    MethodNotAllowed,
    /// Body type incompatible with the endpoint type.
    Conflict,
    /// Registration defects and repository failures.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Heron.
///
/// # Example
///
/// ```
/// use heron_core::{ErrorCategory, HeronError};
///
/// let err = HeronError::request_body("PATCH", "tasks", "Multiple data in body");
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// assert!(err.to_string().contains("Multiple data in body"));
/// ```
#[derive(Error, Debug)]
pub enum HeronError {
    /// Unknown resource type, relationship field or identifier.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The type of resource that was not found.
        resource_type: Option<String>,
        /// The identifier of the resource.
        resource_id: Option<String>,
    },

    /// Missing body, missing `data`, or single/multiple cardinality mismatch.
    #[error("Request body error ({method} {resource_type}): {message}")]
    RequestBody {
        /// Method of the request.
        method: String,
        /// Resource type addressed by the request.
        resource_type: String,
        /// Human-readable error message.
        message: String,
    },

    /// Body type is neither the endpoint type nor a registered subtype.
    #[error("Type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch {
        /// Endpoint resource type.
        expected: String,
        /// Type carried by the body.
        actual: String,
    },

    /// No relationship repository is bound for a target type.
    #[error("Relationship repository not found for {source_type} -> {target_type}")]
    RelationshipRepositoryNotFound {
        /// Owning resource kind.
        source_type: String,
        /// Target resource kind.
        target_type: String,
    },

    /// Malformed query parameters.
    #[error("Parameters deserialization error: {0}")]
    ParametersDeserialization(#[from] ParametersError),

    /// Identifier not parseable as the resource's id type.
    #[error("Invalid identifier '{value}' for {resource_type}: {message}")]
    InvalidIdentifier {
        /// Resource type of the identifier.
        resource_type: String,
        /// The raw identifier.
        value: String,
        /// Parse failure detail.
        message: String,
    },

    /// No controller accepts the request.
    #[error("Method not allowed: {method} {path}")]
    MethodNotAllowed {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// Registry construction violated an invariant.
    #[error("Registration error: {message}")]
    Registration {
        /// Human-readable error message.
        message: String,
    },

    /// A repository call failed.
    #[error("Repository error: {message}")]
    Repository {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl HeronError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
            resource_id: None,
        }
    }

    /// Creates a not found error with resource context.
    #[must_use]
    pub fn not_found_resource(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let resource_id = resource_id.into();
        Self::NotFound {
            message: format!("{resource_type} with ID '{resource_id}' not found"),
            resource_type: Some(resource_type),
            resource_id: Some(resource_id),
        }
    }

    /// Creates a not found error for an unknown resource type.
    #[must_use]
    pub fn resource_type_not_found(resource_type: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        Self::NotFound {
            message: format!("Resource type '{resource_type}' is not registered"),
            resource_type: Some(resource_type),
            resource_id: None,
        }
    }

    /// Creates a not found error for an unknown field of a resource.
    #[must_use]
    pub fn field_not_found(resource_type: impl Into<String>, field: impl AsRef<str>) -> Self {
        let resource_type = resource_type.into();
        Self::NotFound {
            message: format!(
                "Field '{}' not found on resource '{resource_type}'",
                field.as_ref()
            ),
            resource_type: Some(resource_type),
            resource_id: None,
        }
    }

    /// Creates a request body error.
    #[must_use]
    pub fn request_body(
        method: impl Into<String>,
        resource_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RequestBody {
            method: method.into(),
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a missing relationship repository error.
    #[must_use]
    pub fn relationship_repository_not_found(
        source_type: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self::RelationshipRepositoryNotFound {
            source_type: source_type.into(),
            target_type: target_type.into(),
        }
    }

    /// Creates an invalid identifier error.
    #[must_use]
    pub fn invalid_identifier(
        resource_type: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidIdentifier {
            resource_type: resource_type.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates a method not allowed error.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Creates a registration error.
    #[must_use]
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration {
            message: message.into(),
        }
    }

    /// Creates a repository error.
    #[must_use]
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a repository error with a source error.
    pub fn repository_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Repository {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::RequestBody { .. }
            | Self::ParametersDeserialization(_)
            | Self::InvalidIdentifier { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::TypeMismatch { .. } => ErrorCategory::Conflict,
            Self::RelationshipRepositoryNotFound { .. }
            | Self::Registration { .. }
            | Self::Repository { .. }
            | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to a JSON:API `errors` document.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            errors: vec![ErrorDetail {
                status: self.status_code().as_u16().to_string(),
                code: self.error_code().to_string(),
                title: self.category(),
                detail: self.to_string(),
                meta: self.error_details(),
            }],
            meta: request_id.map(|id| serde_json::json!({ "request_id": id })),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::RequestBody { .. } => "REQUEST_BODY_ERROR",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::RelationshipRepositoryNotFound { .. } => "RELATIONSHIP_REPOSITORY_NOT_FOUND",
            Self::ParametersDeserialization(_) => "PARAMETERS_DESERIALIZATION_ERROR",
            Self::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Registration { .. } => "REGISTRATION_ERROR",
            Self::Repository { .. } => "REPOSITORY_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound {
                resource_type: Some(rt),
                resource_id,
                ..
            } => Some(serde_json::json!({
                "resource_type": rt,
                "resource_id": resource_id
            })),
            Self::RequestBody {
                method,
                resource_type,
                ..
            } => Some(serde_json::json!({
                "method": method,
                "resource_type": resource_type
            })),
            Self::TypeMismatch { expected, actual } => Some(serde_json::json!({
                "expected": expected,
                "actual": actual
            })),
            _ => None,
        }
    }
}

/// Serializable JSON:API error document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error objects.
    pub errors: Vec<ErrorDetail>,
    /// Top-level meta, carrying the request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// One JSON:API error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// HTTP status code as a string.
    pub status: String,
    /// Machine-readable error code.
    pub code: String,
    /// Error category.
    pub title: ErrorCategory,
    /// Human-readable error message.
    pub detail: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_query::ParameterGroup;

    #[test]
    fn test_not_found_resource() {
        let error = HeronError::not_found_resource("tasks", "42");
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert!(error.to_string().contains("42"));
    }

    #[test]
    fn test_request_body_error() {
        let error = HeronError::request_body("POST", "tasks", "Non-multiple data in body");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().ends_with("Non-multiple data in body"));
    }

    #[test]
    fn test_type_mismatch_is_conflict() {
        let error = HeronError::type_mismatch("tasks", "projects");
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_parameters_error_conversion() {
        let error: HeronError =
            ParametersError::nesting_exceeded(ParameterGroup::Include, "include[Task][a]").into();
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.error_code(), "PARAMETERS_DESERIALIZATION_ERROR");
    }

    #[test]
    fn test_repository_error_keeps_source() {
        let error = HeronError::repository_with_source(
            "save failed",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_envelope_serialization() {
        let error = HeronError::not_found_resource("tasks", "7");
        let envelope = error.to_envelope(Some("req-456"));

        let json = serde_json::to_value(&envelope).expect("serialization should work");
        assert_eq!(json["errors"][0]["status"], "404");
        assert_eq!(json["errors"][0]["code"], "NOT_FOUND");
        assert_eq!(json["errors"][0]["title"], "not_found");
        assert_eq!(json["errors"][0]["meta"]["resource_id"], "7");
        assert_eq!(json["meta"]["request_id"], "req-456");
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::NotFound,
            ErrorCategory::MethodNotAllowed,
            ErrorCategory::Conflict,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
