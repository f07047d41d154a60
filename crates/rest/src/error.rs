//! Error types for the Tracekeep REST API.
//!
//! # Error Mapping
//!
//! Storage errors from the persistence layer are mapped to HTTP status codes:
//!
//! | Storage Error | HTTP Status |
//! |--------------|-------------|
//! | Validation(Rejected) | 422 |
//! | Validation(NotAnObject, InvalidField) | 400 |
//! | Resource(NotFound) | 404 |
//! | Tenant(Unresolved) | 403 |
//! | Backend(Unavailable, ConnectionFailed) | 503 |
//! | Backend(other) | 500 |
//!
//! Every error body carries a `message`; validation failures add an
//! `errors` map keyed by field.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracekeep_persistence::error::{
    BackendError, ResourceError, StorageError, TenantError, ValidationError,
};
use tracekeep_persistence::validation::ValidationErrors;
use tracing::error;

/// Summary message of a 422 response.
pub const VALIDATION_FAILED_MESSAGE: &str = "The given data was invalid.";

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Row not found in the caller's tenant scope (HTTP 404).
    NotFound {
        /// The entity (e.g. "events").
        entity: String,
        /// The requested id.
        id: String,
    },

    /// Malformed request (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unsupported media type (HTTP 415).
    UnsupportedMediaType {
        /// The unsupported content type.
        content_type: String,
    },

    /// The payload violated field rules (HTTP 422).
    ValidationFailed {
        /// Messages keyed by field.
        errors: ValidationErrors,
    },

    /// No tenant could be resolved and the service fails closed (HTTP 403).
    Forbidden {
        /// Error message.
        message: String,
    },

    /// A dependency could not answer (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { entity, id } => write!(f, "Not found: {}/{}", entity, id),
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::UnsupportedMediaType { content_type } => {
                write!(f, "Unsupported media type: {}", content_type)
            }
            RestError::ValidationFailed { errors } => {
                write!(f, "Validation failed for {} field(s)", errors.len())
            }
            RestError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RestError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RestError::ValidationFailed { errors } => json!({
                "message": VALIDATION_FAILED_MESSAGE,
                "errors": errors,
            }),
            RestError::NotFound { entity, id } => json!({
                "message": format!("No {} record found with id {}", entity, id),
            }),
            RestError::UnsupportedMediaType { content_type } => json!({
                "message": format!("Content type '{}' is not supported", content_type),
            }),
            RestError::BadRequest { message }
            | RestError::Forbidden { message }
            | RestError::ServiceUnavailable { message }
            | RestError::InternalError { message } => json!({ "message": message }),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}

// Conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => e.into(),
            StorageError::Tenant(e) => e.into(),
            StorageError::Validation(e) => e.into(),
            StorageError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { entity, id } => RestError::NotFound { entity, id },
        }
    }
}

impl From<TenantError> for RestError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::Unresolved { .. } => RestError::Forbidden {
                message: "No tenant could be resolved for this request".to_string(),
            },
            TenantError::InvalidTenantColumn { .. } => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Rejected { errors } => RestError::ValidationFailed { errors },
            ValidationError::NotAnObject { .. } | ValidationError::InvalidField { .. } => {
                RestError::BadRequest {
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        if err.is_transient() {
            RestError::ServiceUnavailable {
                message: err.to_string(),
            }
        } else {
            RestError::InternalError {
                message: err.to_string(),
            }
        }
    }
}

/// Result type for REST handlers.
pub type RestResult<T> = Result<T, RestError>;
