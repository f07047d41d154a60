//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the persistence layer,
//! following a hierarchy that separates tenant errors, validation errors,
//! resource errors and backend (infrastructure) errors.
//!
//! The split matters to callers: a [`ValidationError`] means the proposed
//! event was rejected, while a [`BackendError`] means the infrastructure
//! could not answer and the request must fail rather than be reported as
//! invalid.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::validation::ValidationErrors;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Resource state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Tenant isolation errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns `true` if the error is an infrastructure failure rather than
    /// a problem with the request itself.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, StorageError::Backend(_))
    }
}

/// Errors related to stored rows.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested row was not found in the caller's tenant scope.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

/// Errors related to tenant isolation.
#[derive(Error, Debug)]
pub enum TenantError {
    /// No tenant could be resolved and the scope is configured to fail closed.
    #[error("no tenant resolvable for query on {entity}")]
    Unresolved { entity: String },

    /// The configured tenant column is not a valid SQL identifier.
    #[error("invalid tenant column name: {column}")]
    InvalidTenantColumn { column: String },
}

/// Errors related to payload validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The payload violated one or more field rules.
    #[error("the given data was invalid ({} field(s))", errors.len())]
    Rejected { errors: ValidationErrors },

    /// The payload was not a JSON object.
    #[error("payload must be an object, got {found}")]
    NotAnObject { found: String },

    /// Conversion of an accepted payload failed.
    #[error("invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl BackendError {
    /// Returns `true` for errors a caller could reasonably retry later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::Unavailable { .. } | BackendError::ConnectionFailed { .. }
        )
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
