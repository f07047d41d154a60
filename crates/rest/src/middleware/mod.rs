//! HTTP middleware for the Tracekeep REST API.
//!
//! - [`tenant`] - Binds the session tenant to the request's task-local slot

pub mod tenant;

pub use tenant::{SessionTenant, X_REQUEST_ID, X_TENANT_ID, tenant_middleware};
