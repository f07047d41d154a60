//! Axum extractors for Tracekeep requests.
//!
//! - [`TenantExtractor`] - Explicit tenant context for storage calls
//! - [`EventBody`] - Proposed event from a JSON or form body

mod event_body;
mod tenant;

pub use event_body::EventBody;
pub use tenant::TenantExtractor;
