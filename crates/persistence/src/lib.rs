//! Tracekeep Persistence Layer
//!
//! Tenant-scoped storage and payload validation for traceability events
//! (movement, cultivation, harvest, sampling, destruction, loss/theft,
//! processing, inventory adjustment) recorded against tracked batches.
//!
//! # Architecture
//!
//! - [`tenant`] - The request's tenant: explicit [`TenantContext`] values and
//!   the task-local [`tenant::current`] slot
//! - [`strategy`] - [`TenantScope`](strategy::TenantScope), which resolves
//!   the tenant and narrows queries on tenant-owned tables
//! - [`validation`] - [`EventValidationPolicy`](validation::EventValidationPolicy),
//!   a declarative rule table for event payloads
//! - [`query`] - A small SQL builder used by the backends
//! - [`types`] - Events, payloads and reference collections
//! - [`core`] - Storage traits
//! - [`backends`] - Backend implementations (SQLite)
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::json;
//! use tracekeep_persistence::backends::sqlite::SqliteBackend;
//! use tracekeep_persistence::core::EventStorage;
//! use tracekeep_persistence::types::{EventPayload, NewEvent};
//! use tracekeep_persistence::validation::{EventValidationPolicy, ValidationOutcome};
//! use tracekeep_persistence::{TenantContext, TenantId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//!
//! let payload = EventPayload::try_from(json!({
//!     "event_type": "harvest",
//!     "area_id": 1,
//!     "facility_id": 1,
//!     "user_id": 1,
//!     "batch_id": 1
//! }))?;
//!
//! let tenant = TenantContext::for_tenant(TenantId::new(7));
//! match EventValidationPolicy::new().validate(&payload, &tenant, &backend).await? {
//!     ValidationOutcome::Accepted => {
//!         let stored = backend.record_event(&tenant, NewEvent::try_from(&payload)?).await?;
//!         println!("recorded event {}", stored.uid);
//!     }
//!     ValidationOutcome::Rejected(errors) => println!("rejected: {:?}", errors),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Multitenancy
//!
//! All tenants share the same tables. Every storage method that touches a
//! tenant-owned table (`events`, `batches`, `facilities`,
//! `cultivation_areas`) takes a [`TenantContext`] and routes its query
//! through the backend's tenant scope, which adds `tenant_id = ?` whenever
//! a tenant resolves. When none does, the configured
//! [`TenantResolutionPolicy`](strategy::TenantResolutionPolicy) decides
//! between an unfiltered query with a warning (fail-open, the default) and
//! an error (fail-closed).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod query;
pub mod strategy;
pub mod tenant;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
pub use tenant::{TenantContext, TenantId};
pub use types::{EventPayload, EventQuery, EventType, NewEvent, StoredEvent};

// Re-export core traits
pub use core::{EventStorage, ExistenceOracle, ReferenceStorage};

// Re-export tenancy strategy
pub use strategy::{
    SharedSchemaConfig, TenantFilter, TenantResolution, TenantResolutionPolicy, TenantScope,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
