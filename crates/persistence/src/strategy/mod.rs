//! Tenancy strategy.
//!
//! Tracekeep stores every tenant's rows in shared tables distinguished by a
//! `tenant_id` column. [`TenantScope`] resolves which tenant a request acts
//! for and narrows queries accordingly.
//!
//! # Resolution order
//!
//! 1. The request context (session tenant)
//! 2. The `X-Tenant-ID` header, when header fallback is enabled
//! 3. Nothing: governed by [`TenantResolutionPolicy`]
//!
//! # Example
//!
//! ```
//! use tracekeep_persistence::strategy::{
//!     SharedSchemaConfig, TenantFilter, TenantResolutionPolicy, TenantScope,
//! };
//! use tracekeep_persistence::tenant::{TenantContext, TenantId};
//!
//! let scope = TenantScope::new(SharedSchemaConfig::default()).unwrap();
//!
//! let ctx = TenantContext::new().with_header_tenant("9");
//! let resolution = scope.resolve(&ctx, "events").unwrap();
//! assert_eq!(resolution.filter, TenantFilter::Tenant(TenantId::new(9)));
//!
//! let strict = TenantScope::new(
//!     SharedSchemaConfig::new().with_policy(TenantResolutionPolicy::FailClosed),
//! )
//! .unwrap();
//! assert!(strict.resolve(&TenantContext::new(), "events").is_err());
//! ```

mod shared_schema;

pub use shared_schema::{
    SharedSchemaConfig, TenantFilter, TenantResolution, TenantResolutionPolicy, TenantScope,
};
