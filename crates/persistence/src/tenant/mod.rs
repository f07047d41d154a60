//! Tenant management for tenant-owned compliance data.
//!
//! This module provides the core types for multi-tenant support in the
//! persistence layer. Every tenant-owned storage operation takes a
//! [`TenantContext`]; the [`current`] module holds the request-scoped slot the
//! tenant middleware fills in.
//!
//! # Core Types
//!
//! - [`TenantId`] - Integer identifier of the owning organization
//! - [`TenantContext`] - Explicit per-request tenant sources
//! - [`TenantSource`] - Where a resolved tenant came from
//! - [`current`] - Task-local tenant slot bound to the request future
//!
//! # Examples
//!
//! ## Creating a Tenant Context
//!
//! ```
//! use tracekeep_persistence::tenant::{TenantContext, TenantId};
//!
//! // Session tenant only
//! let ctx = TenantContext::for_tenant(TenantId::new(7));
//!
//! // Header fallback only
//! let header_ctx = TenantContext::new().with_header_tenant("9");
//! assert!(header_ctx.session_tenant().is_none());
//! ```

pub mod current;

mod context;
mod id;
mod source;

pub use context::TenantContext;
pub use id::TenantId;
pub use source::TenantSource;
