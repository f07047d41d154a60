//! Tenant context for storage operations.
//!
//! This module defines [`TenantContext`], the explicit per-request value that
//! every tenant-owned storage operation takes. It records where a tenant id
//! can come from; [`TenantScope`](crate::strategy::TenantScope) decides which
//! one wins.

use super::current;
use super::id::TenantId;

/// The tenant sources available to a single request.
///
/// `TenantContext` is built once per request (usually by the REST layer's
/// tenant extractor) and passed by reference into every storage call. It holds:
///
/// - the tenant from the authenticated session, if any;
/// - the raw `X-Tenant-ID` header value, if any;
/// - an optional correlation ID for log correlation.
///
/// # Examples
///
/// ```
/// use tracekeep_persistence::tenant::{TenantContext, TenantId};
///
/// let ctx = TenantContext::new()
///     .with_session_tenant(TenantId::new(7))
///     .with_header_tenant("9");
///
/// assert_eq!(ctx.session_tenant(), Some(TenantId::new(7)));
/// assert_eq!(ctx.header_tenant(), Some("9"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantContext {
    /// Tenant taken from the request context.
    session_tenant: Option<TenantId>,
    /// Raw `X-Tenant-ID` header value.
    header_tenant: Option<String>,
    /// Optional correlation ID for request tracing.
    correlation_id: Option<String>,
}

impl TenantContext {
    /// Creates an empty context with no tenant sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context holding only a session tenant.
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self::new().with_session_tenant(tenant_id)
    }

    /// Snapshots the request-scoped tenant slot into an explicit context.
    ///
    /// `header` is the raw `X-Tenant-ID` value, if the request carried one.
    #[track_caller]
    pub fn from_current(header: Option<&str>) -> Self {
        Self {
            session_tenant: current::tenant_id(),
            header_tenant: header.map(String::from),
            correlation_id: None,
        }
    }

    /// Sets the session tenant.
    pub fn with_session_tenant(mut self, tenant_id: TenantId) -> Self {
        self.session_tenant = Some(tenant_id);
        self
    }

    /// Sets the raw header value.
    pub fn with_header_tenant(mut self, header: impl Into<String>) -> Self {
        self.header_tenant = Some(header.into());
        self
    }

    /// Sets the correlation ID used in diagnostic records.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Returns the session tenant, if any.
    pub fn session_tenant(&self) -> Option<TenantId> {
        self.session_tenant
    }

    /// Returns the raw header value, if any.
    pub fn header_tenant(&self) -> Option<&str> {
        self.header_tenant.as_deref()
    }

    /// Returns the correlation ID, if set.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns `true` if neither source carries a value.
    pub fn is_empty(&self) -> bool {
        self.session_tenant.is_none() && self.header_tenant.is_none()
    }
}
