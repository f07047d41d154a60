//! Tenant context extractor.
//!
//! Snapshots the request's tenant slot and the raw `X-Tenant-ID` header into
//! an explicit [`TenantContext`] for handlers to pass into storage calls.
//! Which source wins is decided later by the storage layer's tenant scope.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracekeep_persistence::tenant::{TenantContext, TenantId};

use crate::middleware::tenant::{X_REQUEST_ID, X_TENANT_ID};

/// Axum extractor for the request's tenant context.
///
/// # Example
///
/// ```rust,ignore
/// use tracekeep_rest::extractors::TenantExtractor;
///
/// async fn handler(tenant: TenantExtractor) {
///     println!("session tenant: {:?}", tenant.session_tenant());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TenantExtractor {
    context: TenantContext,
}

impl TenantExtractor {
    /// Wraps an existing context.
    pub fn new(context: TenantContext) -> Self {
        Self { context }
    }

    /// Returns a reference to the tenant context.
    pub fn context(&self) -> &TenantContext {
        &self.context
    }

    /// Returns the session tenant, if the request carried one.
    pub fn session_tenant(&self) -> Option<TenantId> {
        self.context.session_tenant()
    }

    /// Consumes the extractor and returns the tenant context.
    pub fn into_context(self) -> TenantContext {
        self.context
    }
}

impl std::fmt::Display for TenantExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.context.session_tenant(), self.context.header_tenant()) {
            (Some(tenant), _) => write!(f, "{}", tenant),
            (None, Some(header)) => write!(f, "header:{}", header),
            (None, None) => f.write_str("none"),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Builds the context from the task-local slot and request headers.
fn context_from_headers(headers: &HeaderMap) -> TenantContext {
    let context = TenantContext::from_current(header_str(headers, &X_TENANT_ID));
    match header_str(headers, &X_REQUEST_ID) {
        Some(request_id) => context.with_correlation_id(request_id),
        None => context,
    }
}

impl<S> FromRequestParts<S> for TenantExtractor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(TenantExtractor::new(context_from_headers(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tracekeep_persistence::tenant::current;

    #[test]
    fn test_headers_only() {
        let mut headers = HeaderMap::new();
        headers.insert(&X_TENANT_ID, HeaderValue::from_static("9"));
        headers.insert(&X_REQUEST_ID, HeaderValue::from_static("req-1"));

        let context = context_from_headers(&headers);
        assert_eq!(context.session_tenant(), None);
        assert_eq!(context.header_tenant(), Some("9"));
        assert_eq!(context.correlation_id(), Some("req-1"));
    }

    #[test]
    fn test_slot_and_header_are_both_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(&X_TENANT_ID, HeaderValue::from_static("abc"));

        let context = current::sync_scope(Some(TenantId::new(7)), || {
            context_from_headers(&headers)
        });
        assert_eq!(context.session_tenant(), Some(TenantId::new(7)));
        assert_eq!(context.header_tenant(), Some("abc"));
    }

    #[test]
    fn test_display() {
        let extractor = TenantExtractor::new(TenantContext::for_tenant(TenantId::new(3)));
        assert_eq!(extractor.to_string(), "3");
        let extractor = TenantExtractor::new(TenantContext::new().with_header_tenant("9"));
        assert_eq!(extractor.to_string(), "header:9");
        assert_eq!(TenantExtractor::new(TenantContext::new()).to_string(), "none");
    }
}
