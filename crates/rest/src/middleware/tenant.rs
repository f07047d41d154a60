//! Tenant identification middleware.
//!
//! The authentication layer in front of this service places the signed-in
//! user's tenant in request extensions as [`SessionTenant`]. This middleware
//! runs the rest of the request inside a
//! [`current::scope`](tracekeep_persistence::tenant::current::scope) seeded
//! with it, so the value lives exactly as long as the request future.

use axum::{extract::Request, http::header::HeaderName, middleware::Next, response::Response};
use tracekeep_persistence::tenant::{TenantId, current};
use tracing::debug;

/// Header name for the fallback tenant source.
pub static X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// Header carrying a caller-supplied correlation id.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The session's tenant, as a request extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTenant(pub TenantId);

/// Returns the session tenant carried by a request, if any.
pub fn session_tenant(request: &Request) -> Option<TenantId> {
    request
        .extensions()
        .get::<SessionTenant>()
        .map(|session| session.0)
}

/// Middleware function that binds the session tenant to the request.
///
/// This can be used with `axum::middleware::from_fn`.
pub async fn tenant_middleware(request: Request, next: Next) -> Response {
    let tenant_id = session_tenant(&request);
    debug!(tenant_id = ?tenant_id, path = %request.uri().path(), "Binding request tenant");

    current::scope(tenant_id, next.run(request)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_session_tenant_from_extensions() {
        let mut request = Request::new(Body::empty());
        assert_eq!(session_tenant(&request), None);

        request
            .extensions_mut()
            .insert(SessionTenant(TenantId::new(7)));
        assert_eq!(session_tenant(&request), Some(TenantId::new(7)));
    }
}
