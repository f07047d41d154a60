//! # tracekeep-rest - HTTP API for traceability events
//!
//! This crate exposes the Tracekeep persistence layer over HTTP: recording
//! and validating traceability events, listing them within the caller's
//! tenant, and deriving the session's UI flags.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tracekeep_persistence::backends::sqlite::SqliteBackend;
//! use tracekeep_rest::{create_app_with_config, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SqliteBackend::open("tracekeep.db")?;
//!     backend.init_schema()?;
//!
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(backend, config);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Method | URL | Description |
//! |--------|-----|-------------|
//! | POST | `/events` | Validate and record an event (JSON or form body) |
//! | POST | `/events/validate` | Validate an event without recording it |
//! | GET | `/events` | List events (`event_type`, `batch_id`, `facility_id`, `limit`) |
//! | GET | `/events/{id}` | Read one event |
//! | GET | `/session/ui-flags` | `{"is_facility_operator": bool}` |
//! | GET | `/health` | Backend health |
//!
//! ## Tenancy
//!
//! An authentication layer in front of this router is expected to insert
//! [`SessionTenant`](middleware::SessionTenant) and
//! [`SessionPermissions`](permissions::SessionPermissions) into request
//! extensions. The tenant middleware binds the session tenant to the
//! request; the `X-Tenant-ID` header is consulted only when the session has
//! none.
//!
//! ## Error Handling
//!
//! | HTTP Status | Meaning |
//! |-------------|---------|
//! | 400 | Malformed body or query |
//! | 403 | No tenant resolvable and the service fails closed |
//! | 404 | Event not found in the caller's tenant |
//! | 415 | Body is neither JSON nor form-encoded |
//! | 422 | Field violations: `{"message", "errors": {field: [..]}}` |
//! | 503 | Database or reference lookups unavailable |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and their HTTP mapping
//! - [`config`] - Server configuration
//! - [`state`] - Application state (storage, configuration, policy, memo)
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Tenant middleware
//! - [`extractors`] - Tenant context and event body extractors
//! - [`permissions`] - Facility-operator derivation
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod permissions;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use middleware::SessionTenant;
pub use permissions::{GrantedPermissions, PermissionCheck, SessionPermissions};
pub use state::AppState;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracekeep_persistence::core::{EventStorage, ExistenceOracle};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Router
where
    S: EventStorage + ExistenceOracle + Send + Sync + 'static,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// The tenant resolution policy lives in the storage backend; build the
/// backend with [`ServerConfig::tenancy`] so both agree.
///
/// # Example
///
/// ```rust,ignore
/// use tracekeep_persistence::backends::sqlite::{SqliteBackend, SqliteBackendConfig};
/// use tracekeep_rest::{create_app_with_config, ServerConfig};
///
/// let config = ServerConfig::default();
/// let backend = SqliteBackend::with_config(
///     ":memory:",
///     SqliteBackendConfig { tenancy: config.tenancy(), ..Default::default() },
/// )?;
/// let app = create_app_with_config(backend, config);
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Router
where
    S: EventStorage + ExistenceOracle + Send + Sync + 'static,
{
    info!(
        backend = storage.backend_name(),
        tenant_policy = %config.tenant_policy,
        "Creating REST API server"
    );

    let state = AppState::new(Arc::new(storage), config.clone());

    let router = routing::create_routes(state);

    // Requests without an x-request-id get one; it becomes the tenant
    // context's correlation id and is echoed on the response.
    let service_builder = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = router.layer(DefaultBodyLimit::max(config.max_body_size));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// Call once at startup. `RUST_LOG` overrides `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tracekeep={level},tracekeep_rest={level},tracekeep_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
