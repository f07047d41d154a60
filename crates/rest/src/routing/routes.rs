//! Route configuration.
//!
//! Defines all routes of the Tracekeep REST API.

use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use tracekeep_persistence::core::{EventStorage, ExistenceOracle};

use crate::handlers;
use crate::middleware::tenant_middleware;
use crate::state::AppState;

/// Creates all REST API routes.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `POST /events` - Validate and record an event
/// - `GET /events` - List events
/// - `POST /events/validate` - Validate an event
/// - `GET /events/{id}` - Read an event
/// - `GET /session/ui-flags` - Permission-derived UI flags
///
/// Every route runs inside the tenant middleware.
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: EventStorage + ExistenceOracle + Send + Sync + 'static,
{
    Router::new()
        // System-level routes
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::health::liveness_handler))
        // Events
        .route(
            "/events",
            post(handlers::create_event_handler::<S>).get(handlers::list_events_handler::<S>),
        )
        .route(
            "/events/validate",
            post(handlers::validate_event_handler::<S>),
        )
        .route("/events/{id}", get(handlers::read_event_handler::<S>))
        // Session
        .route("/session/ui-flags", get(handlers::ui_flags_handler::<S>))
        .layer(middleware::from_fn(tenant_middleware))
        // State
        .with_state(state)
}
