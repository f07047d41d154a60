//! Common test utilities for REST API testing.
//!
//! Builds a router over an in-memory SQLite backend and stands in for the
//! authentication layer by inserting the session's tenant and permissions
//! as request extensions.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{Extension, Router};
use axum_test::TestServer;
use serde_json::{Value, json};
use tracekeep_persistence::backends::sqlite::{SqliteBackend, SqliteBackendConfig};
use tracekeep_persistence::core::{EventStorage, ExistenceOracle, ReferenceStorage};
use tracekeep_persistence::tenant::{TenantContext, TenantId};
use tracekeep_persistence::types::Collection;
use tracekeep_rest::{AppState, ServerConfig, SessionPermissions, SessionTenant, routing};

/// What the authentication layer would have attached to each request.
#[derive(Clone, Default)]
pub struct Session {
    pub tenant: Option<TenantId>,
    pub permissions: Option<SessionPermissions>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn tenant(id: i64) -> Self {
        Self {
            tenant: Some(TenantId::new(id)),
            permissions: None,
        }
    }

    pub fn with_permissions(mut self, permissions: SessionPermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// Ids of the reference rows seeded for one tenant.
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub user: i64,
    pub facility: i64,
    pub area: i64,
    pub batch: i64,
}

impl Seeded {
    /// A harvest payload referencing only seeded rows.
    pub fn harvest(&self) -> Value {
        json!({
            "event_type": "harvest",
            "area_id": self.area,
            "facility_id": self.facility,
            "user_id": self.user,
            "batch_id": self.batch,
            "quantity": "420.5",
            "unit": "g"
        })
    }

    /// A movement payload; movements carry locations instead of a batch.
    pub fn movement(&self) -> Value {
        json!({
            "event_type": "movement",
            "area_id": self.area,
            "facility_id": self.facility,
            "user_id": self.user,
            "from_location": "Veg Room",
            "to_location": "Flower Room 1"
        })
    }
}

/// Creates a backend whose tenant scope follows `config`.
pub fn create_backend(config: &ServerConfig) -> Arc<SqliteBackend> {
    let backend = SqliteBackend::with_config(
        ":memory:",
        SqliteBackendConfig {
            tenancy: config.tenancy(),
            ..Default::default()
        },
    )
    .expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to init schema");
    Arc::new(backend)
}

/// Seeds a user, facility, area and batch owned by `tenant`, plus a row in
/// the tenants table.
pub async fn seed(backend: &SqliteBackend, tenant: i64) -> Seeded {
    let ctx = TenantContext::for_tenant(TenantId::new(tenant));
    let mut ids = Vec::new();
    for (collection, name) in [
        (Collection::Users, "Dana"),
        (Collection::Facilities, "North Site"),
        (Collection::CultivationAreas, "Flower Room 1"),
        (Collection::Batches, "B-0001"),
    ] {
        let row = backend
            .create_reference(&ctx, collection, name)
            .await
            .expect("Failed to seed reference row");
        ids.push(row.id);
    }
    backend
        .create_reference(&ctx, Collection::Tenants, "Acme Growers")
        .await
        .expect("Failed to seed tenant row");

    Seeded {
        user: ids[0],
        facility: ids[1],
        area: ids[2],
        batch: ids[3],
    }
}

/// Wraps a router with the session's request extensions.
pub fn with_session(mut app: Router, session: Session) -> Router {
    if let Some(tenant) = session.tenant {
        app = app.layer(Extension(SessionTenant(tenant)));
    }
    if let Some(permissions) = session.permissions {
        app = app.layer(Extension(permissions));
    }
    app
}

/// Creates a test server over shared state.
pub fn server_for_state<S>(state: AppState<S>, session: Session) -> TestServer
where
    S: EventStorage + ExistenceOracle + Send + Sync + 'static,
{
    let app = with_session(routing::create_routes(state), session);
    TestServer::new(app).expect("Failed to create test server")
}

/// Creates a test server over `backend`.
pub fn create_server<S>(backend: Arc<S>, config: ServerConfig, session: Session) -> TestServer
where
    S: EventStorage + ExistenceOracle + Send + Sync + 'static,
{
    server_for_state(AppState::new(backend, config), session)
}

/// Creates a seeded backend and a server for a session of tenant 7.
pub async fn tenant_seven() -> (TestServer, Arc<SqliteBackend>, Seeded) {
    let config = ServerConfig::for_testing();
    let backend = create_backend(&config);
    let seeded = seed(&backend, 7).await;
    let server = create_server(Arc::clone(&backend), config, Session::tenant(7));
    (server, backend, seeded)
}
