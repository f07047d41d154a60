//! Traceability event handlers.
//!
//! - `POST [base]/events` - Validate and record an event
//! - `POST [base]/events/validate` - Validate only
//! - `GET [base]/events` - List events in the caller's tenant scope
//! - `GET [base]/events/{id}` - Read one event in the caller's tenant scope

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracekeep_persistence::core::{EventStorage, ExistenceOracle};
use tracekeep_persistence::error::StorageError;
use tracekeep_persistence::tenant::TenantContext;
use tracekeep_persistence::types::{EventPayload, EventQuery, NewEvent};
use tracing::{debug, info};

use crate::error::{RestError, RestResult};
use crate::extractors::{EventBody, TenantExtractor};
use crate::state::AppState;

/// Entity name used in not-found responses.
const EVENTS: &str = "events";

/// Runs the validation policy in the caller's tenant scope, turning a
/// rejection into a 422.
///
/// A failing existence lookup means the payload could not be judged, so it
/// surfaces as 503 rather than as a validation error.
async fn validate_payload<S>(
    state: &AppState<S>,
    tenant: &TenantContext,
    payload: &EventPayload,
) -> RestResult<()>
where
    S: EventStorage + ExistenceOracle,
{
    let outcome = state
        .policy()
        .validate(payload, tenant, state.storage())
        .await
        .map_err(lookup_failure)?;
    outcome.into_result()?;
    Ok(())
}

fn lookup_failure(err: StorageError) -> RestError {
    match err {
        StorageError::Backend(e) => RestError::ServiceUnavailable {
            message: format!("Reference lookup unavailable: {}", e),
        },
        other => other.into(),
    }
}

/// Handler for recording an event.
///
/// # Response
///
/// - `201 Created` - The stored event, with a `Location` header
/// - `403 Forbidden` - No tenant resolvable and the service fails closed
/// - `415 Unsupported Media Type` - Body is neither JSON nor form-encoded
/// - `422 Unprocessable Entity` - Field violations, keyed by field
/// - `503 Service Unavailable` - Reference lookups could not be answered
///
/// # Example
///
/// ```http
/// POST /events HTTP/1.1
/// Content-Type: application/json
///
/// {"event_type": "harvest", "area_id": 1, "facility_id": 1, "user_id": 1, "batch_id": 4}
/// ```
pub async fn create_event_handler<S>(
    State(state): State<AppState<S>>,
    tenant: TenantExtractor,
    EventBody(payload): EventBody,
) -> RestResult<Response>
where
    S: EventStorage + ExistenceOracle + Send + Sync,
{
    debug!(
        tenant = %tenant,
        event_type = ?payload.string("event_type"),
        "Processing create event request"
    );

    validate_payload(&state, tenant.context(), &payload).await?;

    let event = NewEvent::try_from(&payload)?;
    let stored = state.storage().record_event(tenant.context(), event).await?;

    info!(
        id = stored.id,
        uid = %stored.uid,
        tenant_id = ?stored.tenant_id(),
        event_type = %stored.event.event_type,
        "Event recorded"
    );

    let location = format!("/events/{}", stored.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(stored),
    )
        .into_response())
}

/// Handler for validating an event without recording it.
///
/// # Response
///
/// - `200 OK` - `{"valid": true}`
/// - `403 Forbidden` - References need a tenant and none is resolvable
/// - `422 Unprocessable Entity` - Field violations, keyed by field
/// - `503 Service Unavailable` - Reference lookups could not be answered
pub async fn validate_event_handler<S>(
    State(state): State<AppState<S>>,
    tenant: TenantExtractor,
    EventBody(payload): EventBody,
) -> RestResult<Response>
where
    S: EventStorage + ExistenceOracle + Send + Sync,
{
    debug!(
        tenant = %tenant,
        event_type = ?payload.string("event_type"),
        "Processing validate event request"
    );

    validate_payload(&state, tenant.context(), &payload).await?;

    Ok((StatusCode::OK, Json(json!({ "valid": true }))).into_response())
}

/// Handler for listing events.
///
/// # Query Parameters
///
/// - `event_type` - Only events of this type
/// - `batch_id` - Only events for this batch
/// - `facility_id` - Only events in this facility
/// - `limit` - Page size (default 100, at most 1000)
///
/// The response carries the page under `events` and the number of events
/// visible to the tenant under `total`.
pub async fn list_events_handler<S>(
    State(state): State<AppState<S>>,
    tenant: TenantExtractor,
    query: Result<Query<EventQuery>, QueryRejection>,
) -> RestResult<Response>
where
    S: EventStorage + ExistenceOracle + Send + Sync,
{
    let Query(query) = query.map_err(|e| RestError::BadRequest {
        message: e.body_text(),
    })?;

    debug!(tenant = %tenant, query = ?query, "Processing list events request");

    let events = state.storage().list_events(tenant.context(), &query).await?;
    let total = state.storage().count_events(tenant.context()).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "events": events,
            "total": total,
        })),
    )
        .into_response())
}

/// Handler for reading one event.
///
/// # Response
///
/// - `200 OK` - The stored event
/// - `404 Not Found` - No such event in the caller's tenant scope
pub async fn read_event_handler<S>(
    State(state): State<AppState<S>>,
    tenant: TenantExtractor,
    Path(id): Path<i64>,
) -> RestResult<Response>
where
    S: EventStorage + ExistenceOracle + Send + Sync,
{
    debug!(tenant = %tenant, id, "Processing read event request");

    match state.storage().read_event(tenant.context(), id).await? {
        Some(stored) => Ok((StatusCode::OK, Json(stored)).into_response()),
        None => Err(RestError::NotFound {
            entity: EVENTS.to_string(),
            id: id.to_string(),
        }),
    }
}
