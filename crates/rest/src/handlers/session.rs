//! Session-derived UI flags.

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use tracekeep_persistence::core::{EventStorage, ExistenceOracle};
use tracing::debug;

use crate::permissions::SessionPermissions;
use crate::state::AppState;

/// Flags the UI uses to pick which controls to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiFlags {
    /// Signed in without permission to manage batches.
    pub is_facility_operator: bool,
}

/// Handler for the session's UI flags.
///
/// # HTTP Request
///
/// `GET [base]/session/ui-flags`
///
/// A request without [`SessionPermissions`] is anonymous and gets every
/// flag off.
pub async fn ui_flags_handler<S>(
    State(state): State<AppState<S>>,
    permissions: Option<Extension<SessionPermissions>>,
) -> Json<UiFlags>
where
    S: EventStorage + ExistenceOracle + Send + Sync,
{
    let check = permissions.as_ref().map(|Extension(session)| session.check());
    let is_facility_operator = state.operator_memo().is_facility_operator(check);

    debug!(
        source = ?check.map(|c| c.source_key().into_owned()),
        is_facility_operator,
        "Derived UI flags"
    );

    Json(UiFlags {
        is_facility_operator,
    })
}
