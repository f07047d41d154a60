//! Permission-derived UI flags.
//!
//! The session's permissions arrive as a [`PermissionCheck`] capability,
//! inserted into request extensions by the authentication layer as
//! [`SessionPermissions`]. The only flag derived here is
//! [`is_facility_operator`]: a signed-in user who may *not* manage batches.
//!
//! [`FacilityOperatorMemo`] caches the derivation per permission source, so
//! a fresh capability object for the same subject and grant revision reuses
//! the earlier answer.

mod grants;
mod memo;

use std::borrow::Cow;
use std::sync::Arc;

pub use grants::GrantedPermissions;
pub use memo::{DEFAULT_MEMO_CAPACITY, FacilityOperatorMemo};

/// Permission that distinguishes batch managers from facility operators.
pub const MANAGE_BATCHES: &str = "manage-batches";

/// A source of permission answers for one session.
pub trait PermissionCheck: Send + Sync {
    /// Returns `true` if the permission is granted.
    fn has_permission(&self, permission: &str) -> bool;

    /// Stable identity of the permission source.
    ///
    /// Two capabilities with the same key must answer every permission the
    /// same way; memoization relies on it.
    fn source_key(&self) -> Cow<'_, str>;
}

/// Returns `true` when a permission source is present and does not grant
/// [`MANAGE_BATCHES`].
///
/// An absent source (anonymous session) is never a facility operator.
pub fn is_facility_operator(check: Option<&dyn PermissionCheck>) -> bool {
    check.is_some_and(|check| !check.has_permission(MANAGE_BATCHES))
}

/// The session's permission source, as a request extension.
#[derive(Clone)]
pub struct SessionPermissions(pub Arc<dyn PermissionCheck>);

impl SessionPermissions {
    /// Wraps a permission source.
    pub fn new(check: impl PermissionCheck + 'static) -> Self {
        Self(Arc::new(check))
    }

    /// Returns the permission source.
    pub fn check(&self) -> &dyn PermissionCheck {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for SessionPermissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionPermissions")
            .field(&self.0.source_key())
            .finish()
    }
}
