//! A set-backed permission source.

use std::borrow::Cow;
use std::collections::HashSet;

use super::PermissionCheck;

/// Permissions granted to a subject at a given revision.
///
/// The revision should change whenever the subject's grants change, so the
/// `source_key` of a stale capability never matches a fresh one.
///
/// # Example
///
/// ```
/// use tracekeep_rest::permissions::{GrantedPermissions, PermissionCheck};
///
/// let grants = GrantedPermissions::new("user:42")
///     .with_revision(3)
///     .grant("manage-batches");
/// assert!(grants.has_permission("manage-batches"));
/// assert_eq!(grants.source_key(), "user:42@3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedPermissions {
    subject: String,
    revision: u64,
    granted: HashSet<String>,
}

impl GrantedPermissions {
    /// Creates an empty grant set for `subject`.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Sets the grant revision.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Grants a permission.
    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.granted.insert(permission.into());
        self
    }

    /// Returns the subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl PermissionCheck for GrantedPermissions {
    fn has_permission(&self, permission: &str) -> bool {
        self.granted.contains(permission)
    }

    fn source_key(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}@{}", self.subject, self.revision))
    }
}
