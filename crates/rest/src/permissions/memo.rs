//! Memoized facility-operator derivation.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::{MANAGE_BATCHES, PermissionCheck};

/// Default number of cached derivations before the memo is cleared.
pub const DEFAULT_MEMO_CAPACITY: usize = 1024;

/// Caches [`is_facility_operator`](super::is_facility_operator) per
/// `(source_key, permission)`.
///
/// The memo is bounded: once it holds `capacity` entries it is cleared
/// before the next insert.
#[derive(Debug)]
pub struct FacilityOperatorMemo {
    entries: RwLock<HashMap<(String, &'static str), bool>>,
    capacity: usize,
}

impl FacilityOperatorMemo {
    /// Creates a memo with [`DEFAULT_MEMO_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMO_CAPACITY)
    }

    /// Creates a memo holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Derives the facility-operator flag, reusing a cached answer for the
    /// same permission source.
    pub fn is_facility_operator(&self, check: Option<&dyn PermissionCheck>) -> bool {
        let Some(check) = check else {
            return false;
        };

        let key = (check.source_key().into_owned(), MANAGE_BATCHES);
        if let Some(&cached) = self.entries.read().get(&key) {
            return cached;
        }

        let is_operator = !check.has_permission(MANAGE_BATCHES);
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity {
            debug!(entries = entries.len(), "Clearing facility operator memo");
            entries.clear();
        }
        entries.insert(key, is_operator);
        is_operator
    }

    /// Returns the number of cached derivations.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every cached derivation.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for FacilityOperatorMemo {
    fn default() -> Self {
        Self::new()
    }
}
