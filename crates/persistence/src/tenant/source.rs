//! Tenant source identification.
//!
//! Defines the sources from which a tenant identifier can be resolved.

use std::fmt;

/// Source from which a tenant identifier was resolved.
///
/// Sources are listed in priority order (highest to lowest):
/// 1. Request context (the authenticated session)
/// 2. `X-Tenant-ID` header
/// 3. Nothing resolvable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenantSource {
    /// Tenant taken from the request context (highest priority).
    Context,
    /// Tenant taken from the `X-Tenant-ID` header.
    Header,
    /// No tenant could be resolved.
    None,
}

impl TenantSource {
    /// Returns the priority of this source (higher = more authoritative).
    pub fn priority(&self) -> u8 {
        match self {
            TenantSource::Context => 2,
            TenantSource::Header => 1,
            TenantSource::None => 0,
        }
    }

    /// Returns true if a tenant was resolved from this source.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, TenantSource::None)
    }
}

impl fmt::Display for TenantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantSource::Context => write!(f, "context"),
            TenantSource::Header => write!(f, "header"),
            TenantSource::None => write!(f, "none"),
        }
    }
}

impl Ord for TenantSource {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for TenantSource {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
