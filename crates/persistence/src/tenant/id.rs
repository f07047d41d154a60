//! Tenant identifier type.
//!
//! This module defines the [`TenantId`] type, the integer identifier of the
//! organization that owns a row in a tenant-owned table.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An integer tenant identifier.
///
/// Every row of a tenant-owned table carries one of these in its
/// `tenant_id` column. Values come from the authenticated session or from the
/// `X-Tenant-ID` request header.
///
/// # Examples
///
/// ```
/// use tracekeep_persistence::tenant::TenantId;
///
/// let tenant: TenantId = " 42 ".parse().unwrap();
/// assert_eq!(tenant.get(), 42);
/// assert_eq!(tenant.to_string(), "42");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(i64);

impl TenantId {
    /// Creates a tenant ID from its integer value.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the integer value.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parses a header value into a tenant ID.
    ///
    /// Returns `None` for anything that is not a base-10 integer after
    /// trimming surrounding whitespace, so a malformed header behaves like a
    /// missing one.
    ///
    /// ```
    /// use tracekeep_persistence::tenant::TenantId;
    ///
    /// assert_eq!(TenantId::from_header_value("9"), Some(TenantId::new(9)));
    /// assert_eq!(TenantId::from_header_value("acme"), None);
    /// assert_eq!(TenantId::from_header_value(""), None);
    /// ```
    pub fn from_header_value(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl FromStr for TenantId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(TenantId)
    }
}

impl From<i64> for TenantId {
    fn from(id: i64) -> Self {
        TenantId(id)
    }
}

impl From<TenantId> for i64 {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_creation() {
        let tenant = TenantId::new(7);
        assert_eq!(tenant.get(), 7);
        assert_eq!(i64::from(tenant), 7);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!("  9\t".parse::<TenantId>().unwrap(), TenantId::new(9));
        assert_eq!("-3".parse::<TenantId>().unwrap(), TenantId::new(-3));
    }

    #[test]
    fn test_header_value_rejects_garbage() {
        assert_eq!(TenantId::from_header_value("9"), Some(TenantId::new(9)));
        assert_eq!(TenantId::from_header_value("9a"), None);
        assert_eq!(TenantId::from_header_value("1.5"), None);
        assert_eq!(TenantId::from_header_value("   "), None);
        assert_eq!(TenantId::from_header_value("99999999999999999999"), None);
    }

    #[test]
    fn test_display_and_debug() {
        let tenant = TenantId::new(12);
        assert_eq!(tenant.to_string(), "12");
        assert_eq!(format!("{:?}", tenant), "TenantId(12)");
    }

    #[test]
    fn test_serde_roundtrip() {
        let tenant = TenantId::new(42);
        let json = serde_json::to_string(&tenant).unwrap();
        assert_eq!(json, "42");

        let parsed: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tenant);
    }
}
