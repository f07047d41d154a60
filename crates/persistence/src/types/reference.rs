//! Reference collections consulted by existence checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// A collection of rows an event can reference by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Cultivation areas (rooms, greenhouses, plots).
    CultivationAreas,
    /// Licensed facilities.
    Facilities,
    /// Application users.
    Users,
    /// Tracked inventory batches.
    Batches,
    /// Tenant organizations.
    Tenants,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Collection; 5] = [
        Collection::CultivationAreas,
        Collection::Facilities,
        Collection::Users,
        Collection::Batches,
        Collection::Tenants,
    ];

    /// Returns the backing table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::CultivationAreas => "cultivation_areas",
            Collection::Facilities => "facilities",
            Collection::Users => "users",
            Collection::Batches => "batches",
            Collection::Tenants => "tenants",
        }
    }

    /// Returns `true` if rows of this collection belong to a tenant.
    pub fn is_tenant_owned(&self) -> bool {
        matches!(
            self,
            Collection::CultivationAreas | Collection::Facilities | Collection::Batches
        )
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A row of a reference collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Row identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Owning tenant; always `None` for global collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
}
