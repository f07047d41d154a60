//! Existence checks for referenced rows.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::tenant::TenantContext;
use crate::types::Collection;

/// Answers whether a row exists in a reference collection.
///
/// Tenant-owned collections (see [`Collection::is_tenant_owned`]) are
/// checked within the tenant resolved from `tenant`, so a payload can only
/// reference its own tenant's areas, facilities and batches. Users and
/// tenants are global.
///
/// An implementation that cannot answer (pool exhausted, database gone)
/// must return an error rather than `Ok(false)`; callers treat `false` as
/// a validation failure.
#[async_trait]
pub trait ExistenceOracle: Send + Sync {
    /// Returns `true` if `collection` has a row with this id visible to
    /// `tenant`.
    async fn exists(
        &self,
        tenant: &TenantContext,
        collection: Collection,
        id: i64,
    ) -> StorageResult<bool>;
}
