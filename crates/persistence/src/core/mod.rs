//! Core storage traits.
//!
//! - [`EventStorage`] - Record, read and list traceability events
//! - [`ReferenceStorage`] - Create rows in the reference collections
//! - [`ExistenceOracle`] - Answer "does this referenced row exist?"
//!
//! Every method that touches a tenant-owned table takes a [`TenantContext`]
//! and narrows its query through the backend's
//! [`TenantScope`](crate::strategy::TenantScope).
//!
//! [`TenantContext`]: crate::tenant::TenantContext

mod existence;
mod storage;

pub use existence::ExistenceOracle;
pub use storage::{EventStorage, ReferenceStorage};
