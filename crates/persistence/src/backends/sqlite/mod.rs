//! SQLite backend implementation.
//!
//! Supports in-memory databases (tests, demos) and file-based databases.
//! Implements [`EventStorage`](crate::core::EventStorage),
//! [`ReferenceStorage`](crate::core::ReferenceStorage) and
//! [`ExistenceOracle`](crate::core::ExistenceOracle).
//!
//! # Example
//!
//! ```no_run
//! use tracekeep_persistence::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE events (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     uid TEXT NOT NULL UNIQUE,
//!     tenant_id INTEGER,
//!     event_type TEXT NOT NULL,
//!     area_id INTEGER NOT NULL,
//!     facility_id INTEGER NOT NULL,
//!     user_id INTEGER NOT NULL,
//!     batch_id INTEGER,
//!     -- ... optional event fields ...
//!     recorded_at TEXT NOT NULL
//! );
//!
//! -- facilities, cultivation_areas, batches: (id, tenant_id, name, created_at)
//! -- users, tenants: (id, name, created_at)
//! ```

mod backend;
mod schema;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use schema::SCHEMA_VERSION;
