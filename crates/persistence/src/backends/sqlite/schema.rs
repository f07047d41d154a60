//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::{BackendError, StorageError, StorageResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Tables that carry a tenant column.
pub const TENANT_OWNED_TABLES: [&str; 4] = ["events", "batches", "facilities", "cultivation_areas"];

fn schema_error(context: &str, e: rusqlite::Error) -> StorageError {
    StorageError::Backend(BackendError::MigrationError {
        message: format!("{}: {}", context, e),
    })
}

/// Initialize the database schema.
///
/// `tenant_column` names the tenant column of tenant-owned tables; it must
/// already be validated as an identifier.
pub fn initialize_schema(conn: &Connection, tenant_column: &str) -> StorageResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn, tenant_column)?;
        set_schema_version(conn, 1)?;
        migrate_schema(conn, 1, tenant_column)?;
    } else if current_version < SCHEMA_VERSION {
        migrate_schema(conn, current_version, tenant_column)?;
    }

    Ok(())
}

/// Get the current schema version.
pub(crate) fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| schema_error("Failed to create schema_version table", e))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> StorageResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| schema_error("Failed to clear schema_version", e))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| schema_error("Failed to set schema_version", e))?;
    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection, tenant_column: &str) -> StorageResult<()> {
    // Global reference collections
    for table in ["tenants", "users"] {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )"
            ),
            [],
        )
        .map_err(|e| schema_error(&format!("Failed to create {} table", table), e))?;
    }

    // Tenant-owned reference collections
    for table in ["facilities", "cultivation_areas", "batches"] {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    {tenant_column} INTEGER,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )"
            ),
            [],
        )
        .map_err(|e| schema_error(&format!("Failed to create {} table", table), e))?;
    }

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uid TEXT NOT NULL UNIQUE,
                {tenant_column} INTEGER,
                event_type TEXT NOT NULL,
                area_id INTEGER NOT NULL,
                facility_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                batch_id INTEGER,
                new_batch_id INTEGER,
                from_location TEXT,
                to_location TEXT,
                from_sub_location TEXT,
                to_sub_location TEXT,
                quantity TEXT,
                unit TEXT,
                reason TEXT,
                description TEXT,
                method TEXT,
                recorded_at TEXT NOT NULL
            )"
        ),
        [],
    )
    .map_err(|e| schema_error("Failed to create events table", e))?;

    Ok(())
}

fn migrate_schema(conn: &Connection, from_version: i32, tenant_column: &str) -> StorageResult<()> {
    let mut version = from_version;

    while version < SCHEMA_VERSION {
        match version {
            1 => migrate_v1_to_v2(conn, tenant_column)?,
            _ => {
                return Err(StorageError::Backend(BackendError::MigrationError {
                    message: format!("Unknown schema version: {}", version),
                }));
            }
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// Migrate from schema version 1 to version 2.
///
/// Adds tenant-leading indexes so scoped listings do not scan other
/// tenants' rows.
fn migrate_v1_to_v2(conn: &Connection, tenant_column: &str) -> StorageResult<()> {
    for table in TENANT_OWNED_TABLES {
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_tenant ON {table} ({tenant_column}, id)"
            ),
            [],
        )
        .map_err(|e| schema_error(&format!("Failed to index {}", table), e))?;
    }

    conn.execute(
        &format!(
            "CREATE INDEX IF NOT EXISTS idx_events_tenant_batch ON events ({tenant_column}, batch_id)"
        ),
        [],
    )
    .map_err(|e| schema_error("Failed to index events by batch", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection, kind: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")
            .unwrap()
            .query_map([kind], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_schema_initialization() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn, "tenant_id").unwrap();

        let tables = table_names(&conn, "table");
        for table in [
            "events",
            "batches",
            "facilities",
            "cultivation_areas",
            "users",
            "tenants",
            "schema_version",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }

        let indexes = table_names(&conn, "index");
        assert!(indexes.contains(&"idx_events_tenant".to_string()));
        assert!(indexes.contains(&"idx_events_tenant_batch".to_string()));
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn, "tenant_id").unwrap();
        initialize_schema(&conn, "tenant_id").unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_migration_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        get_schema_version(&conn).unwrap();
        create_schema_v1(&conn, "tenant_id").unwrap();
        set_schema_version(&conn, 1).unwrap();

        initialize_schema(&conn, "tenant_id").unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(table_names(&conn, "index").contains(&"idx_batches_tenant".to_string()));
    }

    #[test]
    fn test_custom_tenant_column() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn, "org_id").unwrap();

        conn.execute(
            "INSERT INTO batches (org_id, name, created_at) VALUES (3, 'b', 'now')",
            [],
        )
        .unwrap();
    }
}
