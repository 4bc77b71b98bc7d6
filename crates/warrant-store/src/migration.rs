//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, crate::now_millis()],
            )?;
            tracing::info!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Nullable columns take part in uniqueness through `COALESCE(col, '')`
/// expression indexes, because plain UNIQUE constraints treat NULLs as
/// distinct in SQLite.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Role definitions
        CREATE TABLE roles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_type TEXT,                 -- owning tenant, nullable
            tenant_id TEXT,
            actor_type TEXT,                  -- allowed actor type, nullable
            scope_type TEXT,                  -- allowed scope type, nullable
            handle TEXT NOT NULL,
            name TEXT,
            translations TEXT,                -- JSON: field -> locale -> text
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE UNIQUE INDEX unique_roles ON roles (
            handle,
            COALESCE(actor_type, ''),
            COALESCE(scope_type, ''),
            COALESCE(tenant_type, ''),
            COALESCE(tenant_id, '')
        );

        -- Permissions granted to roles
        CREATE TABLE role_permissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            permission TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,

            UNIQUE (role_id, permission)
        );

        -- Role assignments
        CREATE TABLE actor_role (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_type TEXT NOT NULL,
            actor_id TEXT NOT NULL,
            role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            scope_type TEXT,                  -- NULL together with scope_id = unscoped
            scope_id TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE UNIQUE INDEX unique_actor_role ON actor_role (
            actor_type,
            actor_id,
            role_id,
            COALESCE(scope_type, ''),
            COALESCE(scope_id, '')
        );

        -- Direct permission grants
        CREATE TABLE actor_permissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_type TEXT NOT NULL,
            actor_id TEXT NOT NULL,
            scope_type TEXT,
            scope_id TEXT,
            permission TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE UNIQUE INDEX unique_actor_permission ON actor_permissions (
            actor_type,
            actor_id,
            COALESCE(scope_type, ''),
            COALESCE(scope_id, ''),
            permission
        );

        -- Indexes for common queries
        CREATE INDEX idx_roles_tenant ON roles(tenant_type, tenant_id);
        CREATE INDEX idx_actor_role_actor ON actor_role(actor_type, actor_id);
        CREATE INDEX idx_actor_role_role ON actor_role(role_id);
        CREATE INDEX idx_actor_permissions_actor ON actor_permissions(actor_type, actor_id);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"roles".to_string()));
        assert!(tables.contains(&"role_permissions".to_string()));
        assert!(tables.contains(&"actor_role".to_string()));
        assert!(tables.contains(&"actor_permissions".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_null_scope_is_unique() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let insert = "INSERT OR IGNORE INTO actor_permissions
            (actor_type, actor_id, scope_type, scope_id, permission, created_at, updated_at)
            VALUES ('user', '1', NULL, NULL, 'edit-post', 0, 0)";
        assert_eq!(conn.execute(insert, []).unwrap(), 1);
        assert_eq!(conn.execute(insert, []).unwrap(), 0);
    }

    #[test]
    fn test_rejects_newer_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (99, 0)",
            [],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
