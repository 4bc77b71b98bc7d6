//! SQLite implementation of the store traits.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};

use warrant_core::{
    diff, GrantSnapshot, MorphType, NewRole, ObjectRef, PermissionHandle, Role, RoleId,
    SyncReport, Translations,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::now_millis;
use crate::traits::{AssignmentStore, AuthStore, GrantStore, RoleStore};

const ROLE_COLUMNS: &str =
    "id, tenant_type, tenant_id, actor_type, scope_type, handle, name, translations";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection from the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row helpers
// ─────────────────────────────────────────────────────────────────────────────

fn scope_params(scope: Option<&ObjectRef>) -> (Option<String>, Option<String>) {
    match scope {
        Some(s) => (Some(s.kind.as_str().to_owned()), Some(s.id.clone())),
        None => (None, None),
    }
}

fn object_ref(kind: Option<String>, id: Option<String>) -> Option<ObjectRef> {
    match (kind, id) {
        (Some(kind), Some(id)) => Some(ObjectRef::new(kind, id)),
        _ => None,
    }
}

// Helper to convert a row to Role
fn row_to_role(row: &rusqlite::Row<'_>) -> rusqlite::Result<Role> {
    let translations: Option<String> = row.get("translations")?;
    let translations: Translations = match translations {
        Some(json) if !json.is_empty() => serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?,
        _ => Translations::new(),
    };

    Ok(Role {
        id: RoleId(row.get("id")?),
        handle: row.get("handle")?,
        name: row.get("name")?,
        tenant: object_ref(row.get("tenant_type")?, row.get("tenant_id")?),
        actor_type: row.get::<_, Option<String>>("actor_type")?.map(MorphType::new),
        scope_type: row.get::<_, Option<String>>("scope_type")?.map(MorphType::new),
        translations,
    })
}

fn encode_translations(translations: &Translations) -> Result<Option<String>> {
    if translations.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(translations)?))
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn role_exists(conn: &Connection, id: RoleId) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM roles WHERE id = ?1)",
        params![id.0],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn require_role(conn: &Connection, id: RoleId) -> Result<()> {
    if role_exists(conn, id)? {
        Ok(())
    } else {
        Err(StoreError::RoleNotFound(id))
    }
}

fn load_role(conn: &Connection, id: RoleId) -> Result<Option<Role>> {
    conn.query_row(
        &format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = ?1"),
        params![id.0],
        row_to_role,
    )
    .optional()
    .map_err(StoreError::from)
}

fn list_grants_in(
    conn: &Connection,
    actor: &ObjectRef,
    scope: Option<&ObjectRef>,
) -> Result<BTreeSet<PermissionHandle>> {
    let (scope_type, scope_id) = scope_params(scope);
    let mut stmt = conn.prepare_cached(
        "SELECT permission FROM actor_permissions
         WHERE actor_type = ?1 AND actor_id = ?2 AND scope_type IS ?3 AND scope_id IS ?4",
    )?;
    let handles = stmt
        .query_map(
            params![actor.kind.as_str(), actor.id, scope_type, scope_id],
            |row| row.get::<_, String>(0).map(PermissionHandle::from),
        )?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(handles)
}

fn insert_grants<'a>(
    conn: &Connection,
    actor: &ObjectRef,
    scope: Option<&ObjectRef>,
    handles: impl IntoIterator<Item = &'a PermissionHandle>,
) -> Result<usize> {
    let (scope_type, scope_id) = scope_params(scope);
    let now = now_millis();
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO actor_permissions
            (actor_type, actor_id, scope_type, scope_id, permission, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )?;
    let mut inserted = 0;
    for handle in handles {
        inserted += stmt.execute(params![
            actor.kind.as_str(),
            actor.id,
            scope_type,
            scope_id,
            handle.as_str(),
            now,
        ])?;
    }
    Ok(inserted)
}

fn delete_grants<'a>(
    conn: &Connection,
    actor: &ObjectRef,
    scope: Option<&ObjectRef>,
    handles: impl IntoIterator<Item = &'a PermissionHandle>,
) -> Result<usize> {
    let (scope_type, scope_id) = scope_params(scope);
    let mut stmt = conn.prepare_cached(
        "DELETE FROM actor_permissions
         WHERE actor_type = ?1 AND actor_id = ?2 AND scope_type IS ?3 AND scope_id IS ?4
           AND permission = ?5",
    )?;
    let mut removed = 0;
    for handle in handles {
        removed += stmt.execute(params![
            actor.kind.as_str(),
            actor.id,
            scope_type,
            scope_id,
            handle.as_str(),
        ])?;
    }
    Ok(removed)
}

fn assigned_role_ids(
    conn: &Connection,
    actor: &ObjectRef,
    scope: Option<&ObjectRef>,
) -> Result<BTreeSet<RoleId>> {
    let (scope_type, scope_id) = scope_params(scope);
    let mut stmt = conn.prepare_cached(
        "SELECT role_id FROM actor_role
         WHERE actor_type = ?1 AND actor_id = ?2 AND scope_type IS ?3 AND scope_id IS ?4",
    )?;
    let ids = stmt
        .query_map(
            params![actor.kind.as_str(), actor.id, scope_type, scope_id],
            |row| row.get::<_, i64>(0).map(RoleId),
        )?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(ids)
}

fn insert_assignments<'a>(
    conn: &Connection,
    actor: &ObjectRef,
    scope: Option<&ObjectRef>,
    roles: impl IntoIterator<Item = &'a RoleId>,
) -> Result<usize> {
    let (scope_type, scope_id) = scope_params(scope);
    let now = now_millis();
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO actor_role
            (actor_type, actor_id, role_id, scope_type, scope_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )?;
    let mut inserted = 0;
    for role in roles {
        require_role(conn, *role)?;
        inserted += stmt.execute(params![
            actor.kind.as_str(),
            actor.id,
            role.0,
            scope_type,
            scope_id,
            now,
        ])?;
    }
    Ok(inserted)
}

fn delete_assignments<'a>(
    conn: &Connection,
    actor: &ObjectRef,
    scope: Option<&ObjectRef>,
    roles: impl IntoIterator<Item = &'a RoleId>,
) -> Result<usize> {
    let (scope_type, scope_id) = scope_params(scope);
    let mut stmt = conn.prepare_cached(
        "DELETE FROM actor_role
         WHERE actor_type = ?1 AND actor_id = ?2 AND role_id = ?3
           AND scope_type IS ?4 AND scope_id IS ?5",
    )?;
    let mut removed = 0;
    for role in roles {
        removed += stmt.execute(params![
            actor.kind.as_str(),
            actor.id,
            role.0,
            scope_type,
            scope_id,
        ])?;
    }
    Ok(removed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Role Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RoleStore for SqliteStore {
    async fn create_role(&self, role: &NewRole) -> Result<Role> {
        let role = role.clone();

        self.run(move |conn| {
            let (tenant_type, tenant_id) = scope_params(role.tenant.as_ref());
            let translations = encode_translations(&role.translations)?;
            let now = now_millis();

            let result = conn.execute(
                "INSERT INTO roles (
                    tenant_type, tenant_id, actor_type, scope_type, handle, name,
                    translations, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    tenant_type,
                    tenant_id,
                    role.actor_type.as_ref().map(MorphType::as_str),
                    role.scope_type.as_ref().map(MorphType::as_str),
                    role.handle,
                    role.name,
                    translations,
                    now,
                ],
            );

            match result {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(StoreError::Conflict(format!(
                        "role '{}' already exists for this actor type, scope type and tenant",
                        role.handle
                    )));
                }
                Err(e) => return Err(e.into()),
            }

            let id = RoleId(conn.last_insert_rowid());
            tracing::debug!(role = %role.handle, %id, "created role");
            Ok(role.into_role(id))
        })
        .await
    }

    async fn get_role(&self, id: RoleId) -> Result<Option<Role>> {
        self.run(move |conn| load_role(conn, id)).await
    }

    async fn get_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>> {
        let ids: BTreeSet<RoleId> = ids.iter().copied().collect();

        self.run(move |conn| {
            let mut roles = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(role) = load_role(conn, id)? {
                    roles.push(role);
                }
            }
            Ok(roles)
        })
        .await
    }

    async fn find_roles(&self, handle: &str, tenant: Option<&ObjectRef>) -> Result<Vec<Role>> {
        let handle = handle.to_owned();
        let (tenant_type, tenant_id) = scope_params(tenant);

        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ROLE_COLUMNS} FROM roles
                 WHERE handle = ?1 AND tenant_type IS ?2 AND tenant_id IS ?3
                 ORDER BY id"
            ))?;
            let roles = stmt
                .query_map(params![handle, tenant_type, tenant_id], row_to_role)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(roles)
        })
        .await
    }

    async fn roles_for_tenant(&self, tenant: &ObjectRef) -> Result<Vec<Role>> {
        let tenant = tenant.clone();

        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ROLE_COLUMNS} FROM roles
                 WHERE tenant_type = ?1 AND tenant_id = ?2
                 ORDER BY id"
            ))?;
            let roles = stmt
                .query_map(params![tenant.kind.as_str(), tenant.id], row_to_role)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(roles)
        })
        .await
    }

    async fn set_translation(
        &self,
        id: RoleId,
        field: &str,
        locale: &str,
        value: &str,
    ) -> Result<()> {
        let field = field.to_owned();
        let locale = locale.to_owned();
        let value = value.to_owned();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let mut role = load_role(&tx, id)?
                .ok_or(StoreError::RoleNotFound(id))?;
            role.translations
                .entry(field)
                .or_default()
                .insert(locale, value);

            tx.execute(
                "UPDATE roles SET translations = ?1, updated_at = ?2 WHERE id = ?3",
                params![encode_translations(&role.translations)?, now_millis(), id.0],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete_role(&self, id: RoleId) -> Result<bool> {
        self.run(move |conn| {
            let tx = conn.transaction()?;

            let permissions =
                tx.execute("DELETE FROM role_permissions WHERE role_id = ?1", params![id.0])?;
            let assignments =
                tx.execute("DELETE FROM actor_role WHERE role_id = ?1", params![id.0])?;
            let deleted = tx.execute("DELETE FROM roles WHERE id = ?1", params![id.0])?;

            tx.commit()?;

            if deleted > 0 {
                tracing::debug!(%id, permissions, assignments, "deleted role");
            }
            Ok(deleted > 0)
        })
        .await
    }

    async fn add_role_permissions(
        &self,
        id: RoleId,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let handles = handles.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            require_role(&tx, id)?;

            let now = now_millis();
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT OR IGNORE INTO role_permissions (role_id, permission, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)",
                )?;
                for handle in &handles {
                    inserted += stmt.execute(params![id.0, handle.as_str(), now])?;
                }
            }

            tx.commit()?;
            Ok(inserted)
        })
        .await
    }

    async fn remove_role_permissions(
        &self,
        id: RoleId,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let handles = handles.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;
            {
                let mut stmt = tx.prepare_cached(
                    "DELETE FROM role_permissions WHERE role_id = ?1 AND permission = ?2",
                )?;
                for handle in &handles {
                    removed += stmt.execute(params![id.0, handle.as_str()])?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn role_permissions(&self, id: RoleId) -> Result<BTreeSet<PermissionHandle>> {
        self.run(move |conn| {
            let mut stmt =
                conn.prepare_cached("SELECT permission FROM role_permissions WHERE role_id = ?1")?;
            let handles = stmt
                .query_map(params![id.0], |row| {
                    row.get::<_, String>(0).map(PermissionHandle::from)
                })?
                .collect::<rusqlite::Result<BTreeSet<_>>>()?;
            Ok(handles)
        })
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grant Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl GrantStore for SqliteStore {
    async fn grant(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let actor = actor.clone();
        let scope = scope.cloned();
        let handles = handles.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let inserted = insert_grants(&tx, &actor, scope.as_ref(), &handles)?;
            tx.commit()?;
            Ok(inserted)
        })
        .await
    }

    async fn revoke(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let actor = actor.clone();
        let scope = scope.cloned();
        let handles = handles.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let removed = delete_grants(&tx, &actor, scope.as_ref(), &handles)?;
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn revoke_everywhere(
        &self,
        actor: &ObjectRef,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let actor = actor.clone();
        let handles = handles.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;
            {
                let mut stmt = tx.prepare_cached(
                    "DELETE FROM actor_permissions
                     WHERE actor_type = ?1 AND actor_id = ?2 AND permission = ?3",
                )?;
                for handle in &handles {
                    removed += stmt.execute(params![actor.kind.as_str(), actor.id, handle.as_str()])?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn has_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<bool> {
        let wanted: BTreeSet<PermissionHandle> = handles.iter().cloned().collect();
        if wanted.is_empty() {
            return Ok(true);
        }

        let actor = actor.clone();
        let (scope_type, scope_id) = scope_params(scope);

        self.run(move |conn| {
            let placeholders = vec!["?"; wanted.len()].join(", ");
            let sql = format!(
                "SELECT COUNT(DISTINCT permission) FROM actor_permissions
                 WHERE actor_type = ? AND actor_id = ? AND scope_type IS ? AND scope_id IS ?
                   AND permission IN ({placeholders})"
            );

            let mut values: Vec<Option<String>> = vec![
                Some(actor.kind.as_str().to_owned()),
                Some(actor.id.clone()),
                scope_type,
                scope_id,
            ];
            values.extend(wanted.iter().map(|h| Some(h.as_str().to_owned())));

            let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
            Ok(count as usize == wanted.len())
        })
        .await
    }

    async fn list_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<BTreeSet<PermissionHandle>> {
        let actor = actor.clone();
        let scope = scope.cloned();

        self.run(move |conn| list_grants_in(conn, &actor, scope.as_ref()))
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assignment Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AssignmentStore for SqliteStore {
    async fn assign(
        &self,
        actor: &ObjectRef,
        roles: &[RoleId],
        scope: Option<&ObjectRef>,
    ) -> Result<usize> {
        let actor = actor.clone();
        let scope = scope.cloned();
        let roles = roles.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let inserted = insert_assignments(&tx, &actor, scope.as_ref(), &roles)?;
            tx.commit()?;
            Ok(inserted)
        })
        .await
    }

    async fn unassign(
        &self,
        actor: &ObjectRef,
        roles: &[RoleId],
        scope: Option<&ObjectRef>,
    ) -> Result<usize> {
        let actor = actor.clone();
        let scope = scope.cloned();
        let roles = roles.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let removed = delete_assignments(&tx, &actor, scope.as_ref(), &roles)?;
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn assigned_roles(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<Vec<Role>> {
        let actor = actor.clone();
        let (scope_type, scope_id) = scope_params(scope);

        self.run(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT r.id AS id, r.tenant_type AS tenant_type, r.tenant_id AS tenant_id,
                        r.actor_type AS actor_type, r.scope_type AS scope_type,
                        r.handle AS handle, r.name AS name, r.translations AS translations
                 FROM actor_role ar JOIN roles r ON r.id = ar.role_id
                 WHERE ar.actor_type = ?1 AND ar.actor_id = ?2
                   AND ar.scope_type IS ?3 AND ar.scope_id IS ?4
                 ORDER BY r.id",
            )?;
            let roles = stmt
                .query_map(
                    params![actor.kind.as_str(), actor.id, scope_type, scope_id],
                    row_to_role,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(roles)
        })
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot and Sync Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AuthStore for SqliteStore {
    async fn snapshot(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<GrantSnapshot> {
        let actor = actor.clone();
        let scope = scope.cloned();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let direct = list_grants_in(&tx, &actor, scope.as_ref())?;

            let (scope_type, scope_id) = scope_params(scope.as_ref());
            let via_roles = {
                let mut stmt = tx.prepare_cached(
                    "SELECT DISTINCT rp.permission
                     FROM actor_role ar JOIN role_permissions rp ON rp.role_id = ar.role_id
                     WHERE ar.actor_type = ?1 AND ar.actor_id = ?2
                       AND ar.scope_type IS ?3 AND ar.scope_id IS ?4",
                )?;
                let rows = stmt.query_map(
                    params![actor.kind.as_str(), actor.id, scope_type, scope_id],
                    |row| row.get::<_, String>(0).map(PermissionHandle::from),
                )?;
                rows.collect::<rusqlite::Result<BTreeSet<_>>>()?
            };

            tx.commit()?;
            Ok(GrantSnapshot { direct, via_roles })
        })
        .await
    }

    async fn sync_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        desired: &BTreeSet<PermissionHandle>,
    ) -> Result<SyncReport<PermissionHandle>> {
        let actor = actor.clone();
        let scope = scope.cloned();
        let desired = desired.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let current = list_grants_in(&tx, &actor, scope.as_ref())?;
            let changes = diff(&current, &desired);

            delete_grants(&tx, &actor, scope.as_ref(), &changes.to_remove)?;
            insert_grants(&tx, &actor, scope.as_ref(), &changes.to_add)?;

            tx.commit()?;
            Ok(SyncReport::from(changes))
        })
        .await
    }

    async fn sync_assignments(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        desired: &BTreeSet<RoleId>,
    ) -> Result<SyncReport<RoleId>> {
        let actor = actor.clone();
        let scope = scope.cloned();
        let desired = desired.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let current = assigned_role_ids(&tx, &actor, scope.as_ref())?;
            let changes = diff(&current, &desired);

            delete_assignments(&tx, &actor, scope.as_ref(), &changes.to_remove)?;
            // Fails with RoleNotFound before commit if a role is missing.
            insert_assignments(&tx, &actor, scope.as_ref(), &changes.to_add)?;

            tx.commit()?;
            Ok(SyncReport::from(changes))
        })
        .await
    }
}
