//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use warrant_core::{
    diff, GrantSnapshot, NewRole, ObjectRef, PermissionHandle, Role, RoleId, SyncReport,
};

use crate::error::{Result, StoreError};
use crate::traits::{AssignmentStore, AuthStore, GrantStore, RoleStore};

/// An actor in a scope: the key both grants and assignments are stored under.
type Slot = (ObjectRef, Option<ObjectRef>);

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Last issued role id.
    last_role_id: i64,

    /// Role definitions indexed by id.
    roles: BTreeMap<RoleId, Role>,

    /// Permissions granted to each role.
    role_permissions: BTreeMap<RoleId, BTreeSet<PermissionHandle>>,

    /// Role assignments per actor and scope.
    assignments: HashMap<Slot, BTreeSet<RoleId>>,

    /// Direct grants per actor and scope.
    grants: HashMap<Slot, BTreeSet<PermissionHandle>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn slot(actor: &ObjectRef, scope: Option<&ObjectRef>) -> Slot {
    (actor.clone(), scope.cloned())
}

impl MemoryStoreInner {
    fn require_role(&self, id: RoleId) -> Result<()> {
        if self.roles.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::RoleNotFound(id))
        }
    }

    /// Apply a role-set change for one slot, rejecting it whole if any added
    /// role is missing.
    fn replace_assignments(
        &mut self,
        key: Slot,
        to_add: &BTreeSet<RoleId>,
        to_remove: &BTreeSet<RoleId>,
    ) -> Result<()> {
        for id in to_add {
            self.require_role(*id)?;
        }

        let entry = self.assignments.entry(key.clone()).or_default();
        for id in to_remove {
            entry.remove(id);
        }
        entry.extend(to_add.iter().copied());
        if entry.is_empty() {
            self.assignments.remove(&key);
        }
        Ok(())
    }

    fn replace_grants(
        &mut self,
        key: Slot,
        to_add: &BTreeSet<PermissionHandle>,
        to_remove: &BTreeSet<PermissionHandle>,
    ) {
        let entry = self.grants.entry(key.clone()).or_default();
        for handle in to_remove {
            entry.remove(handle);
        }
        entry.extend(to_add.iter().cloned());
        if entry.is_empty() {
            self.grants.remove(&key);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RoleStore for MemoryStore {
    async fn create_role(&self, role: &NewRole) -> Result<Role> {
        let mut inner = self.write()?;

        let duplicate = inner.roles.values().any(|r| {
            r.handle == role.handle
                && r.actor_type == role.actor_type
                && r.scope_type == role.scope_type
                && r.tenant == role.tenant
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "role '{}' already exists for this actor type, scope type and tenant",
                role.handle
            )));
        }

        inner.last_role_id += 1;
        let id = RoleId(inner.last_role_id);
        let created = role.clone().into_role(id);
        inner.roles.insert(id, created.clone());

        tracing::debug!(role = %created.handle, %id, "created role");
        Ok(created)
    }

    async fn get_role(&self, id: RoleId) -> Result<Option<Role>> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    async fn get_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>> {
        let inner = self.read()?;
        let ids: BTreeSet<RoleId> = ids.iter().copied().collect();
        Ok(ids
            .into_iter()
            .filter_map(|id| inner.roles.get(&id).cloned())
            .collect())
    }

    async fn find_roles(&self, handle: &str, tenant: Option<&ObjectRef>) -> Result<Vec<Role>> {
        let inner = self.read()?;
        Ok(inner
            .roles
            .values()
            .filter(|r| r.handle == handle && r.tenant.as_ref() == tenant)
            .cloned()
            .collect())
    }

    async fn roles_for_tenant(&self, tenant: &ObjectRef) -> Result<Vec<Role>> {
        let inner = self.read()?;
        Ok(inner
            .roles
            .values()
            .filter(|r| r.tenant.as_ref() == Some(tenant))
            .cloned()
            .collect())
    }

    async fn set_translation(
        &self,
        id: RoleId,
        field: &str,
        locale: &str,
        value: &str,
    ) -> Result<()> {
        let mut inner = self.write()?;
        let role = inner
            .roles
            .get_mut(&id)
            .ok_or(StoreError::RoleNotFound(id))?;

        role.translations
            .entry(field.to_owned())
            .or_default()
            .insert(locale.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete_role(&self, id: RoleId) -> Result<bool> {
        let mut inner = self.write()?;

        if inner.roles.remove(&id).is_none() {
            return Ok(false);
        }

        inner.role_permissions.remove(&id);
        inner.assignments.retain(|_, roles| {
            roles.remove(&id);
            !roles.is_empty()
        });

        tracing::debug!(%id, "deleted role");
        Ok(true)
    }

    async fn add_role_permissions(
        &self,
        id: RoleId,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let mut inner = self.write()?;
        inner.require_role(id)?;

        let entry = inner.role_permissions.entry(id).or_default();
        Ok(handles
            .iter()
            .filter(|h| entry.insert((*h).clone()))
            .count())
    }

    async fn remove_role_permissions(
        &self,
        id: RoleId,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let mut inner = self.write()?;
        let Some(entry) = inner.role_permissions.get_mut(&id) else {
            return Ok(0);
        };
        Ok(handles.iter().filter(|h| entry.remove(*h)).count())
    }

    async fn role_permissions(&self, id: RoleId) -> Result<BTreeSet<PermissionHandle>> {
        Ok(self
            .read()?
            .role_permissions
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grant Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl GrantStore for MemoryStore {
    async fn grant(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        if handles.is_empty() {
            return Ok(0);
        }

        let mut inner = self.write()?;
        let entry = inner.grants.entry(slot(actor, scope)).or_default();
        Ok(handles
            .iter()
            .filter(|h| entry.insert((*h).clone()))
            .count())
    }

    async fn revoke(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let mut inner = self.write()?;
        let key = slot(actor, scope);
        let Some(entry) = inner.grants.get_mut(&key) else {
            return Ok(0);
        };

        let removed = handles.iter().filter(|h| entry.remove(*h)).count();
        if entry.is_empty() {
            inner.grants.remove(&key);
        }
        Ok(removed)
    }

    async fn revoke_everywhere(
        &self,
        actor: &ObjectRef,
        handles: &[PermissionHandle],
    ) -> Result<usize> {
        let mut inner = self.write()?;
        let mut removed = 0;

        inner.grants.retain(|(owner, _), granted| {
            if owner == actor {
                removed += handles.iter().filter(|h| granted.remove(*h)).count();
            }
            !granted.is_empty()
        });
        Ok(removed)
    }

    async fn has_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<bool> {
        if handles.is_empty() {
            return Ok(true);
        }

        let inner = self.read()?;
        Ok(match inner.grants.get(&slot(actor, scope)) {
            Some(granted) => handles.iter().all(|h| granted.contains(h)),
            None => false,
        })
    }

    async fn list_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<BTreeSet<PermissionHandle>> {
        Ok(self
            .read()?
            .grants
            .get(&slot(actor, scope))
            .cloned()
            .unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assignment Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn assign(
        &self,
        actor: &ObjectRef,
        roles: &[RoleId],
        scope: Option<&ObjectRef>,
    ) -> Result<usize> {
        let mut inner = self.write()?;
        let key = slot(actor, scope);

        let current = inner.assignments.get(&key).cloned().unwrap_or_default();
        let to_add: BTreeSet<RoleId> = roles
            .iter()
            .copied()
            .filter(|id| !current.contains(id))
            .collect();

        inner.replace_assignments(key, &to_add, &BTreeSet::new())?;
        Ok(to_add.len())
    }

    async fn unassign(
        &self,
        actor: &ObjectRef,
        roles: &[RoleId],
        scope: Option<&ObjectRef>,
    ) -> Result<usize> {
        let mut inner = self.write()?;
        let key = slot(actor, scope);
        let Some(entry) = inner.assignments.get_mut(&key) else {
            return Ok(0);
        };

        let removed = roles.iter().filter(|id| entry.remove(*id)).count();
        if entry.is_empty() {
            inner.assignments.remove(&key);
        }
        Ok(removed)
    }

    async fn assigned_roles(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<Vec<Role>> {
        let inner = self.read()?;
        let Some(ids) = inner.assignments.get(&slot(actor, scope)) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.roles.get(id).cloned())
            .collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot and Sync Operations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AuthStore for MemoryStore {
    async fn snapshot(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<GrantSnapshot> {
        let inner = self.read()?;
        let key = slot(actor, scope);

        let direct = inner.grants.get(&key).cloned().unwrap_or_default();
        let via_roles = inner
            .assignments
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.role_permissions.get(id))
            .flatten()
            .cloned()
            .collect();

        Ok(GrantSnapshot { direct, via_roles })
    }

    async fn sync_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        desired: &BTreeSet<PermissionHandle>,
    ) -> Result<SyncReport<PermissionHandle>> {
        let mut inner = self.write()?;
        let key = slot(actor, scope);

        let current = inner.grants.get(&key).cloned().unwrap_or_default();
        let changes = diff(&current, desired);
        inner.replace_grants(key, &changes.to_add, &changes.to_remove);

        Ok(SyncReport::from(changes))
    }

    async fn sync_assignments(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        desired: &BTreeSet<RoleId>,
    ) -> Result<SyncReport<RoleId>> {
        let mut inner = self.write()?;
        let key = slot(actor, scope);

        let current = inner.assignments.get(&key).cloned().unwrap_or_default();
        let changes = diff(&current, desired);
        inner.replace_assignments(key, &changes.to_add, &changes.to_remove)?;

        Ok(SyncReport::from(changes))
    }
}
