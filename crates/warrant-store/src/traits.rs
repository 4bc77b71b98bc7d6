//! Store traits: the persistence contracts for roles, grants, and assignments.
//!
//! These traits keep the engine storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).
//!
//! Stores are catalog-unaware: they persist whatever handles they are given.
//! Validation against the permission catalog and role constraints happens in
//! the engine before any of these methods is called.

use std::collections::BTreeSet;

use async_trait::async_trait;
use warrant_core::{
    GrantSnapshot, NewRole, ObjectRef, PermissionHandle, Role, RoleId, SyncReport,
};

use crate::error::Result;

/// Role definitions and their permission grants.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Persist a new role.
    ///
    /// Fails with `Conflict` if a role with the same handle, actor type,
    /// scope type, and tenant already exists.
    async fn create_role(&self, role: &NewRole) -> Result<Role>;

    /// Get a role by id.
    async fn get_role(&self, id: RoleId) -> Result<Option<Role>>;

    /// Get several roles by id. Missing ids are skipped; order follows id.
    async fn get_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>>;

    /// Roles with this handle owned by exactly `tenant` (`None` = global).
    async fn find_roles(&self, handle: &str, tenant: Option<&ObjectRef>) -> Result<Vec<Role>>;

    /// Roles owned by the given tenant.
    async fn roles_for_tenant(&self, tenant: &ObjectRef) -> Result<Vec<Role>>;

    /// Set one translated value on a role. Fails with `RoleNotFound` if missing.
    async fn set_translation(
        &self,
        id: RoleId,
        field: &str,
        locale: &str,
        value: &str,
    ) -> Result<()>;

    /// Delete a role with its permission grants and assignments.
    ///
    /// Returns `false` if the role did not exist.
    async fn delete_role(&self, id: RoleId) -> Result<bool>;

    /// Add permissions to a role. Existing pairs are left alone.
    ///
    /// Returns the number of pairs actually inserted.
    async fn add_role_permissions(&self, id: RoleId, handles: &[PermissionHandle])
        -> Result<usize>;

    /// Remove permissions from a role. Returns the number removed.
    async fn remove_role_permissions(
        &self,
        id: RoleId,
        handles: &[PermissionHandle],
    ) -> Result<usize>;

    /// The permissions granted to a role.
    async fn role_permissions(&self, id: RoleId) -> Result<BTreeSet<PermissionHandle>>;
}

/// Direct actor → permission grants.
///
/// A `None` scope matches only unscoped grants, never scoped ones.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Grant permissions. Existing grants are left alone.
    ///
    /// Returns the number of grants actually inserted.
    async fn grant(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<usize>;

    /// Revoke permissions for exactly this scope. Returns the number removed.
    async fn revoke(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<usize>;

    /// Revoke permissions across every scope, including unscoped grants.
    async fn revoke_everywhere(&self, actor: &ObjectRef, handles: &[PermissionHandle])
        -> Result<usize>;

    /// Returns `true` if every handle has a direct grant for exactly this scope.
    ///
    /// An empty `handles` slice is vacuously `true`.
    async fn has_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<bool>;

    /// All direct grants for exactly this scope.
    async fn list_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<BTreeSet<PermissionHandle>>;
}

/// Actor → role assignments.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Assign roles atomically. Existing assignments are left alone.
    ///
    /// Fails with `RoleNotFound` (and writes nothing) if any role is missing.
    /// Returns the number of assignments actually inserted.
    async fn assign(
        &self,
        actor: &ObjectRef,
        roles: &[RoleId],
        scope: Option<&ObjectRef>,
    ) -> Result<usize>;

    /// Remove assignments for exactly this scope. Returns the number removed.
    async fn unassign(
        &self,
        actor: &ObjectRef,
        roles: &[RoleId],
        scope: Option<&ObjectRef>,
    ) -> Result<usize>;

    /// Roles assigned for exactly this scope, ordered by id.
    async fn assigned_roles(&self, actor: &ObjectRef, scope: Option<&ObjectRef>)
        -> Result<Vec<Role>>;
}

/// The complete store: all three contracts plus the operations that must read
/// or write across them atomically.
#[async_trait]
pub trait AuthStore: RoleStore + GrantStore + AssignmentStore {
    /// Read direct and role-derived permissions from one consistent snapshot.
    async fn snapshot(&self, actor: &ObjectRef, scope: Option<&ObjectRef>)
        -> Result<GrantSnapshot>;

    /// Make the direct grants for this scope exactly `desired`.
    ///
    /// The current set is read and the diff applied in one transaction.
    async fn sync_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        desired: &BTreeSet<PermissionHandle>,
    ) -> Result<SyncReport<PermissionHandle>>;

    /// Make the role assignments for this scope exactly `desired`.
    ///
    /// Fails with `RoleNotFound` (and writes nothing) if a desired role is missing.
    async fn sync_assignments(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        desired: &BTreeSet<RoleId>,
    ) -> Result<SyncReport<RoleId>>;
}
