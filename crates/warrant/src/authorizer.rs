//! The Authorizer: unified API for Warrant.
//!
//! The Authorizer brings together the frozen permission catalog and a store
//! into one interface for checking and mutating authorization state. Every
//! mutation is validated against the catalog and role constraints before
//! anything is written.

use std::collections::BTreeSet;
use std::sync::Arc;

use warrant_core::{
    resolve, Catalog, Decision, NewRole, ObjectRef, PermissionHandle, PermissionsRequest,
    Quantifier, Role, RoleId, RoleRef, RolesRequest, SyncReport,
};
use warrant_store::{AuthStore, StoreError};

use crate::config::AuthorizerConfig;
use crate::error::{AuthzError, Result};
use crate::principal::PrincipalProvider;

/// The main Authorizer struct.
///
/// Provides a unified API for:
/// - Checking permissions (`check` / `check_all`)
/// - Granting, revoking, and syncing direct permissions
/// - Assigning, removing, and syncing roles
/// - Managing role definitions
pub struct Authorizer<S: AuthStore> {
    /// Registered permissions, frozen for the lifetime of the Authorizer.
    catalog: Arc<Catalog>,
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: AuthorizerConfig,
    /// Fallback actor when a request names none.
    principal: Option<Arc<dyn PrincipalProvider>>,
}

impl<S: AuthStore> Clone for Authorizer<S> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            principal: self.principal.clone(),
        }
    }
}

impl<S: AuthStore> Authorizer<S> {
    /// Create a new authorizer.
    pub fn new(catalog: impl Into<Arc<Catalog>>, store: S, config: AuthorizerConfig) -> Self {
        Self {
            catalog: catalog.into(),
            store: Arc::new(store),
            config,
            principal: None,
        }
    }

    /// Use `provider` to find the actor when a request names none.
    pub fn with_principal(mut self, provider: impl PrincipalProvider + 'static) -> Self {
        self.principal = Some(Arc::new(provider));
        self
    }

    /// Get the catalog reference.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    fn actor_or_principal(&self, actor: Option<&ObjectRef>) -> Option<ObjectRef> {
        actor
            .cloned()
            .or_else(|| self.principal.as_ref().and_then(|p| p.current()))
    }

    fn require_actor(&self, actor: Option<&ObjectRef>) -> Result<ObjectRef> {
        self.actor_or_principal(actor)
            .ok_or(AuthzError::MissingActor)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checks
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve a request into a full [`Decision`].
    ///
    /// With no actor and no current principal, everything is missing.
    pub async fn decide(
        &self,
        request: &PermissionsRequest,
        quantifier: Quantifier,
    ) -> Result<Decision> {
        let required = request.permissions();

        let Some(actor) = self.actor_or_principal(request.actor()) else {
            tracing::debug!(?quantifier, "no actor for check, denying");
            return Ok(Decision::denied(quantifier, required));
        };

        let snapshot = self.store.snapshot(&actor, request.scope()).await?;
        let decision = resolve(&self.catalog, &snapshot, required, quantifier);

        tracing::debug!(
            %actor,
            scope = ?request.scope(),
            ?quantifier,
            granted = decision.is_granted(),
            missing = decision.missing.len(),
            "authorization decision"
        );
        Ok(decision)
    }

    /// `true` if at least one requested permission is satisfied.
    pub async fn check(&self, request: &PermissionsRequest) -> Result<bool> {
        Ok(self.decide(request, Quantifier::Any).await?.is_granted())
    }

    /// `true` if every requested permission is satisfied.
    pub async fn check_all(&self, request: &PermissionsRequest) -> Result<bool> {
        Ok(self.decide(request, Quantifier::All).await?.is_granted())
    }

    /// `true` if every requested permission is granted directly for exactly
    /// the request's scope. Roles and implications are not consulted.
    pub async fn has_permissions(&self, request: &PermissionsRequest) -> Result<bool> {
        let Some(actor) = self.actor_or_principal(request.actor()) else {
            return Ok(false);
        };
        Ok(self
            .store
            .has_grants(&actor, request.scope(), request.permissions())
            .await?)
    }

    /// Resolve a request against role permissions only, for exactly the
    /// request's scope. Direct grants and implications are not consulted.
    async fn decide_via_roles(
        &self,
        request: &PermissionsRequest,
        quantifier: Quantifier,
    ) -> Result<Decision> {
        let required = request.permissions();
        let Some(actor) = self.actor_or_principal(request.actor()) else {
            return Ok(Decision::denied(quantifier, required));
        };
        let snapshot = self.store.snapshot(&actor, request.scope()).await?;
        Ok(Decision::partition(quantifier, required, &snapshot.via_roles))
    }

    /// `true` if every requested permission comes from a role assigned for
    /// exactly the request's scope. Direct grants and implications are not
    /// consulted.
    pub async fn has_role_permissions(&self, request: &PermissionsRequest) -> Result<bool> {
        if self.actor_or_principal(request.actor()).is_none() {
            return Ok(false);
        }
        Ok(self
            .decide_via_roles(request, Quantifier::All)
            .await?
            .is_granted())
    }

    /// `true` if at least one requested permission comes from a role assigned
    /// for exactly the request's scope.
    pub async fn has_any_role_permissions(&self, request: &PermissionsRequest) -> Result<bool> {
        Ok(self
            .decide_via_roles(request, Quantifier::Any)
            .await?
            .is_granted())
    }

    /// Direct grants for exactly this scope.
    pub async fn direct_permissions(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<BTreeSet<PermissionHandle>> {
        Ok(self.store.list_grants(actor, scope).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Mutations
    // ─────────────────────────────────────────────────────────────────────────

    fn validate_grants(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        handles: &[PermissionHandle],
    ) -> Result<()> {
        for handle in handles {
            let checked =
                self.catalog
                    .ensure_allowed(handle, &actor.kind, scope.map(|s| &s.kind));
            if let Err(e) = checked {
                tracing::warn!(%actor, permission = %handle, error = %e, "rejected grant");
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Grant the requested permissions directly.
    ///
    /// Every handle is validated first; on failure nothing is written.
    /// Returns the number of grants actually inserted.
    pub async fn allow(&self, request: &PermissionsRequest) -> Result<usize> {
        let actor = self.require_actor(request.actor())?;
        let scope = request.scope();
        let handles = request.permissions();

        self.validate_grants(&actor, scope, handles)?;
        let inserted = self.store.grant(&actor, scope, handles).await?;

        tracing::info!(%actor, ?scope, requested = handles.len(), inserted, "allowed permissions");
        Ok(inserted)
    }

    /// Revoke the requested permissions for exactly the request's scope.
    pub async fn deny(&self, request: &PermissionsRequest) -> Result<usize> {
        let actor = self.require_actor(request.actor())?;
        let scope = request.scope();

        let removed = self
            .store
            .revoke(&actor, scope, request.permissions())
            .await?;

        tracing::info!(%actor, ?scope, removed, "denied permissions");
        Ok(removed)
    }

    /// Revoke the requested permissions in every scope. The request's scope
    /// is ignored.
    pub async fn deny_everywhere(&self, request: &PermissionsRequest) -> Result<usize> {
        let actor = self.require_actor(request.actor())?;

        let removed = self
            .store
            .revoke_everywhere(&actor, request.permissions())
            .await?;

        tracing::info!(%actor, removed, "denied permissions in every scope");
        Ok(removed)
    }

    /// Make the direct grants for the request's scope exactly the requested
    /// permissions.
    pub async fn sync_permissions(
        &self,
        request: &PermissionsRequest,
    ) -> Result<SyncReport<PermissionHandle>> {
        let actor = self.require_actor(request.actor())?;
        let scope = request.scope();

        self.validate_grants(&actor, scope, request.permissions())?;

        let desired: BTreeSet<PermissionHandle> = request.permissions().iter().cloned().collect();
        let report = self.store.sync_grants(&actor, scope, &desired).await?;

        tracing::info!(
            %actor,
            ?scope,
            added = report.added.len(),
            removed = report.removed.len(),
            "synced permissions"
        );
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Role Assignment
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve a handle to one role owned by exactly `tenant`.
    ///
    /// When several roles share the handle, the first whose actor and scope
    /// types fit is chosen; otherwise the first one, so that assignment
    /// validation reports the mismatch.
    async fn role_by_handle(
        &self,
        handle: &str,
        tenant: Option<&ObjectRef>,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
    ) -> Result<Role> {
        let candidates = self.store.find_roles(handle, tenant).await?;
        let morphs = self.catalog.morph_map();

        let index = candidates
            .iter()
            .position(|role| role.fits(actor, scope, morphs))
            .unwrap_or(0);
        candidates
            .into_iter()
            .nth(index)
            .ok_or_else(|| AuthzError::UnknownRole(handle.to_owned()))
    }

    async fn resolve_roles(&self, request: &RolesRequest, actor: &ObjectRef) -> Result<Vec<Role>> {
        let mut resolved: Vec<Role> = Vec::with_capacity(request.roles().len());

        for role_ref in request.roles() {
            let role = match role_ref {
                RoleRef::Id(id) => self
                    .store
                    .get_role(*id)
                    .await?
                    .ok_or(AuthzError::RoleNotFound(*id))?,
                RoleRef::Handle(handle) => {
                    self.role_by_handle(handle, request.tenant_ref(), actor, request.scope())
                        .await?
                }
            };

            if !resolved.iter().any(|r| r.id == role.id) {
                resolved.push(role);
            }
        }

        Ok(resolved)
    }

    fn validate_roles(
        &self,
        roles: &[Role],
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        tenant: Option<&ObjectRef>,
    ) -> Result<()> {
        for role in roles {
            let checked = role.validate_assignment(
                actor,
                scope,
                tenant,
                self.config.tenant_policy,
                self.catalog.morph_map(),
            );
            if let Err(e) = checked {
                tracing::warn!(%actor, role = %role.handle, error = %e, "rejected role assignment");
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Assign the requested roles.
    ///
    /// Every role is resolved and validated first; the assignments are then
    /// written atomically. Returns the number of assignments actually inserted.
    pub async fn assign(&self, request: &RolesRequest) -> Result<usize> {
        let actor = self.require_actor(request.actor())?;
        let scope = request.scope();

        let roles = self.resolve_roles(request, &actor).await?;
        self.validate_roles(&roles, &actor, scope, request.tenant_ref())?;

        let ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();
        let inserted = self
            .store
            .assign(&actor, &ids, scope)
            .await
            .map_err(store_error)?;

        tracing::info!(%actor, ?scope, roles = ids.len(), inserted, "assigned roles");
        Ok(inserted)
    }

    /// Assign a single role.
    pub async fn assign_role(
        &self,
        actor: &ObjectRef,
        role: impl Into<RoleRef>,
        scope: Option<&ObjectRef>,
    ) -> Result<usize> {
        let request = RolesRequest::new([role.into()]).for_actor(actor).on_opt(scope);
        self.assign(&request).await
    }

    /// Remove the requested roles from exactly the request's scope.
    ///
    /// Roles are matched by id or handle against the current assignments, so
    /// references to unknown roles remove nothing.
    pub async fn remove(&self, request: &RolesRequest) -> Result<usize> {
        let actor = self.require_actor(request.actor())?;
        let scope = request.scope();

        let ids: Vec<RoleId> = self
            .store
            .assigned_roles(&actor, scope)
            .await?
            .into_iter()
            .filter(|role| request.roles().iter().any(|r| r.matches(role)))
            .map(|role| role.id)
            .collect();

        let removed = self.store.unassign(&actor, &ids, scope).await?;

        tracing::info!(%actor, ?scope, removed, "removed roles");
        Ok(removed)
    }

    /// Remove a single role.
    pub async fn remove_role(
        &self,
        actor: &ObjectRef,
        role: impl Into<RoleRef>,
        scope: Option<&ObjectRef>,
    ) -> Result<usize> {
        let request = RolesRequest::new([role.into()]).for_actor(actor).on_opt(scope);
        self.remove(&request).await
    }

    /// Make the role assignments for the request's scope exactly the
    /// requested roles.
    pub async fn sync_roles(&self, request: &RolesRequest) -> Result<SyncReport<RoleId>> {
        let actor = self.require_actor(request.actor())?;
        let scope = request.scope();

        let roles = self.resolve_roles(request, &actor).await?;
        self.validate_roles(&roles, &actor, scope, request.tenant_ref())?;

        let desired: BTreeSet<RoleId> = roles.iter().map(|r| r.id).collect();
        let report = self
            .store
            .sync_assignments(&actor, scope, &desired)
            .await
            .map_err(store_error)?;

        tracing::info!(
            %actor,
            ?scope,
            added = report.added.len(),
            removed = report.removed.len(),
            "synced roles"
        );
        Ok(report)
    }

    /// `true` if any requested role is assigned for exactly the request's
    /// scope. An empty request or a missing actor is `false`.
    pub async fn check_roles(&self, request: &RolesRequest) -> Result<bool> {
        if request.roles().is_empty() {
            return Ok(false);
        }
        let Some(actor) = self.actor_or_principal(request.actor()) else {
            return Ok(false);
        };

        let assigned = self.store.assigned_roles(&actor, request.scope()).await?;
        Ok(assigned
            .iter()
            .any(|role| request.roles().iter().any(|r| r.matches(role))))
    }

    /// `true` if `role` is assigned to `actor` for exactly `scope`.
    pub async fn has_role(
        &self,
        actor: &ObjectRef,
        role: impl Into<RoleRef>,
        scope: Option<&ObjectRef>,
    ) -> Result<bool> {
        let request = RolesRequest::new([role.into()]).for_actor(actor).on_opt(scope);
        self.check_roles(&request).await
    }

    /// Roles assigned to `actor` for exactly `scope`.
    pub async fn roles_of(&self, actor: &ObjectRef, scope: Option<&ObjectRef>) -> Result<Vec<Role>> {
        Ok(self.store.assigned_roles(actor, scope).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Role Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a new role. Fails with a store conflict if the handle is
    /// already taken for the same tenant.
    pub async fn create_role(&self, role: &NewRole) -> Result<Role> {
        let created = self.store.create_role(role).await?;
        tracing::info!(role = %created.handle, id = %created.id, "created role");
        Ok(created)
    }

    /// Load a role by id.
    pub async fn get_role(&self, id: RoleId) -> Result<Option<Role>> {
        Ok(self.store.get_role(id).await?)
    }

    /// Roles with this handle owned by exactly `tenant` (`None` = global).
    pub async fn find_roles(&self, handle: &str, tenant: Option<&ObjectRef>) -> Result<Vec<Role>> {
        Ok(self.store.find_roles(handle, tenant).await?)
    }

    /// Every role owned by `tenant`.
    pub async fn roles_for_tenant(&self, tenant: &ObjectRef) -> Result<Vec<Role>> {
        Ok(self.store.roles_for_tenant(tenant).await?)
    }

    /// Delete a role with its permissions and assignments.
    pub async fn delete_role(&self, id: RoleId) -> Result<bool> {
        let deleted = self.store.delete_role(id).await?;
        if deleted {
            tracing::info!(%id, "deleted role");
        }
        Ok(deleted)
    }

    /// Grant permissions to a role. Every handle must be registered.
    pub async fn add_role_permissions<I, H>(&self, id: RoleId, handles: I) -> Result<usize>
    where
        I: IntoIterator<Item = H>,
        H: Into<PermissionHandle>,
    {
        let handles: Vec<PermissionHandle> = handles.into_iter().map(Into::into).collect();
        for handle in &handles {
            if let Err(e) = self.catalog.ensure_registered(handle) {
                tracing::warn!(%id, permission = %handle, "rejected role permission");
                return Err(e.into());
            }
        }

        let inserted = self
            .store
            .add_role_permissions(id, &handles)
            .await
            .map_err(store_error)?;

        tracing::info!(%id, inserted, "added role permissions");
        Ok(inserted)
    }

    /// Revoke permissions from a role. Unheld handles are ignored.
    pub async fn remove_role_permissions<I, H>(&self, id: RoleId, handles: I) -> Result<usize>
    where
        I: IntoIterator<Item = H>,
        H: Into<PermissionHandle>,
    {
        let handles: Vec<PermissionHandle> = handles.into_iter().map(Into::into).collect();
        let removed = self.store.remove_role_permissions(id, &handles).await?;

        tracing::info!(%id, removed, "removed role permissions");
        Ok(removed)
    }

    /// Permissions granted to a role.
    pub async fn role_permissions(&self, id: RoleId) -> Result<BTreeSet<PermissionHandle>> {
        Ok(self.store.role_permissions(id).await?)
    }

    /// Store one translated field value on a role.
    pub async fn set_translation(
        &self,
        id: RoleId,
        field: &str,
        locale: &str,
        value: &str,
    ) -> Result<()> {
        self.store
            .set_translation(id, field, locale, value)
            .await
            .map_err(store_error)
    }

    /// A role's name in `locale`, using the configured fallback locale.
    pub fn display_name<'r>(&self, role: &'r Role, locale: &str) -> &'r str {
        role.display_name(locale, &self.config.fallback_locale)
    }
}

fn store_error(err: StoreError) -> AuthzError {
    match err {
        StoreError::RoleNotFound(id) => AuthzError::RoleNotFound(id),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warrant_core::{permissions, roles, CoreError, MorphMap};
    use warrant_store::{AssignmentStore, MemoryStore};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register("edit-post").unwrap();
        catalog.register("view-post").unwrap();
        catalog
            .register("manage-posts")
            .unwrap()
            .implies(["edit-post", "view-post"]);
        catalog
            .register("publish")
            .unwrap()
            .for_actors(["user"])
            .on_scopes(["post"]);
        catalog
    }

    fn authorizer() -> Authorizer<MemoryStore> {
        Authorizer::new(catalog(), MemoryStore::new(), AuthorizerConfig::default())
    }

    fn user(id: &str) -> ObjectRef {
        ObjectRef::new("user", id)
    }

    #[tokio::test]
    async fn test_allow_then_check() {
        let authz = authorizer();
        let u = user("1");

        authz.allow(&permissions(["edit-post"]).for_actor(&u)).await.unwrap();

        assert!(authz.check(&permissions(["edit-post"]).for_actor(&u)).await.unwrap());
        assert!(!authz.check(&permissions(["view-post"]).for_actor(&u)).await.unwrap());
    }

    #[tokio::test]
    async fn test_allow_rejects_unregistered() {
        let authz = authorizer();
        let u = user("1");

        let err = authz
            .allow(&permissions(["edit-post", "nope"]).for_actor(&u))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Validation(CoreError::UnregisteredPermission(_))
        ));
        assert!(authz.direct_permissions(&u, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_actor() {
        let authz = authorizer();

        assert!(!authz.check(&permissions(["edit-post"])).await.unwrap());
        assert!(matches!(
            authz.allow(&permissions(["edit-post"])).await,
            Err(AuthzError::MissingActor)
        ));
    }

    #[tokio::test]
    async fn test_principal_fallback() {
        let u = user("7");
        let authz = authorizer().with_principal(crate::StaticPrincipal(u.clone()));

        authz.allow(&permissions(["edit-post"])).await.unwrap();
        assert!(authz.check(&permissions(["edit-post"])).await.unwrap());
        assert!(authz
            .check(&permissions(["edit-post"]).for_actor(&u))
            .await
            .unwrap());
        assert!(!authz
            .check(&permissions(["edit-post"]).for_actor(&user("8")))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_assign_by_handle_and_check_roles() {
        let authz = authorizer();
        let u = user("1");
        let editor = authz.create_role(&NewRole::new("editor")).await.unwrap();
        authz.add_role_permissions(editor.id, ["edit-post"]).await.unwrap();

        authz.assign(&roles(["editor"]).for_actor(&u)).await.unwrap();

        assert!(authz.has_role(&u, "editor", None).await.unwrap());
        assert!(authz.has_role(&u, editor.id, None).await.unwrap());
        assert!(authz.check(&permissions(["edit-post"]).for_actor(&u)).await.unwrap());
        assert!(authz
            .has_role_permissions(&permissions(["edit-post"]).for_actor(&u))
            .await
            .unwrap());

        assert_eq!(authz.remove_role(&u, "editor", None).await.unwrap(), 1);
        assert!(!authz.has_role(&u, "editor", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_role_handle() {
        let authz = authorizer();
        let err = authz
            .assign(&roles(["ghost"]).for_actor(&user("1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::UnknownRole(h) if h == "ghost"));
    }

    #[tokio::test]
    async fn test_role_permission_requires_registration() {
        let authz = authorizer();
        let role = authz.create_role(&NewRole::new("editor")).await.unwrap();

        let err = authz
            .add_role_permissions(role.id, ["edit-post", "undefined"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Validation(CoreError::UnregisteredPermission(_))
        ));
        assert!(authz.role_permissions(role.id).await.unwrap().is_empty());

        let err = authz
            .add_role_permissions(RoleId(404), ["edit-post"])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::RoleNotFound(RoleId(404))));
    }

    #[tokio::test]
    async fn test_role_missing_at_write_is_role_not_found() {
        let authz = authorizer();
        let u = user("1");
        let gone = authz.create_role(&NewRole::new("temp")).await.unwrap();
        authz.delete_role(gone.id).await.unwrap();

        // The store rejects the write itself, as when the role was deleted
        // after the request was resolved.
        let err = authz
            .store()
            .sync_assignments(&u, None, &BTreeSet::from([gone.id]))
            .await
            .map_err(store_error)
            .unwrap_err();
        assert!(matches!(err, AuthzError::RoleNotFound(id) if id == gone.id));

        let err = authz
            .store()
            .assign(&u, &[gone.id], None)
            .await
            .map_err(store_error)
            .unwrap_err();
        assert!(matches!(err, AuthzError::RoleNotFound(id) if id == gone.id));

        assert!(matches!(
            authz.sync_roles(&roles([gone.id]).for_actor(&u)).await,
            Err(AuthzError::RoleNotFound(id)) if id == gone.id
        ));
    }

    #[tokio::test]
    async fn test_role_type_constraints_follow_morph_map() {
        let catalog = Catalog::new().with_morph_map(MorphMap::new().alias("user", "app::User"));
        let authz = Authorizer::new(catalog, MemoryStore::new(), AuthorizerConfig::default());
        let u = user("1");

        let member = authz
            .create_role(&NewRole::new("member").for_actor_type("app::User"))
            .await
            .unwrap();
        authz.assign(&roles(["member"]).for_actor(&u)).await.unwrap();
        assert!(authz.has_role(&u, member.id, None).await.unwrap());

        let err = authz
            .assign_role(&ObjectRef::new("client", "1"), member.id, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Validation(CoreError::RoleConstraintViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_display_name_uses_fallback_locale() {
        let authz = authorizer();
        let role = authz
            .create_role(&NewRole::new("manager").translation("name", "en", "Manager"))
            .await
            .unwrap();
        authz
            .set_translation(role.id, "name", "es", "Gerente")
            .await
            .unwrap();

        let role = authz.get_role(role.id).await.unwrap().unwrap();
        assert_eq!(authz.display_name(&role, "es"), "Gerente");
        assert_eq!(authz.display_name(&role, "de"), "Manager");
    }
}
