//! Role management, assignment constraints, and tenants.

use warrant::core::{permissions, roles, ConstraintViolation, CoreError, ImplicationMode, NewRole};
use warrant::store::{AuthStore, MemoryStore, SqliteStore};
use warrant::{Authorizer, AuthorizerConfig, AuthzError, StaticPrincipal, TenantPolicy};
use warrant_testkit::{
    init_tracing, memory_authorizer, sample_catalog, sqlite_authorizer, Account, Client, Post,
    Project, User,
};

/// Run an async scenario against the memory store and in-memory SQLite.
macro_rules! on_every_store {
    ($mode:expr, $scenario:ident) => {{
        init_tracing();
        $scenario(&memory_authorizer($mode)).await?;
        $scenario(&sqlite_authorizer($mode)?).await?;
    }};
}

fn violation(err: &AuthzError) -> Option<&ConstraintViolation> {
    match err {
        AuthzError::Validation(CoreError::RoleConstraintViolation { violation, .. }) => {
            Some(violation)
        }
        _ => None,
    }
}

async fn actor_and_scope_constraints<S: AuthStore>(authz: &Authorizer<S>) -> anyhow::Result<()> {
    let reviewer = authz
        .create_role(
            &NewRole::new("reviewer")
                .for_actor_type("user")
                .on_scope_type("project"),
        )
        .await?;

    let err = authz
        .assign_role(&Client(1).object(), reviewer.id, None)
        .await
        .unwrap_err();
    assert!(matches!(violation(&err), Some(ConstraintViolation::ActorType { .. })));

    let err = authz
        .assign_role(&User(1).object(), reviewer.id, Some(&Post(1).object()))
        .await
        .unwrap_err();
    assert!(matches!(violation(&err), Some(ConstraintViolation::ScopeType { .. })));

    authz
        .assign_role(&User(1).object(), reviewer.id, Some(&Project(1).object()))
        .await?;
    assert!(authz
        .has_role(&User(1).object(), "reviewer", Some(&Project(1).object()))
        .await?);
    Ok(())
}

#[tokio::test]
async fn test_role_actor_and_scope_constraints() -> anyhow::Result<()> {
    init_tracing();
    actor_and_scope_constraints(&memory_authorizer(ImplicationMode::default())).await?;
    actor_and_scope_constraints(&sqlite_authorizer(ImplicationMode::default())?).await?;
    Ok(())
}

async fn multi_role_assign_is_atomic<S: AuthStore>(authz: &Authorizer<S>) -> anyhow::Result<()> {
    let user = User(1);
    let writer = authz.create_role(&NewRole::new("writer")).await?;
    let bot = authz
        .create_role(&NewRole::new("bot").for_actor_type("client"))
        .await?;

    assert!(authz
        .assign(&roles([writer.id, bot.id]).for_actor(&user))
        .await
        .is_err());
    assert!(authz.roles_of(&user.object(), None).await?.is_empty());

    assert_eq!(authz.assign(&roles(["writer", "writer"]).for_actor(&user)).await?, 1);
    assert_eq!(authz.assign(&roles([writer.id]).for_actor(&user)).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_multi_role_assign_is_atomic() -> anyhow::Result<()> {
    init_tracing();
    multi_role_assign_is_atomic(&memory_authorizer(ImplicationMode::default())).await?;
    multi_role_assign_is_atomic(&sqlite_authorizer(ImplicationMode::default())?).await?;
    Ok(())
}

async fn cascade_delete<S: AuthStore>(authz: &Authorizer<S>) -> anyhow::Result<()> {
    let user = User(1);
    let editor = authz.create_role(&NewRole::new("editor")).await?;
    authz
        .add_role_permissions(editor.id, ["edit-post", "view-post"])
        .await?;
    authz.assign_role(&user.object(), editor.id, None).await?;
    authz
        .assign_role(&user.object(), editor.id, Some(&Post(1).object()))
        .await?;

    let edit = permissions(["edit-post"]).for_actor(&user);
    assert!(authz.check(&edit).await?);

    assert!(authz.delete_role(editor.id).await?);
    assert!(authz.get_role(editor.id).await?.is_none());
    assert!(authz.role_permissions(editor.id).await?.is_empty());
    assert!(authz.roles_of(&user.object(), None).await?.is_empty());
    assert!(authz
        .roles_of(&user.object(), Some(&Post(1).object()))
        .await?
        .is_empty());
    assert!(!authz.check(&edit).await?);

    assert!(!authz.delete_role(editor.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_delete_role_cascades() -> anyhow::Result<()> {
    init_tracing();
    cascade_delete(&memory_authorizer(ImplicationMode::default())).await?;
    cascade_delete(&sqlite_authorizer(ImplicationMode::default())?).await?;
    Ok(())
}

async fn role_permission_edits<S: AuthStore>(authz: &Authorizer<S>) -> anyhow::Result<()> {
    let user = User(1);
    let editor = authz.create_role(&NewRole::new("editor")).await?;
    authz.assign_role(&user.object(), editor.id, None).await?;

    assert_eq!(authz.add_role_permissions(editor.id, ["edit-post"]).await?, 1);
    assert_eq!(authz.add_role_permissions(editor.id, ["edit-post"]).await?, 0);
    assert!(authz.check(&permissions(["edit-post"]).for_actor(&user)).await?);

    assert_eq!(authz.remove_role_permissions(editor.id, ["edit-post"]).await?, 1);
    assert!(!authz.check(&permissions(["edit-post"]).for_actor(&user)).await?);
    Ok(())
}

#[tokio::test]
async fn test_role_permission_edits_apply_immediately() -> anyhow::Result<()> {
    init_tracing();
    role_permission_edits(&memory_authorizer(ImplicationMode::default())).await?;
    role_permission_edits(&sqlite_authorizer(ImplicationMode::default())?).await?;
    Ok(())
}

async fn any_role_permissions<S: AuthStore>(authz: &Authorizer<S>) -> anyhow::Result<()> {
    let user = User(1);
    let post = Post(1);
    let editor = authz.create_role(&NewRole::new("editor")).await?;
    authz
        .add_role_permissions(editor.id, ["edit-post", "manage-posts"])
        .await?;
    authz.assign_role(&user.object(), editor.id, None).await?;
    authz.allow(&permissions(["delete-post"]).for_actor(&user)).await?;

    let mixed = permissions(["edit-post", "not-registered"]).for_actor(&user);
    assert!(authz.has_any_role_permissions(&mixed).await?);
    assert!(!authz.has_role_permissions(&mixed).await?);

    // Direct grants do not count, and implications are not followed.
    let direct = permissions(["delete-post"]).for_actor(&user);
    assert!(!authz.has_any_role_permissions(&direct).await?);
    let implied = permissions(["view-post"]).for_actor(&user);
    assert!(!authz.has_any_role_permissions(&implied).await?);
    assert!(authz.check(&implied).await?);

    // Exact scope only.
    let scoped = permissions(["edit-post"]).for_actor(&user).on(&post);
    assert!(!authz.has_any_role_permissions(&scoped).await?);
    authz
        .assign_role(&user.object(), editor.id, Some(&post.object()))
        .await?;
    assert!(authz.has_any_role_permissions(&scoped).await?);

    let empty = permissions(Vec::<&str>::new()).for_actor(&user);
    assert!(!authz.has_any_role_permissions(&empty).await?);
    assert!(!authz
        .has_any_role_permissions(&permissions(["edit-post"]))
        .await?);
    Ok(())
}

#[tokio::test]
async fn test_any_role_permissions() -> anyhow::Result<()> {
    on_every_store!(ImplicationMode::Transitive, any_role_permissions);
    Ok(())
}

async fn tenant_context<S: AuthStore>(authz: &Authorizer<S>) -> anyhow::Result<()> {
    let user = User(1);
    let (acme, globex) = (Account(1), Account(2));

    let manager = authz
        .create_role(&NewRole::new("manager").tenant(acme.object()))
        .await?;
    let global = authz.create_role(&NewRole::new("support")).await?;

    // Matching tenant context.
    authz
        .assign(&roles(["manager"]).for_actor(&user).tenant(&acme))
        .await?;

    // Wrong tenant.
    let err = authz
        .assign(&roles([manager.id]).for_actor(&user).tenant(&globex))
        .await
        .unwrap_err();
    assert!(matches!(violation(&err), Some(ConstraintViolation::Tenant { .. })));

    // A global role does not belong to any tenant context.
    let err = authz
        .assign(&roles([global.id]).for_actor(&user).tenant(&acme))
        .await
        .unwrap_err();
    assert!(matches!(violation(&err), Some(ConstraintViolation::Tenant { .. })));

    // Handles resolve within the tenant only.
    let err = authz
        .assign(&roles(["manager"]).for_actor(&user).tenant(&globex))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::UnknownRole(_)));

    // Without a tenant context the tenant is not checked.
    authz
        .assign(&roles([manager.id]).for_actor(&User(2)))
        .await?;

    let owned = authz.roles_for_tenant(&acme.object()).await?;
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, manager.id);
    assert!(authz.roles_for_tenant(&globex.object()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_tenant_context_policy() -> anyhow::Result<()> {
    init_tracing();
    tenant_context(&memory_authorizer(ImplicationMode::default())).await?;
    tenant_context(&sqlite_authorizer(ImplicationMode::default())?).await?;
    Ok(())
}

#[tokio::test]
async fn test_tenant_strict_policy() -> anyhow::Result<()> {
    init_tracing();
    let config = AuthorizerConfig {
        tenant_policy: TenantPolicy::Strict,
        ..AuthorizerConfig::default()
    };
    let authz = Authorizer::new(
        sample_catalog(ImplicationMode::default()),
        MemoryStore::new(),
        config,
    );

    let user = User(1);
    let acme = Account(1);
    let manager = authz
        .create_role(&NewRole::new("manager").tenant(acme.object()))
        .await?;
    let global = authz.create_role(&NewRole::new("support")).await?;

    // Tenant-owned role with no tenant and an unrelated scope.
    let err = authz
        .assign(&roles([manager.id]).for_actor(&user))
        .await
        .unwrap_err();
    assert!(matches!(violation(&err), Some(ConstraintViolation::Tenant { .. })));

    // The scope itself is the tenant.
    authz
        .assign(&roles([manager.id]).for_actor(&user).on(&acme))
        .await?;

    // Explicit tenant.
    authz
        .assign(&roles([manager.id]).for_actor(&user).on(&Post(1)).tenant(&acme))
        .await?;

    // Global roles need no tenant.
    authz.assign(&roles([global.id]).for_actor(&user)).await?;
    Ok(())
}

#[tokio::test]
async fn test_check_roles_by_id_or_handle() -> anyhow::Result<()> {
    init_tracing();
    let authz = memory_authorizer(ImplicationMode::default());
    let user = User(1);
    let post = Post(1);

    let editor = authz.create_role(&NewRole::new("editor")).await?;
    authz
        .assign(&roles([editor.id]).for_actor(&user).on(&post))
        .await?;

    assert!(authz
        .check_roles(&roles(["ghost", "editor"]).for_actor(&user).on(&post))
        .await?);
    assert!(authz
        .check_roles(&roles([editor.id]).for_actor(&user).on(&post))
        .await?);
    assert!(!authz
        .check_roles(&roles([editor.id]).for_actor(&user))
        .await?);
    assert!(!authz
        .check_roles(&roles(Vec::<&str>::new()).for_actor(&user).on(&post))
        .await?);

    assert_eq!(
        authz
            .remove(&roles(["editor"]).for_actor(&user).on(&post))
            .await?,
        1
    );
    assert!(!authz.has_role(&user.object(), editor.id, Some(&post.object())).await?);
    Ok(())
}

#[tokio::test]
async fn test_current_principal_fallback() -> anyhow::Result<()> {
    init_tracing();
    let user = User(5);
    let authz = memory_authorizer(ImplicationMode::default())
        .with_principal(StaticPrincipal(user.object()));

    let editor = authz.create_role(&NewRole::new("editor")).await?;
    authz.add_role_permissions(editor.id, ["edit-post"]).await?;
    authz.assign(&roles([editor.id])).await?;

    assert!(authz.check_roles(&roles(["editor"])).await?);
    assert!(authz.check(&permissions(["edit-post"])).await?);
    assert!(authz
        .check(&permissions(["edit-post"]).for_actor(&user))
        .await?);

    // No provider at all: checks deny, mutations refuse.
    let anonymous = memory_authorizer(ImplicationMode::default());
    assert!(!anonymous.check(&permissions(["edit-post"])).await?);
    assert!(!anonymous.check_all(&permissions(["edit-post"])).await?);
    assert!(matches!(
        anonymous.sync_permissions(&permissions(["edit-post"])).await,
        Err(AuthzError::MissingActor)
    ));
    assert!(matches!(
        anonymous.assign(&roles(["editor"])).await,
        Err(AuthzError::MissingActor)
    ));

    // A provider that yields nobody behaves the same.
    let nobody = memory_authorizer(ImplicationMode::default())
        .with_principal(|| -> Option<warrant::ObjectRef> { None });
    assert!(!nobody.check(&permissions(["edit-post"])).await?);
    Ok(())
}

#[tokio::test]
async fn test_translations_and_display_names() -> anyhow::Result<()> {
    init_tracing();
    let authz = sqlite_authorizer(ImplicationMode::default())?;

    let role = authz
        .create_role(&NewRole::new("account-manager").name("Account manager"))
        .await?;
    authz
        .set_translation(role.id, "name", "es", "Gestor de cuenta")
        .await?;
    authz
        .set_translation(role.id, "description", "en", "Manages one account")
        .await?;

    let role = authz.get_role(role.id).await?.expect("role exists");
    assert_eq!(authz.display_name(&role, "es"), "Gestor de cuenta");
    assert_eq!(authz.display_name(&role, "fr"), "Account manager");
    assert_eq!(
        role.translation("description", "fr", "en"),
        Some("Manages one account")
    );

    let untitled = authz.create_role(&NewRole::new("untitled")).await?;
    assert_eq!(authz.display_name(&untitled, "es"), "untitled");

    let err = authz
        .set_translation(warrant::RoleId(404), "name", "es", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::RoleNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_role_conflicts() -> anyhow::Result<()> {
    let authz = sqlite_authorizer(ImplicationMode::default())?;
    authz.create_role(&NewRole::new("editor")).await?;

    let err = authz.create_role(&NewRole::new("editor")).await.unwrap_err();
    assert!(matches!(
        err,
        AuthzError::Store(warrant::store::StoreError::Conflict(_))
    ));

    // Distinct actor type, scope type, or tenant makes a distinct role.
    authz
        .create_role(&NewRole::new("editor").for_actor_type("client"))
        .await?;
    authz
        .create_role(&NewRole::new("editor").on_scope_type("post"))
        .await?;
    authz
        .create_role(&NewRole::new("editor").tenant(Account(1).object()))
        .await?;
    assert_eq!(authz.find_roles("editor", None).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_sqlite_state_survives_reopen() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("warrant.db");
    let user = User(1);

    {
        let authz = Authorizer::new(
            sample_catalog(ImplicationMode::default()),
            SqliteStore::open(&path)?,
            AuthorizerConfig::default(),
        );
        let editor = authz.create_role(&NewRole::new("editor")).await?;
        authz.add_role_permissions(editor.id, ["manage-posts"]).await?;
        authz
            .assign_role(&user.object(), editor.id, Some(&Post(1).object()))
            .await?;
    }

    let authz = Authorizer::new(
        sample_catalog(ImplicationMode::default()),
        SqliteStore::open(&path)?,
        AuthorizerConfig::default(),
    );
    assert!(authz
        .check(&permissions(["view-post"]).for_actor(&user).on(&Post(1)))
        .await?);
    assert!(authz
        .has_role(&user.object(), "editor", Some(&Post(1).object()))
        .await?);
    Ok(())
}
