//! Immutable request values.
//!
//! Each chained call returns a new value, so a partially configured request
//! can be shared or reused without one caller's configuration leaking into
//! another's.
//!
//! ```
//! use warrant_core::{permissions, ObjectRef};
//!
//! let user = ObjectRef::new("user", "1");
//! let post = ObjectRef::new("post", "7");
//!
//! let base = permissions(["edit-post", "view-post"]).for_actor(&user);
//! let scoped = base.clone().on(&post);
//!
//! assert!(base.scope().is_none());
//! assert_eq!(scoped.scope(), Some(&post));
//! ```

use serde::{Deserialize, Serialize};

use crate::morph::{Morph, ObjectRef};
use crate::types::{PermissionHandle, RoleId};

/// Start a permissions request for the given handles.
pub fn permissions<I, H>(handles: I) -> PermissionsRequest
where
    I: IntoIterator<Item = H>,
    H: Into<PermissionHandle>,
{
    PermissionsRequest::new(handles)
}

/// Start a roles request for the given roles.
pub fn roles<I, R>(roles: I) -> RolesRequest
where
    I: IntoIterator<Item = R>,
    R: Into<RoleRef>,
{
    RolesRequest::new(roles)
}

/// Which permissions, for whom, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsRequest {
    permissions: Vec<PermissionHandle>,
    actor: Option<ObjectRef>,
    scope: Option<ObjectRef>,
}

impl PermissionsRequest {
    /// Create a request; duplicate handles are collapsed, order is kept.
    pub fn new<I, H>(handles: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<PermissionHandle>,
    {
        let mut permissions: Vec<PermissionHandle> = Vec::new();
        for handle in handles {
            let handle = handle.into();
            if !permissions.contains(&handle) {
                permissions.push(handle);
            }
        }
        Self {
            permissions,
            actor: None,
            scope: None,
        }
    }

    /// Set the actor.
    pub fn for_actor<M: Morph + ?Sized>(self, actor: &M) -> Self {
        Self {
            actor: Some(ObjectRef::of(actor)),
            ..self
        }
    }

    /// Narrow to a scope.
    pub fn on<M: Morph + ?Sized>(self, scope: &M) -> Self {
        Self {
            scope: Some(ObjectRef::of(scope)),
            ..self
        }
    }

    /// Narrow to an optional scope.
    pub fn on_opt(self, scope: Option<&ObjectRef>) -> Self {
        Self {
            scope: scope.cloned(),
            ..self
        }
    }

    /// The requested handles, in request order.
    pub fn permissions(&self) -> &[PermissionHandle] {
        &self.permissions
    }

    /// The actor, if one was set.
    pub fn actor(&self) -> Option<&ObjectRef> {
        self.actor.as_ref()
    }

    /// The scope; `None` means unscoped.
    pub fn scope(&self) -> Option<&ObjectRef> {
        self.scope.as_ref()
    }
}

/// A role referenced by id or by handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleRef {
    Id(RoleId),
    Handle(String),
}

impl RoleRef {
    /// Whether this reference names `role`.
    pub fn matches(&self, role: &crate::role::Role) -> bool {
        match self {
            RoleRef::Id(id) => *id == role.id,
            RoleRef::Handle(handle) => *handle == role.handle,
        }
    }
}

impl From<RoleId> for RoleRef {
    fn from(id: RoleId) -> Self {
        RoleRef::Id(id)
    }
}

impl From<&crate::role::Role> for RoleRef {
    fn from(role: &crate::role::Role) -> Self {
        RoleRef::Id(role.id)
    }
}

impl From<&str> for RoleRef {
    fn from(handle: &str) -> Self {
        RoleRef::Handle(handle.to_owned())
    }
}

impl From<String> for RoleRef {
    fn from(handle: String) -> Self {
        RoleRef::Handle(handle)
    }
}

/// Which roles, for whom, where, and under which tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesRequest {
    roles: Vec<RoleRef>,
    actor: Option<ObjectRef>,
    scope: Option<ObjectRef>,
    tenant: Option<ObjectRef>,
}

impl RolesRequest {
    /// Create a request for the given roles.
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            actor: None,
            scope: None,
            tenant: None,
        }
    }

    /// Set the actor.
    pub fn for_actor<M: Morph + ?Sized>(self, actor: &M) -> Self {
        Self {
            actor: Some(ObjectRef::of(actor)),
            ..self
        }
    }

    /// Narrow to a scope.
    pub fn on<M: Morph + ?Sized>(self, scope: &M) -> Self {
        Self {
            scope: Some(ObjectRef::of(scope)),
            ..self
        }
    }

    /// Narrow to an optional scope.
    pub fn on_opt(self, scope: Option<&ObjectRef>) -> Self {
        Self {
            scope: scope.cloned(),
            ..self
        }
    }

    /// Require the roles to belong to this tenant.
    pub fn tenant<M: Morph + ?Sized>(self, tenant: &M) -> Self {
        Self {
            tenant: Some(ObjectRef::of(tenant)),
            ..self
        }
    }

    /// The requested role references.
    pub fn roles(&self) -> &[RoleRef] {
        &self.roles
    }

    /// The actor, if one was set.
    pub fn actor(&self) -> Option<&ObjectRef> {
        self.actor.as_ref()
    }

    /// The scope; `None` means unscoped.
    pub fn scope(&self) -> Option<&ObjectRef> {
        self.scope.as_ref()
    }

    /// The tenant the roles must belong to, if any.
    pub fn tenant_ref(&self) -> Option<&ObjectRef> {
        self.tenant.as_ref()
    }
}
