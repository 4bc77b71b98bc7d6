//! Role definitions and assignment constraints.
//!
//! A role is a named bundle of permissions. Its constraints (actor type, scope
//! type, tenant) are checked when it is assigned, because eligibility depends
//! on the assigning actor and scope rather than on the role alone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConstraintViolation, CoreError, Result};
use crate::morph::{MorphMap, ObjectRef};
use crate::types::{MorphType, RoleId};

/// Localized text: field → locale → value.
pub type Translations = BTreeMap<String, BTreeMap<String, String>>;

/// How a role's tenant is matched at assignment time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantPolicy {
    /// Only checked when the assignment supplies a tenant; the role must then
    /// belong to exactly that tenant.
    #[default]
    Context,
    /// As `Context`, and a tenant-owned role additionally requires either a
    /// matching explicit tenant or a scope that is the tenant itself.
    Strict,
}

/// A persisted role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub handle: String,
    pub name: Option<String>,
    pub tenant: Option<ObjectRef>,
    pub actor_type: Option<MorphType>,
    pub scope_type: Option<MorphType>,
    #[serde(default)]
    pub translations: Translations,
}

impl Role {
    /// Look up a translated field.
    ///
    /// Tries `locale`, then `fallback_locale`, then the raw `name` column when
    /// `field == "name"`. Empty strings count as missing.
    pub fn translation(&self, field: &str, locale: &str, fallback_locale: &str) -> Option<&str> {
        let by_locale = self.translations.get(field);
        let lookup = |loc: &str| {
            by_locale
                .and_then(|m| m.get(loc))
                .map(String::as_str)
                .filter(|s| !s.is_empty())
        };

        lookup(locale)
            .or_else(|| lookup(fallback_locale))
            .or_else(|| match field {
                "name" => self.name.as_deref(),
                _ => None,
            })
    }

    /// The name to show for this role, falling back to its handle.
    pub fn display_name(&self, locale: &str, fallback_locale: &str) -> &str {
        self.translation("name", locale, fallback_locale)
            .unwrap_or(&self.handle)
    }

    /// Whether `actor` and `scope` satisfy the role's type constraints.
    ///
    /// Types are compared after normalization through `morphs`. The scope type
    /// is only checked when a scope is given.
    pub fn fits(&self, actor: &ObjectRef, scope: Option<&ObjectRef>, morphs: &MorphMap) -> bool {
        self.actor_fits(actor, morphs) && self.scope_fits(scope, morphs)
    }

    fn actor_fits(&self, actor: &ObjectRef, morphs: &MorphMap) -> bool {
        self.actor_type
            .as_ref()
            .map_or(true, |t| morphs.same_type(t.as_str(), actor.kind.as_str()))
    }

    fn scope_fits(&self, scope: Option<&ObjectRef>, morphs: &MorphMap) -> bool {
        match (&self.scope_type, scope) {
            (Some(t), Some(scope)) => morphs.same_type(t.as_str(), scope.kind.as_str()),
            _ => true,
        }
    }

    /// Check that this role may be assigned to `actor` in `scope`.
    pub fn validate_assignment(
        &self,
        actor: &ObjectRef,
        scope: Option<&ObjectRef>,
        tenant: Option<&ObjectRef>,
        policy: TenantPolicy,
        morphs: &MorphMap,
    ) -> Result<()> {
        if let Some(expected) = &self.actor_type {
            if !self.actor_fits(actor, morphs) {
                return Err(self.violation(ConstraintViolation::ActorType {
                    expected: expected.clone(),
                    actual: actor.kind.clone(),
                }));
            }
        }

        if let (Some(expected), Some(scope)) = (&self.scope_type, scope) {
            if !self.scope_fits(Some(scope), morphs) {
                return Err(self.violation(ConstraintViolation::ScopeType {
                    expected: expected.clone(),
                    actual: scope.kind.clone(),
                }));
            }
        }

        let tenant_ok = match (policy, tenant) {
            (_, Some(context)) => self.tenant.as_ref() == Some(context),
            (TenantPolicy::Context, None) => true,
            (TenantPolicy::Strict, None) => match &self.tenant {
                Some(owner) => scope == Some(owner),
                None => true,
            },
        };

        if !tenant_ok {
            return Err(self.violation(ConstraintViolation::Tenant {
                expected: self.tenant.as_ref().map(ToString::to_string),
            }));
        }

        Ok(())
    }

    fn violation(&self, violation: ConstraintViolation) -> CoreError {
        CoreError::RoleConstraintViolation {
            role: self.handle.clone(),
            violation,
        }
    }
}

/// A role that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub handle: String,
    pub name: Option<String>,
    pub tenant: Option<ObjectRef>,
    pub actor_type: Option<MorphType>,
    pub scope_type: Option<MorphType>,
    #[serde(default)]
    pub translations: Translations,
}

impl NewRole {
    /// Start a role definition with the given handle.
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    /// Set the display name.
    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Make the role owned by a tenant.
    pub fn tenant(self, tenant: ObjectRef) -> Self {
        Self {
            tenant: Some(tenant),
            ..self
        }
    }

    /// Only allow actors of this type.
    pub fn for_actor_type(self, actor_type: impl Into<MorphType>) -> Self {
        Self {
            actor_type: Some(actor_type.into()),
            ..self
        }
    }

    /// Only allow scopes of this type.
    pub fn on_scope_type(self, scope_type: impl Into<MorphType>) -> Self {
        Self {
            scope_type: Some(scope_type.into()),
            ..self
        }
    }

    /// Add a translated value for a field.
    pub fn translation(
        mut self,
        field: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.translations
            .entry(field.into())
            .or_default()
            .insert(locale.into(), value.into());
        self
    }

    /// Materialize with a store-assigned id.
    pub fn into_role(self, id: RoleId) -> Role {
        Role {
            id,
            handle: self.handle,
            name: self.name,
            tenant: self.tenant,
            actor_type: self.actor_type,
            scope_type: self.scope_type,
            translations: self.translations,
        }
    }
}
