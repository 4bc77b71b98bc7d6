//! Error types for Warrant Core.

use thiserror::Error;

use crate::types::{MorphType, PermissionHandle};

/// Validation errors raised before any write reaches a store.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("permission '{0}' is not registered")]
    UnregisteredPermission(PermissionHandle),

    #[error(
        "permission '{permission}' is not allowed for actor type '{actor_type}' and scope type '{}'",
        .scope_type.as_ref().map(MorphType::as_str).unwrap_or("")
    )]
    IneligibleActorOrScope {
        permission: PermissionHandle,
        actor_type: MorphType,
        scope_type: Option<MorphType>,
    },

    #[error("role '{role}' rejects assignment: {violation}")]
    RoleConstraintViolation {
        role: String,
        violation: ConstraintViolation,
    },

    #[error("invalid permission handle: {0:?}")]
    InvalidHandle(String),
}

/// The specific role constraint an assignment failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    #[error("actor type '{actual}' is not allowed (role requires '{expected}')")]
    ActorType {
        expected: MorphType,
        actual: MorphType,
    },

    #[error("scope type '{actual}' is not allowed (role requires '{expected}')")]
    ScopeType {
        expected: MorphType,
        actual: MorphType,
    },

    #[error("role does not belong to tenant {}", .expected.as_deref().unwrap_or("<none>"))]
    Tenant { expected: Option<String> },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ineligible_message_without_scope() {
        let err = CoreError::IneligibleActorOrScope {
            permission: "view-account".into(),
            actor_type: "user".into(),
            scope_type: None,
        };
        assert_eq!(
            err.to_string(),
            "permission 'view-account' is not allowed for actor type 'user' and scope type ''"
        );
    }

    #[test]
    fn test_role_violation_message() {
        let err = CoreError::RoleConstraintViolation {
            role: "editor".into(),
            violation: ConstraintViolation::Tenant {
                expected: Some("account#1".into()),
            },
        };
        assert!(err.to_string().contains("account#1"));
    }
}
