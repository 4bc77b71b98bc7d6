//! Error types for the Authorizer.

use thiserror::Error;
use warrant_core::{CoreError, RoleId};
use warrant_store::StoreError;

/// Errors that can occur during Authorizer operations.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Catalog or role-constraint validation failed; nothing was written.
    #[error("validation error: {0}")]
    Validation(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Role id does not exist.
    #[error("role not found: {0}")]
    RoleNotFound(RoleId),

    /// No role with this handle under the requested tenant.
    #[error("no role with handle '{0}'")]
    UnknownRole(String),

    /// A mutation was requested with no actor and no current principal.
    #[error("no actor given and no current principal available")]
    MissingActor,
}

/// Result type for Authorizer operations.
pub type Result<T> = std::result::Result<T, AuthzError>;
