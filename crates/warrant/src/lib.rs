//! # Warrant
//!
//! The unified API for Warrant: role- and permission-based authorization with
//! scoped grants and an implication graph.
//!
//! ## Overview
//!
//! Warrant decides whether an *actor* holds a *permission*, optionally
//! narrowed to a *scope* (a concrete resource). An actor holds a permission
//! when it was granted directly, when it comes from a role assigned to the
//! actor, or when any held permission implies it.
//!
//! - **Catalog**: registered permissions, their eligible actor/scope types, and implications
//! - **Grants**: direct actor → permission records
//! - **Roles**: named permission bundles with actor, scope, and tenant constraints
//! - **Assignments**: actor → role records
//!
//! Grants and assignments match their scope exactly: an unscoped grant does
//! not satisfy a check on a scope, and a grant on one scope does not satisfy
//! a check on another.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use warrant::core::{permissions, Catalog, ObjectRef};
//! use warrant::store::SqliteStore;
//! use warrant::{Authorizer, AuthorizerConfig};
//!
//! async fn example() -> warrant::Result<()> {
//!     let mut catalog = Catalog::new();
//!     catalog.register("manage-posts")?.implies(["view-post"]);
//!     catalog.register("view-post")?;
//!
//!     let store = SqliteStore::open("warrant.db")?;
//!     let authz = Authorizer::new(catalog, store, AuthorizerConfig::default());
//!
//!     let user = ObjectRef::new("user", "1");
//!     authz.allow(&permissions(["manage-posts"]).for_actor(&user)).await?;
//!
//!     assert!(authz.check(&permissions(["view-post"]).for_actor(&user)).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `warrant::core` - Catalog, roles, requests, and resolution
//! - `warrant::store` - Storage traits with SQLite and in-memory backends

pub mod authorizer;
pub mod config;
pub mod error;
pub mod principal;

// Re-export component crates
pub use warrant_core as core;
pub use warrant_store as store;

// Re-export main types for convenience
pub use authorizer::Authorizer;
pub use config::AuthorizerConfig;
pub use error::{AuthzError, Result};
pub use principal::{PrincipalProvider, StaticPrincipal};

// Re-export commonly used core types
pub use warrant_core::{
    permissions, roles, Catalog, Decision, ImplicationMode, Morph, NewRole, ObjectRef,
    PermissionHandle, PermissionsRequest, Quantifier, Role, RoleId, RoleRef, RolesRequest,
    SyncReport, TenantPolicy,
};
