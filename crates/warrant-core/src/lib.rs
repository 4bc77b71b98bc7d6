//! # Warrant Core
//!
//! Pure primitives for Warrant: the permission catalog, role model, request
//! values, resolution, and reconciliation.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! permission sets.
//!
//! ## Key Types
//!
//! - [`Catalog`] - Registered permissions, eligibility, and implications
//! - [`ObjectRef`] - Polymorphic "type + id" reference for actors and scopes
//! - [`Role`] / [`NewRole`] - Role definitions and their assignment constraints
//! - [`GrantSnapshot`] / [`Decision`] - Input and output of [`resolve`]
//! - [`Diff`] / [`SyncReport`] - Reconciliation of current vs desired sets

pub mod catalog;
pub mod error;
pub mod morph;
pub mod reconcile;
pub mod request;
pub mod resolve;
pub mod role;
pub mod types;

pub use catalog::{Catalog, ImplicationMode, Permission, PermissionFilter, Registration};
pub use error::{ConstraintViolation, CoreError, Result};
pub use morph::{Morph, MorphMap, ObjectRef};
pub use reconcile::{diff, Diff, SyncReport};
pub use request::{permissions, roles, PermissionsRequest, RoleRef, RolesRequest};
pub use resolve::{resolve, Decision, GrantSnapshot, Quantifier};
pub use role::{NewRole, Role, TenantPolicy, Translations};
pub use types::{MorphType, PermissionHandle, RoleId};
