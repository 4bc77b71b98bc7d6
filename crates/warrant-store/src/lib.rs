//! # Warrant Store
//!
//! Storage abstraction for Warrant. Provides trait-based interfaces for
//! persisting roles, direct grants, and role assignments, with SQLite and
//! in-memory implementations.
//!
//! ## Overview
//!
//! The engine talks to storage only through [`AuthStore`], which combines
//! [`RoleStore`], [`GrantStore`], and [`AssignmentStore`] with the operations
//! that must be atomic across them. The primary implementation is
//! [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use warrant_core::{ObjectRef, PermissionHandle};
//! use warrant_store::{GrantStore, SqliteStore};
//!
//! async fn example() -> warrant_store::Result<()> {
//!     let store = SqliteStore::open("warrant.db")?;
//!
//!     let user = ObjectRef::new("user", "1");
//!     store.grant(&user, None, &[PermissionHandle::from("edit-post")]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent writes**: granting or assigning twice leaves one row
//! - **Exact scope**: an unscoped grant never satisfies a scoped query, and vice versa
//! - **Atomic sync**: current-vs-desired diffs are read and applied in one transaction
//! - **Cascading delete**: deleting a role removes its grants and assignments

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AssignmentStore, AuthStore, GrantStore, RoleStore};

/// Current unix time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
