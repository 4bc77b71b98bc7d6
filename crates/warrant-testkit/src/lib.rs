//! # Warrant Testkit
//!
//! Testing utilities for Warrant.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: host model types, a shared sample catalog, and ready-made authorizers
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust
//! use warrant_core::ImplicationMode;
//! use warrant_testkit::fixtures::sample_catalog;
//!
//! let catalog = sample_catalog(ImplicationMode::Transitive);
//! assert!(catalog.exists("manage-posts"));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use warrant_testkit::generators::{permission_set, user_ref};
//!
//! proptest! {
//!     #[test]
//!     fn sync_converges(actor in user_ref(), desired in permission_set()) {
//!         // ...
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    init_tracing, memory_authorizer, sample_catalog, sqlite_authorizer, Account, Client, Post,
    Project, User,
};
pub use generators::{distinct_scopes, permission_handle, permission_set, post_ref, scope, user_ref};
