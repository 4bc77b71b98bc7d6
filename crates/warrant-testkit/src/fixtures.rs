//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: host model types, the shared
//! sample catalog, and ready-made authorizers over each store backend.

use warrant::{Authorizer, AuthorizerConfig};
use warrant_core::{Catalog, ImplicationMode, Morph, ObjectRef};
use warrant_store::{MemoryStore, SqliteStore, StoreError};

macro_rules! morph_model {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub u64);

        impl $name {
            /// The [`ObjectRef`] for this model.
            pub fn object(&self) -> ObjectRef {
                ObjectRef::of(self)
            }
        }

        impl Morph for $name {
            fn morph_type(&self) -> &str {
                $tag
            }

            fn morph_key(&self) -> String {
                self.0.to_string()
            }
        }
    };
}

morph_model!(
    /// A human actor.
    User,
    "user"
);
morph_model!(
    /// A machine actor (API client).
    Client,
    "client"
);
morph_model!(
    /// A blog post, used as a scope.
    Post,
    "post"
);
morph_model!(
    /// A project, used as a scope.
    Project,
    "project"
);
morph_model!(
    /// An account, used as a role tenant.
    Account,
    "account"
);

/// The shared sample catalog.
///
/// - `view-post`, `edit-post`, `delete-post`: unrestricted
/// - `manage-posts`: implies `edit-post` and `view-post`
/// - `administer`: implies `manage-posts` and `delete-post`
/// - `user-permission-1`, `user-permission-2`: users only
/// - `client-permission-1`, `client-permission-2`: clients only
/// - `publish-post`: users only, on posts only
pub fn sample_catalog(mode: ImplicationMode) -> Catalog {
    let mut catalog = Catalog::new().with_implication_mode(mode);

    catalog
        .register_labeled([
            ("view-post", "View post"),
            ("edit-post", "Edit post"),
            ("delete-post", "Delete post"),
        ])
        .expect("valid handles");

    // Targets are registered first so eager closure sees their sets.
    catalog
        .register("manage-posts")
        .expect("valid handle")
        .label("Manage posts")
        .implies(["edit-post", "view-post"]);
    catalog
        .register("administer")
        .expect("valid handle")
        .implies(["manage-posts", "delete-post"]);

    catalog
        .register_many(["user-permission-1", "user-permission-2"])
        .expect("valid handles")
        .for_actors(["user"]);
    catalog
        .register_many(["client-permission-1", "client-permission-2"])
        .expect("valid handles")
        .for_actors(["client"]);

    catalog
        .register("publish-post")
        .expect("valid handle")
        .for_actors(["user"])
        .on_scopes(["post"]);

    catalog
}

/// An authorizer over the sample catalog backed by [`MemoryStore`].
pub fn memory_authorizer(mode: ImplicationMode) -> Authorizer<MemoryStore> {
    Authorizer::new(sample_catalog(mode), MemoryStore::new(), AuthorizerConfig::default())
}

/// An authorizer over the sample catalog backed by in-memory SQLite.
pub fn sqlite_authorizer(mode: ImplicationMode) -> Result<Authorizer<SqliteStore>, StoreError> {
    Ok(Authorizer::new(
        sample_catalog(mode),
        SqliteStore::open_memory()?,
        AuthorizerConfig::default(),
    ))
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
