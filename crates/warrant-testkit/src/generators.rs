//! Proptest generators for property-based testing.

use std::collections::BTreeSet;

use proptest::prelude::*;

use warrant_core::{ObjectRef, PermissionHandle};

/// Unrestricted handles in the sample catalog.
pub const UNRESTRICTED: &[&str] = &["view-post", "edit-post", "delete-post", "manage-posts"];

/// Generate one unrestricted permission handle from the sample catalog.
pub fn permission_handle() -> impl Strategy<Value = PermissionHandle> {
    prop::sample::select(UNRESTRICTED).prop_map(PermissionHandle::from)
}

/// Generate a set of unrestricted permission handles (possibly empty).
pub fn permission_set() -> impl Strategy<Value = BTreeSet<PermissionHandle>> {
    prop::collection::btree_set(permission_handle(), 0..=UNRESTRICTED.len())
}

/// Generate a user reference with a small id space so collisions happen.
pub fn user_ref() -> impl Strategy<Value = ObjectRef> {
    (1u64..=5).prop_map(|id| ObjectRef::new("user", id.to_string()))
}

/// Generate a post scope.
pub fn post_ref() -> impl Strategy<Value = ObjectRef> {
    (1u64..=5).prop_map(|id| ObjectRef::new("post", id.to_string()))
}

/// Generate an optional scope: unscoped, a post, or a project.
pub fn scope() -> impl Strategy<Value = Option<ObjectRef>> {
    prop_oneof![
        Just(None),
        post_ref().prop_map(Some),
        (1u64..=3).prop_map(|id| Some(ObjectRef::new("project", id.to_string()))),
    ]
}

/// Generate two distinct scopes (either may be the unscoped `None`).
pub fn distinct_scopes() -> impl Strategy<Value = (Option<ObjectRef>, Option<ObjectRef>)> {
    (scope(), scope()).prop_filter("scopes must differ", |(a, b)| a != b)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn permission_sets_use_known_handles(set in permission_set()) {
            for handle in &set {
                prop_assert!(UNRESTRICTED.contains(&handle.as_str()));
            }
        }

        #[test]
        fn distinct_scopes_differ((a, b) in distinct_scopes()) {
            prop_assert_ne!(a, b);
        }
    }
}
