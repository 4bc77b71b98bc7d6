//! Strong type definitions for Warrant.
//!
//! All identifiers are newtypes to prevent mixing a permission handle with a
//! type tag or a role handle at compile time.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The unique string identifier of a permission, e.g. `"edit-post"`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionHandle(String);

impl PermissionHandle {
    /// Create a handle from any string-like value.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the handle is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PermissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermissionHandle({})", self.0)
    }
}

impl fmt::Display for PermissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PermissionHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PermissionHandle {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PermissionHandle {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PermissionHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for PermissionHandle {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&PermissionHandle> for PermissionHandle {
    fn from(h: &PermissionHandle) -> Self {
        h.clone()
    }
}

/// A stable short type tag for an actor, scope, or tenant (`"user"`, `"post"`).
///
/// This is what gets persisted in the `*_type` columns.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MorphType(String);

impl MorphType {
    /// Create a type tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MorphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MorphType({})", self.0)
    }
}

impl fmt::Display for MorphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MorphType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MorphType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MorphType {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for MorphType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Store-assigned role identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub i64);

impl RoleId {
    /// Get the raw row id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleId({})", self.0)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RoleId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_handle_display_and_debug() {
        let handle = PermissionHandle::from("edit-post");
        assert_eq!(format!("{}", handle), "edit-post");
        assert_eq!(format!("{:?}", handle), "PermissionHandle(edit-post)");
    }

    #[test]
    fn test_handle_set_lookup_by_str() {
        let set: BTreeSet<PermissionHandle> =
            ["view-post", "edit-post"].into_iter().map(Into::into).collect();
        assert!(set.contains("view-post"));
        assert!(!set.contains("delete-post"));
    }

    #[test]
    fn test_handle_serializes_as_plain_string() {
        let handle = PermissionHandle::from("view-post");
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"view-post\"");
    }

    #[test]
    fn test_role_id_ordering() {
        assert!(RoleId(1) < RoleId(2));
        assert_eq!(RoleId::from(7).get(), 7);
    }
}
