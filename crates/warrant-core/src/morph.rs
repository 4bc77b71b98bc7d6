//! Polymorphic "type + id" references.
//!
//! Actors, scopes, and tenants are all referenced the same way: a stable type
//! tag plus an opaque identifier. Host types opt in by implementing [`Morph`];
//! the [`MorphMap`] normalizes long canonical type names to their short
//! aliases so either form can be used when declaring restrictions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::MorphType;

/// A type that can be referenced polymorphically.
///
/// # Example
///
/// ```
/// use warrant_core::{Morph, ObjectRef};
///
/// struct User { id: u64 }
///
/// impl Morph for User {
///     fn morph_type(&self) -> &str { "user" }
///     fn morph_key(&self) -> String { self.id.to_string() }
/// }
///
/// let user = User { id: 7 };
/// let r = ObjectRef::of(&user);
/// assert_eq!(r.kind.as_str(), "user");
/// assert_eq!(r.id, "7");
/// ```
pub trait Morph {
    /// The stable short type tag.
    fn morph_type(&self) -> &str;

    /// The opaque identifier within that type.
    fn morph_key(&self) -> String;
}

/// A reference to a concrete actor, scope, or tenant.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Type tag.
    pub kind: MorphType,
    /// Identifier within the type.
    pub id: String,
}

impl ObjectRef {
    /// Create a reference from a type tag and an identifier.
    pub fn new(kind: impl Into<MorphType>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a reference from any [`Morph`] value.
    pub fn of<M: Morph + ?Sized>(value: &M) -> Self {
        Self::new(value.morph_type(), value.morph_key())
    }

    /// The type tag as a string slice.
    pub fn kind_str(&self) -> &str {
        self.kind.as_str()
    }
}

impl Morph for ObjectRef {
    fn morph_type(&self) -> &str {
        self.kind.as_str()
    }

    fn morph_key(&self) -> String {
        self.id.clone()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}#{})", self.kind, self.id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Mapping from canonical type names to short aliases.
///
/// Lookups fall back to the name itself when no alias is registered, so an
/// empty map is the identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MorphMap {
    aliases: BTreeMap<String, MorphType>,
}

impl MorphMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` as the short form of `canonical`.
    pub fn alias(mut self, alias: impl Into<MorphType>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(canonical.into(), alias.into());
        self
    }

    /// Normalize a type name to its alias, or return it unchanged.
    pub fn normalize(&self, name: &str) -> MorphType {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| MorphType::new(name))
    }

    /// Whether two type names refer to the same type once normalized.
    pub fn same_type(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    /// Returns `true` if no aliases are registered.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
