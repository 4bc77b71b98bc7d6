//! The permission catalog: definitions, eligibility, and implications.
//!
//! A [`Catalog`] is built once at startup and then frozen (typically behind an
//! `Arc`) so that no registration can race with a live authorization check.
//!
//! ```
//! use warrant_core::Catalog;
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .register("manage-posts").unwrap()
//!     .label("Manage Posts")
//!     .for_actors(["user"])
//!     .implies(["view-post"]);
//! catalog.register_labeled([("view-post", "View Post"), ("edit-post", "Edit Post")]).unwrap();
//!
//! assert!(catalog.implied_by("manage-posts").contains("view-post"));
//! assert!(!catalog.is_allowed_for("manage-posts", Some("client"), None));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::{CoreError, Result};
use crate::morph::MorphMap;
use crate::types::{MorphType, PermissionHandle};

/// How [`Catalog::implied_by`] computes a permission's implication set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicationMode {
    /// Full transitive closure over the declared edges, computed at lookup
    /// time. Independent of declaration order.
    #[default]
    Transitive,
    /// Closure computed when an edge is declared: the target's implication
    /// set at that moment is copied into the source. Edges added to the
    /// target later are not propagated.
    Eager,
}

/// A registered permission definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Unique handle.
    pub handle: PermissionHandle,
    /// Optional display label.
    pub label: Option<String>,
    /// Eligible actor types. Empty means unrestricted.
    pub actor_types: BTreeSet<MorphType>,
    /// Eligible scope types. Empty means unrestricted.
    pub scope_types: BTreeSet<MorphType>,
}

impl Permission {
    fn new(handle: PermissionHandle) -> Self {
        Self {
            handle,
            label: None,
            actor_types: BTreeSet::new(),
            scope_types: BTreeSet::new(),
        }
    }
}

/// The permission registry and implication graph.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    permissions: BTreeMap<PermissionHandle, Permission>,
    /// Declared edges, keyed by the implying permission.
    edges: BTreeMap<PermissionHandle, BTreeSet<PermissionHandle>>,
    /// Closure snapshot taken at declaration time (used by `Eager`).
    eager: BTreeMap<PermissionHandle, BTreeSet<PermissionHandle>>,
    mode: ImplicationMode,
    morph_map: MorphMap,
}

impl Catalog {
    /// Create an empty catalog resolving implications transitively.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the implication mode.
    pub fn with_implication_mode(mut self, mode: ImplicationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Install the morph map used to normalize type names.
    pub fn with_morph_map(mut self, map: MorphMap) -> Self {
        self.morph_map = map;
        self
    }

    /// The active implication mode.
    pub fn implication_mode(&self) -> ImplicationMode {
        self.mode
    }

    /// The installed morph map.
    pub fn morph_map(&self) -> &MorphMap {
        &self.morph_map
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Register (or overwrite) a single permission.
    ///
    /// Re-registering an existing handle resets its label and restrictions.
    pub fn register(&mut self, handle: impl Into<PermissionHandle>) -> Result<Registration<'_>> {
        self.register_many([handle])
    }

    /// Register several permissions in one batch.
    pub fn register_many<I, H>(&mut self, handles: I) -> Result<Registration<'_>>
    where
        I: IntoIterator<Item = H>,
        H: Into<PermissionHandle>,
    {
        let handles = collect_handles(handles)?;
        for handle in &handles {
            self.permissions
                .insert(handle.clone(), Permission::new(handle.clone()));
        }
        Ok(Registration {
            catalog: self,
            handles,
        })
    }

    /// Register several permissions with their labels.
    pub fn register_labeled<I, H, L>(&mut self, entries: I) -> Result<Registration<'_>>
    where
        I: IntoIterator<Item = (H, L)>,
        H: Into<PermissionHandle>,
        L: Into<String>,
    {
        let mut handles = Vec::new();
        for (handle, label) in entries {
            let handle = validate_handle(handle.into())?;
            let mut permission = Permission::new(handle.clone());
            permission.label = Some(label.into());
            self.permissions.insert(handle.clone(), permission);
            handles.push(handle);
        }
        Ok(Registration {
            catalog: self,
            handles,
        })
    }

    /// Restrict a permission to the given actor types. Empty clears it.
    pub fn restrict_actor_types<I, T>(&mut self, handle: &str, types: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<MorphType>,
    {
        let permission = self.get_mut(handle)?;
        permission.actor_types = types.into_iter().map(Into::into).collect();
        Ok(())
    }

    /// Restrict a permission to the given scope types. Empty clears it.
    pub fn restrict_scope_types<I, T>(&mut self, handle: &str, types: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<MorphType>,
    {
        let permission = self.get_mut(handle)?;
        permission.scope_types = types.into_iter().map(Into::into).collect();
        Ok(())
    }

    /// Declare that `handle` implies each of `others`.
    ///
    /// The targets need not be registered yet.
    pub fn implies<I, H>(&mut self, handle: impl Into<PermissionHandle>, others: I)
    where
        I: IntoIterator<Item = H>,
        H: Into<PermissionHandle>,
    {
        let source = handle.into();
        for target in others {
            let target = target.into();
            self.edges
                .entry(source.clone())
                .or_default()
                .insert(target.clone());

            let inherited = self.eager.get(&target).cloned().unwrap_or_default();
            let set = self.eager.entry(source.clone()).or_default();
            set.insert(target);
            set.extend(inherited);
        }
    }

    fn get_mut(&mut self, handle: &str) -> Result<&mut Permission> {
        self.permissions
            .get_mut(handle)
            .ok_or_else(|| CoreError::UnregisteredPermission(handle.into()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns `true` if the handle is registered.
    pub fn exists(&self, handle: &str) -> bool {
        self.permissions.contains_key(handle)
    }

    /// Get a permission by handle.
    pub fn get(&self, handle: &str) -> Option<&Permission> {
        self.permissions.get(handle)
    }

    /// All registered permissions, ordered by handle.
    pub fn all(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    /// The first permission in handle order.
    pub fn first(&self) -> Option<&Permission> {
        self.permissions.values().next()
    }

    /// Number of registered permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Permissions matching every criterion of `filter`.
    pub fn query(&self, filter: &PermissionFilter) -> Vec<&Permission> {
        self.permissions
            .values()
            .filter(|p| filter.matches(p, &self.morph_map))
            .collect()
    }

    /// Check whether a permission may be held by the given actor/scope types.
    ///
    /// Fails closed for unregistered handles. A `None` type is not checked.
    pub fn is_allowed_for(
        &self,
        handle: &str,
        actor_type: Option<&str>,
        scope_type: Option<&str>,
    ) -> bool {
        let Some(permission) = self.permissions.get(handle) else {
            return false;
        };

        if let Some(actor_type) = actor_type {
            if !self.type_allowed(&permission.actor_types, actor_type) {
                return false;
            }
        }

        if let Some(scope_type) = scope_type {
            if !self.type_allowed(&permission.scope_types, scope_type) {
                return false;
            }
        }

        true
    }

    fn type_allowed(&self, allowed: &BTreeSet<MorphType>, candidate: &str) -> bool {
        if allowed.is_empty() {
            return true;
        }
        allowed
            .iter()
            .any(|t| self.morph_map.same_type(t.as_str(), candidate))
    }

    /// Fail unless the handle is registered.
    pub fn ensure_registered(&self, handle: &PermissionHandle) -> Result<()> {
        if self.exists(handle.as_str()) {
            Ok(())
        } else {
            Err(CoreError::UnregisteredPermission(handle.clone()))
        }
    }

    /// Fail unless the handle is registered and eligible for the given types.
    pub fn ensure_allowed(
        &self,
        handle: &PermissionHandle,
        actor_type: &MorphType,
        scope_type: Option<&MorphType>,
    ) -> Result<()> {
        self.ensure_registered(handle)?;
        if self.is_allowed_for(
            handle.as_str(),
            Some(actor_type.as_str()),
            scope_type.map(MorphType::as_str),
        ) {
            Ok(())
        } else {
            Err(CoreError::IneligibleActorOrScope {
                permission: handle.clone(),
                actor_type: actor_type.clone(),
                scope_type: scope_type.cloned(),
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Implications
    // ─────────────────────────────────────────────────────────────────────────

    /// The set of permissions satisfied by holding `handle`.
    ///
    /// Does not include `handle` itself unless a cycle leads back to it.
    pub fn implied_by(&self, handle: &str) -> BTreeSet<PermissionHandle> {
        match self.mode {
            ImplicationMode::Eager => self.eager.get(handle).cloned().unwrap_or_default(),
            ImplicationMode::Transitive => self.closure(handle),
        }
    }

    /// The permissions directly declared as implied by `handle`.
    pub fn direct_implications(&self, handle: &str) -> Option<&BTreeSet<PermissionHandle>> {
        self.edges.get(handle)
    }

    fn closure(&self, handle: &str) -> BTreeSet<PermissionHandle> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&PermissionHandle> = VecDeque::new();

        if let Some(targets) = self.edges.get(handle) {
            queue.extend(targets);
        }

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            if let Some(targets) = self.edges.get(next) {
                queue.extend(targets.iter().filter(|t| !seen.contains(*t)));
            }
        }

        seen
    }
}

/// A batch of freshly registered permissions that can be further configured.
pub struct Registration<'a> {
    catalog: &'a mut Catalog,
    handles: Vec<PermissionHandle>,
}

impl<'a> Registration<'a> {
    /// Set the label of every permission in the batch.
    pub fn label(self, label: impl Into<String>) -> Self {
        let label = label.into();
        for handle in &self.handles {
            if let Some(p) = self.catalog.permissions.get_mut(handle) {
                p.label = Some(label.clone());
            }
        }
        self
    }

    /// Set labels by handle. Handles outside the batch are ignored.
    pub fn labels<I, H, L>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = (H, L)>,
        H: Into<PermissionHandle>,
        L: Into<String>,
    {
        for (handle, label) in labels {
            let handle = handle.into();
            if self.handles.contains(&handle) {
                if let Some(p) = self.catalog.permissions.get_mut(&handle) {
                    p.label = Some(label.into());
                }
            }
        }
        self
    }

    /// Restrict every permission in the batch to these actor types.
    pub fn for_actors<I, T>(self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<MorphType>,
    {
        let types: BTreeSet<MorphType> = types.into_iter().map(Into::into).collect();
        for handle in &self.handles {
            if let Some(p) = self.catalog.permissions.get_mut(handle) {
                p.actor_types = types.clone();
            }
        }
        self
    }

    /// Restrict every permission in the batch to these scope types.
    pub fn on_scopes<I, T>(self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<MorphType>,
    {
        let types: BTreeSet<MorphType> = types.into_iter().map(Into::into).collect();
        for handle in &self.handles {
            if let Some(p) = self.catalog.permissions.get_mut(handle) {
                p.scope_types = types.clone();
            }
        }
        self
    }

    /// Declare that every permission in the batch implies `others`.
    pub fn implies<I, H>(self, others: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<PermissionHandle>,
    {
        let others: Vec<PermissionHandle> = others.into_iter().map(Into::into).collect();
        for handle in &self.handles {
            self.catalog.implies(handle.clone(), others.iter().cloned());
        }
        self
    }

    /// Handles covered by this registration.
    pub fn handles(&self) -> &[PermissionHandle] {
        &self.handles
    }

    /// The registered permission, for single-handle registrations.
    pub fn permission(&self) -> Option<&Permission> {
        match self.handles.as_slice() {
            [only] => self.catalog.permissions.get(only),
            _ => None,
        }
    }
}

fn validate_handle(handle: PermissionHandle) -> Result<PermissionHandle> {
    if handle.as_str().trim().is_empty() {
        Err(CoreError::InvalidHandle(handle.as_str().to_owned()))
    } else {
        Ok(handle)
    }
}

fn collect_handles<I, H>(handles: I) -> Result<Vec<PermissionHandle>>
where
    I: IntoIterator<Item = H>,
    H: Into<PermissionHandle>,
{
    let mut out: Vec<PermissionHandle> = Vec::new();
    for handle in handles {
        let handle = validate_handle(handle.into())?;
        if !out.contains(&handle) {
            out.push(handle);
        }
    }
    Ok(out)
}

/// Criteria for [`Catalog::query`].
///
/// Each criterion accepts one or more values and matches when any value
/// matches; a permission must match every criterion that is set. Type criteria
/// match against the declared restriction, so an unrestricted permission does
/// not match an `actor_type` criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionFilter {
    handles: Option<Vec<String>>,
    actor_types: Option<Vec<String>>,
    scope_types: Option<Vec<String>>,
}

impl PermissionFilter {
    /// A filter matching every permission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match any of these handles.
    pub fn handle<I, S>(self, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            handles: Some(handles.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    /// Match permissions restricted to any of these actor types.
    pub fn actor_type<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actor_types: Some(types.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    /// Match permissions restricted to any of these scope types.
    pub fn scope_type<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope_types: Some(types.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    fn matches(&self, permission: &Permission, map: &MorphMap) -> bool {
        if let Some(handles) = &self.handles {
            if !handles.iter().any(|h| h == permission.handle.as_str()) {
                return false;
            }
        }
        if let Some(types) = &self.actor_types {
            if !contains_any(&permission.actor_types, types, map) {
                return false;
            }
        }
        if let Some(types) = &self.scope_types {
            if !contains_any(&permission.scope_types, types, map) {
                return false;
            }
        }
        true
    }
}

fn contains_any(declared: &BTreeSet<MorphType>, wanted: &[String], map: &MorphMap) -> bool {
    wanted.iter().any(|w| {
        let w = map.normalize(w);
        declared.iter().any(|d| map.normalize(d.as_str()) == w)
    })
}
