//! Authorization resolution.
//!
//! The store produces a [`GrantSnapshot`] for one (actor, scope) pair; this
//! module turns it into a [`Decision`] against a set of required permissions.
//! Only granted permissions are expanded through the implication graph, never
//! the required ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::types::PermissionHandle;

/// Everything an actor holds for one exact scope, read consistently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSnapshot {
    /// Direct grants.
    pub direct: BTreeSet<PermissionHandle>,
    /// Permissions of every role assigned for this scope.
    pub via_roles: BTreeSet<PermissionHandle>,
}

impl GrantSnapshot {
    /// `direct ∪ via_roles`.
    pub fn granted(&self) -> BTreeSet<PermissionHandle> {
        self.direct.union(&self.via_roles).cloned().collect()
    }
}

/// Quantifier over the required permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    /// At least one required permission must be satisfied (`check`).
    Any,
    /// Every required permission must be satisfied (`checkAll`).
    All,
}

/// The outcome of resolving a required set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub quantifier: Quantifier,
    pub satisfied: Vec<PermissionHandle>,
    pub missing: Vec<PermissionHandle>,
}

impl Decision {
    /// A decision with nothing satisfied (e.g. no actor).
    pub fn denied(quantifier: Quantifier, required: &[PermissionHandle]) -> Self {
        Self {
            quantifier,
            satisfied: Vec::new(),
            missing: required.to_vec(),
        }
    }

    /// Split `required` into what `held` contains and what it lacks.
    pub fn partition(
        quantifier: Quantifier,
        required: &[PermissionHandle],
        held: &BTreeSet<PermissionHandle>,
    ) -> Self {
        let (satisfied, missing) = required.iter().cloned().partition(|h| held.contains(h));
        Self {
            quantifier,
            satisfied,
            missing,
        }
    }

    /// Whether access is granted under the decision's quantifier.
    ///
    /// `Any` over an empty set is `false`; `All` over an empty set is `true`.
    pub fn is_granted(&self) -> bool {
        match self.quantifier {
            Quantifier::Any => !self.satisfied.is_empty(),
            Quantifier::All => self.missing.is_empty(),
        }
    }
}

/// Resolve `required` against a snapshot.
pub fn resolve(
    catalog: &Catalog,
    snapshot: &GrantSnapshot,
    required: &[PermissionHandle],
    quantifier: Quantifier,
) -> Decision {
    let mut held = snapshot.granted();
    let implied: Vec<PermissionHandle> = held
        .iter()
        .flat_map(|g| catalog.implied_by(g.as_str()))
        .collect();
    held.extend(implied);

    Decision::partition(quantifier, required, &held)
}
