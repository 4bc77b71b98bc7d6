//! Reconciliation: the minimal diff between a current and a desired set.
//!
//! Stores compute the diff against the state they read inside the same
//! transaction that applies it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What has to change to turn `current` into `desired`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff<T: Ord> {
    /// `desired − current`.
    pub to_add: BTreeSet<T>,
    /// `current − desired`.
    pub to_remove: BTreeSet<T>,
}

impl<T: Ord> Diff<T> {
    /// Returns `true` if nothing changes.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

impl<T: Ord> Default for Diff<T> {
    fn default() -> Self {
        Self {
            to_add: BTreeSet::new(),
            to_remove: BTreeSet::new(),
        }
    }
}

/// Compute the diff from `current` to `desired`.
pub fn diff<T: Ord + Clone>(current: &BTreeSet<T>, desired: &BTreeSet<T>) -> Diff<T> {
    Diff {
        to_add: desired.difference(current).cloned().collect(),
        to_remove: current.difference(desired).cloned().collect(),
    }
}

/// Summary of an applied sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport<T: Ord> {
    pub added: BTreeSet<T>,
    pub removed: BTreeSet<T>,
}

impl<T: Ord> SyncReport<T> {
    /// Returns `true` if the sync changed nothing.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<T: Ord> From<Diff<T>> for SyncReport<T> {
    fn from(diff: Diff<T>) -> Self {
        Self {
            added: diff.to_add,
            removed: diff.to_remove,
        }
    }
}
