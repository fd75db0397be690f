//! Environments: sets of assumption identifiers.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;

/// A set of assumptions: one self-consistent "possible world".
///
/// Backed by an ordered set, so equality, hashing and textual output ignore
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(BTreeSet<Identifier>);

impl Environment {
    /// The environment that requires no assumption at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The environment containing exactly one assumption.
    pub fn singleton(id: Identifier) -> Self {
        Self(BTreeSet::from([id]))
    }

    pub fn insert(&mut self, id: Identifier) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.0.iter()
    }

    /// Set union of two environments.
    pub fn union(&self, other: &Environment) -> Environment {
        Environment(self.0.union(&other.0).cloned().collect())
    }

    /// Every identifier of `other` is in `self`.
    pub fn is_superset_of(&self, other: &Environment) -> bool {
        self.0.is_superset(&other.0)
    }

    /// `self` contains `other` and at least one more identifier.
    pub fn is_proper_superset_of(&self, other: &Environment) -> bool {
        self.0.len() > other.0.len() && self.0.is_superset(&other.0)
    }

    /// Every identifier of `self` is in `other`.
    pub fn is_subset_of(&self, other: &Environment) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl FromIterator<Identifier> for Environment {
    fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
        Environment(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = &'a Identifier;
    type IntoIter = std::collections::btree_set::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if id.needs_quoting() {
                f.write_char('"')?;
                for c in id.as_str().chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                f.write_char('"')?;
            } else {
                write!(f, "{id}")?;
            }
        }
        f.write_str("}")
    }
}
