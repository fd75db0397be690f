//! Labels: sets of environments, and the algebra over them.
//!
//! A [`Label`] is a formula in disjunctive normal form over assumptions: the
//! node it belongs to holds if **any** of its environments holds, and an
//! [`Environment`] holds if **all** of its assumptions hold.
//!
//! - **Conjoin** multiplies labels out (`(a1 ∨ a2) ∧ b = (a1∧b) ∨ (a2∧b)`)
//! - **Disjoin** collects environments
//! - **RemoveSubsumed** keeps only minimal environments
//! - **FilterNogoods** drops environments that contain a known-bad combination
//!
//! The textual form is `{ {A,B}, {C} }`; see [`parse`].

pub mod environment;
pub mod parse;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;

pub use environment::Environment;

/// A set of environments in which a node holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(BTreeSet<Environment>);

impl Label {
    /// `{}`: the node is not supported by anything.
    pub fn no_environment() -> Self {
        Self::default()
    }

    /// `{ {} }`: the node holds unconditionally.
    pub fn empty_environment() -> Self {
        Self(BTreeSet::from([Environment::empty()]))
    }

    /// `{ {id} }`: the label of an assumption.
    pub fn singleton(id: Identifier) -> Self {
        Self(BTreeSet::from([Environment::singleton(id)]))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        self.0.iter()
    }

    pub fn insert(&mut self, env: Environment) -> bool {
        self.0.insert(env)
    }

    pub fn contains(&self, env: &Environment) -> bool {
        self.0.contains(env)
    }

    /// Whether the empty environment is part of this label (the node is true).
    pub fn contains_empty_environment(&self) -> bool {
        self.0.contains(&Environment::empty())
    }

    /// Pairwise unions of every environment in `self` with every environment
    /// in `operand`.
    ///
    /// Returns a fresh label; neither input is touched.
    pub fn product(&self, operand: &Label) -> Label {
        let mut out = BTreeSet::new();
        for a in &self.0 {
            for b in &operand.0 {
                out.insert(a.union(b));
            }
        }
        Label(out)
    }

    /// Logical AND of `self` with every operand, in order.
    ///
    /// If there are no operands, or all of them are empty, `self` is left
    /// unchanged. Otherwise an empty `self` is seeded by the first operand and
    /// every later operand is multiplied in with [`Label::product`]. An empty
    /// operand after the seed makes the result empty.
    ///
    /// The result is not minimised; call [`Label::remove_subsumed`] afterwards.
    pub fn conjoin<'a, I>(&mut self, operands: I)
    where
        I: IntoIterator<Item = &'a Label>,
    {
        let operands: Vec<&Label> = operands.into_iter().collect();
        if operands.iter().all(|l| l.is_empty()) {
            return;
        }

        let mut rest = operands.into_iter();
        let mut acc = if self.is_empty() {
            match rest.next() {
                Some(first) => first.clone(),
                None => return,
            }
        } else {
            std::mem::take(self)
        };
        for operand in rest {
            acc = acc.product(operand);
        }
        *self = acc;
    }

    /// Logical OR: add every environment of every operand.
    pub fn disjoin<'a, I>(&mut self, operands: I)
    where
        I: IntoIterator<Item = &'a Label>,
    {
        for operand in operands {
            self.0.extend(operand.0.iter().cloned());
        }
    }

    /// Remove every environment that is a proper superset of another
    /// environment in this label.
    pub fn remove_subsumed(&mut self) {
        if self.0.len() <= 1 {
            return;
        }
        let subsumed: Vec<Environment> = self
            .0
            .iter()
            .filter(|env| self.0.iter().any(|other| env.is_proper_superset_of(other)))
            .cloned()
            .collect();
        for env in &subsumed {
            self.0.remove(env);
        }
    }

    /// Remove every environment equal to, or a proper superset of, some
    /// environment of `nogood`.
    pub fn filter_nogoods(&mut self, nogood: &Label) {
        if nogood.is_empty() {
            return;
        }
        self.0
            .retain(|env| !nogood.0.iter().any(|bad| env.is_superset_of(bad)));
    }

    /// Remove every environment that mentions `id`.
    pub fn remove_mentions(&mut self, id: &Identifier) {
        self.0.retain(|env| !env.contains(id));
    }

    /// Whether some environment of this label is a subset of (or equal to) `env`.
    pub fn is_supported_by(&self, env: &Environment) -> bool {
        self.0.iter().any(|own| own.is_subset_of(env))
    }

    /// Union of all environments: every assumption the label mentions.
    pub fn flatten(&self) -> Environment {
        self.0.iter().flat_map(|env| env.iter().cloned()).collect()
    }

    /// Whether no environment is a proper superset of another one.
    pub fn is_minimal(&self) -> bool {
        self.0
            .iter()
            .all(|env| !self.0.iter().any(|other| env.is_proper_superset_of(other)))
    }
}

impl FromIterator<Environment> for Label {
    fn from_iter<T: IntoIterator<Item = Environment>>(iter: T) -> Self {
        Label(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Label {
    type Item = &'a Environment;
    type IntoIter = std::collections::btree_set::Iter<'a, Environment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, env) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{env}")?;
        }
        f.write_str(" }")
    }
}
