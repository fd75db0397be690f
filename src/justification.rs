//! Justifications and the justification store.
//!
//! A justification records that a consequent holds whenever **all** of its
//! antecedents hold. Several justifications may target the same consequent;
//! they are alternative derivations. The store keeps them in an arena keyed by
//! [`JustificationId`] with two indexes:
//!
//! - consequent → justifications deriving it ("why does X hold")
//! - antecedent → justifications using it (the forward walk of retraction)
//!
//! Justifications of one consequent are disjoined by default. An explicit
//! conjunction turns a chosen set of them into the single derivation of the
//! consequent: the other justifications recorded by then are superseded and
//! ignored while the conjunction has a live member. Justifications recorded
//! afterwards are alternatives again.
//!
//! Cycles are allowed: a consequent may, transitively, be its own antecedent.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;

/// Handle of a recorded justification.
///
/// Handles are allocated monotonically and never reused within one store,
/// including across [`JustificationStore::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct JustificationId(u64);

impl JustificationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JustificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "j:{}", self.0)
    }
}

/// An inference rule: `consequent ⇐ antecedent₁ ∧ … ∧ antecedentₙ`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    pub consequent: Identifier,
    /// Antecedents in recording order, without duplicates.
    pub antecedents: Vec<Identifier>,
    /// Optional human-readable annotation.
    pub informant: Option<String>,
}

impl Justification {
    /// Build a justification. Duplicate antecedents are dropped, first
    /// occurrence wins.
    pub fn new(
        consequent: Identifier,
        antecedents: impl IntoIterator<Item = Identifier>,
        informant: Option<String>,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let antecedents = antecedents
            .into_iter()
            .filter(|a| seen.insert(a.clone()))
            .collect();
        Self {
            consequent,
            antecedents,
            informant,
        }
    }

    pub fn depends_on(&self, id: &Identifier) -> bool {
        self.antecedents.contains(id)
    }

    /// A justification whose antecedents were all stripped by retraction.
    pub fn is_collapsed(&self) -> bool {
        self.antecedents.is_empty()
    }
}

impl std::fmt::Display for Justification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "< {}, ", self.consequent)?;
        for (i, a) in self.antecedents.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{a}")?;
        }
        f.write_str(" >")?;
        if let Some(ref informant) = self.informant {
            write!(f, " ({informant})")?;
        }
        Ok(())
    }
}

/// Arena of justifications with consequent and antecedent indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JustificationStore {
    next: u64,
    justifications: BTreeMap<JustificationId, Justification>,
    by_consequent: HashMap<Identifier, Vec<JustificationId>>,
    by_antecedent: HashMap<Identifier, BTreeSet<JustificationId>>,
    conjunctions: HashMap<Identifier, Conjunction>,
}

/// An explicit conjunction over justifications of one consequent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Conjunction {
    members: BTreeSet<JustificationId>,
    /// Justifications of the consequent the conjunction replaced.
    superseded: BTreeSet<JustificationId>,
}

impl JustificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a justification and return its handle.
    pub fn insert(&mut self, justification: Justification) -> JustificationId {
        self.next += 1;
        let id = JustificationId(self.next);
        for antecedent in &justification.antecedents {
            self.by_antecedent
                .entry(antecedent.clone())
                .or_default()
                .insert(id);
        }
        self.by_consequent
            .entry(justification.consequent.clone())
            .or_default()
            .push(id);
        self.justifications.insert(id, justification);
        id
    }

    pub fn get(&self, id: JustificationId) -> Option<&Justification> {
        self.justifications.get(&id)
    }

    pub fn contains(&self, id: JustificationId) -> bool {
        self.justifications.contains_key(&id)
    }

    /// Handles of the justifications deriving `consequent`, in recording order.
    pub fn for_consequent(&self, consequent: &Identifier) -> &[JustificationId] {
        self.by_consequent
            .get(consequent)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Handles of the justifications that name `antecedent`.
    pub fn dependents_of(&self, antecedent: &Identifier) -> Vec<JustificationId> {
        self.by_antecedent
            .get(antecedent)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Distinct consequents of the justifications that name `antecedent`, in
    /// the order their first such justification was recorded.
    pub fn consequents_of(&self, antecedent: &Identifier) -> Vec<Identifier> {
        let mut seen = BTreeSet::new();
        self.dependents_of(antecedent)
            .into_iter()
            .filter_map(|id| self.justifications.get(&id))
            .map(|j| j.consequent.clone())
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }

    /// Remove `antecedent` from the antecedent set of justification `id`.
    ///
    /// Returns whether anything was removed.
    pub fn strip_antecedent(&mut self, id: JustificationId, antecedent: &Identifier) -> bool {
        let Some(j) = self.justifications.get_mut(&id) else {
            return false;
        };
        let before = j.antecedents.len();
        j.antecedents.retain(|a| a != antecedent);
        if j.antecedents.len() == before {
            return false;
        }
        if let Some(deps) = self.by_antecedent.get_mut(antecedent) {
            deps.remove(&id);
            if deps.is_empty() {
                self.by_antecedent.remove(antecedent);
            }
        }
        true
    }

    /// Make the given justifications the one conjunctive derivation of their
    /// consequent, replacing any earlier conjunction. Every other
    /// justification of the consequent is superseded.
    ///
    /// Unrecorded handles are ignored.
    pub fn conjoin(&mut self, ids: &[JustificationId]) {
        let members: BTreeSet<JustificationId> =
            ids.iter().copied().filter(|id| self.contains(*id)).collect();
        let Some(consequent) = members
            .first()
            .and_then(|id| self.get(*id))
            .map(|j| j.consequent.clone())
        else {
            return;
        };
        let superseded = self
            .for_consequent(&consequent)
            .iter()
            .copied()
            .filter(|id| !members.contains(id))
            .collect();
        self.conjunctions.insert(
            consequent,
            Conjunction {
                members,
                superseded,
            },
        );
    }

    /// The live conjunction of `consequent`: one with a member that still has
    /// antecedents.
    fn live_conjunction(&self, consequent: &Identifier) -> Option<&Conjunction> {
        self.conjunctions.get(consequent).filter(|c| {
            c.members
                .iter()
                .any(|m| self.get(*m).is_some_and(|j| !j.is_collapsed()))
        })
    }

    /// Members of the conjunction `id` belongs to, or just `id`.
    pub fn group_of(&self, id: JustificationId) -> Vec<JustificationId> {
        self.get(id)
            .and_then(|j| self.conjunctions.get(&j.consequent))
            .filter(|c| c.members.contains(&id))
            .map(|c| c.members.iter().copied().collect())
            .unwrap_or_else(|| vec![id])
    }

    /// The derivations of `consequent`: the live conjunction first, if any,
    /// then every other justification that is not superseded, each on its own.
    pub fn derivations_of(&self, consequent: &Identifier) -> Vec<Vec<JustificationId>> {
        let ids = self.for_consequent(consequent);
        match self.live_conjunction(consequent) {
            Some(c) => std::iter::once(c.members.iter().copied().collect::<Vec<_>>())
                .chain(
                    ids.iter()
                        .filter(|id| !c.members.contains(id) && !c.superseded.contains(id))
                        .map(|id| vec![*id]),
                )
                .collect(),
            None => ids.iter().map(|id| vec![*id]).collect(),
        }
    }

    /// Justifications currently taking part in some derivation of `consequent`.
    pub fn active_for(&self, consequent: &Identifier) -> Vec<JustificationId> {
        self.derivations_of(consequent).into_iter().flatten().collect()
    }

    /// Delete justification `id` and unhook it from both indexes.
    pub fn remove(&mut self, id: JustificationId) -> Option<Justification> {
        let j = self.justifications.remove(&id)?;
        if let Some(c) = self.conjunctions.get_mut(&j.consequent) {
            c.members.remove(&id);
            c.superseded.remove(&id);
            if c.members.is_empty() {
                self.conjunctions.remove(&j.consequent);
            }
        }
        for antecedent in &j.antecedents {
            if let Some(deps) = self.by_antecedent.get_mut(antecedent) {
                deps.remove(&id);
                if deps.is_empty() {
                    self.by_antecedent.remove(antecedent);
                }
            }
        }
        if let Some(ids) = self.by_consequent.get_mut(&j.consequent) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_consequent.remove(&j.consequent);
            }
        }
        Some(j)
    }

    /// Iterate over all recorded justifications in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (JustificationId, &Justification)> {
        self.justifications.iter().map(|(id, j)| (*id, j))
    }

    pub fn len(&self) -> usize {
        self.justifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.justifications.is_empty()
    }

    /// Remove all justifications. Handles keep counting up.
    pub fn clear(&mut self) {
        self.justifications.clear();
        self.by_consequent.clear();
        self.by_antecedent.clear();
        self.conjunctions.clear();
    }
}
