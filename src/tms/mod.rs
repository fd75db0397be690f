//! Assumption-based Truth Maintenance System: label propagation.
//!
//! Inspired by de Kleer's ATMS. Every node carries a [`Label`]: the minimal
//! sets of assumptions under which it is provable. Recording a justification
//! recomputes the consequent's label from its antecedents' current labels:
//!
//! 1. Conjoin the antecedent labels (every antecedent must hold)
//! 2. Drop environments known to be inconsistent (the nogoods in `⊥`'s label)
//! 3. Disjoin the result into the consequent's label (alternative derivations)
//! 4. Keep only minimal environments
//!
//! A changed label is pushed forward to every node derived from it, so labels
//! stay a fixpoint of the justification graph after each operation. Retraction
//! lives in [`retract`], read-only queries in [`query`].

pub mod query;
pub mod retract;

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{TmsError, TmsResult};
use crate::identifier::{CONTRADICTION, Identifier};
use crate::justification::{Justification, JustificationId, JustificationStore};
use crate::label::Label;
use crate::node::{Node, NodeKind};

pub use retract::RetractionResult;

/// What retraction does to a justification that names a removed node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetractionPolicy {
    /// Drop the removed node from the antecedents and keep the rest, so
    /// `r ⇐ A ∧ B` becomes `r ⇐ B` once `A` is retracted.
    #[default]
    Strip,
    /// Delete the justification, along with its conjunction group.
    Discard,
}

/// Configuration for a [`Tms`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmsConfig {
    /// Re-filter every derived label when the set of nogoods grows, so no
    /// label ever contains a nogood regardless of recording order.
    pub refilter_on_nogood: bool,
    /// Warn when a label grows beyond this many environments.
    pub max_label_environments: Option<usize>,
    /// How retraction treats justifications that name a removed node.
    pub retraction: RetractionPolicy,
}

impl Default for TmsConfig {
    fn default() -> Self {
        Self {
            refilter_on_nogood: true,
            max_label_environments: None,
            retraction: RetractionPolicy::Strip,
        }
    }
}

/// The truth maintenance engine.
///
/// Owns the node store and the justification store. Single-writer: every
/// operation runs to completion and leaves all labels consistent before it
/// returns.
#[derive(Debug, Clone, Default)]
pub struct Tms {
    config: TmsConfig,
    nodes: HashMap<Identifier, Node>,
    justifications: JustificationStore,
}

impl Tms {
    /// Create an empty TMS with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TmsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TmsConfig {
        &self.config
    }

    /// Add a node with the label its kind prescribes.
    ///
    /// The reserved `⊥` identifier always becomes the contradiction node.
    pub fn add_node(&mut self, id: Identifier, kind: NodeKind) -> TmsResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(TmsError::DuplicateNode { id });
        }
        let kind = if id.is_contradiction() {
            NodeKind::Contradiction
        } else {
            kind
        };
        let node = Node::new(id.clone(), kind);
        tracing::debug!(id = %id, kind = %kind, label = %node.label, "node added");
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Make sure a consequent node exists, creating it as a justified node
    /// with no support if absent.
    pub fn ensure_consequent(&mut self, id: &Identifier) {
        if !self.nodes.contains_key(id) {
            let kind = if id.is_contradiction() {
                NodeKind::Contradiction
            } else {
                NodeKind::Justified
            };
            tracing::debug!(id = %id, kind = %kind, "consequent created");
            self.nodes.insert(id.clone(), Node::new(id.clone(), kind));
        }
    }

    /// Record a justification and update the consequent's label.
    ///
    /// Fails before touching any state if the antecedent set is empty or an
    /// antecedent is unknown. An antecedent may name the consequent itself.
    pub fn add_justification(&mut self, justification: Justification) -> TmsResult<JustificationId> {
        if justification.antecedents.is_empty() {
            return Err(TmsError::EmptyAntecedents {
                consequent: justification.consequent,
            });
        }
        for antecedent in &justification.antecedents {
            if !self.nodes.contains_key(antecedent) && *antecedent != justification.consequent {
                return Err(TmsError::UnknownNode {
                    id: antecedent.clone(),
                });
            }
        }

        let consequent = justification.consequent.clone();
        self.ensure_consequent(&consequent);

        let operands: Vec<Label> = justification
            .antecedents
            .iter()
            .map(|a| self.current_label(a))
            .collect();
        let mut contribution = Label::no_environment();
        contribution.conjoin(&operands);
        if !consequent.is_contradiction() {
            if let Some(nogoods) = self.nogoods() {
                contribution.filter_nogoods(nogoods);
            }
        }

        let changed = match self.nodes.get_mut(&consequent) {
            Some(node) if node.kind.is_derived() => {
                let before = node.label.clone();
                node.label.disjoin([&contribution]);
                node.label.remove_subsumed();
                node.label != before
            }
            // Assumption and premise labels are their identity and never change.
            _ => false,
        };

        tracing::debug!(
            consequent = %consequent,
            justification = %justification,
            changed,
            "justification recorded"
        );
        let id = self.justifications.insert(justification);

        if changed {
            self.check_label_size(&consequent);
            if consequent.is_contradiction() {
                self.enforce_nogoods();
            }
            self.propagate(&consequent);
        }
        Ok(id)
    }

    /// Treat several recorded justifications of one consequent as a single
    /// conjunctive derivation instead of alternatives.
    ///
    /// The consequent's label is rebuilt from the listed justifications only,
    /// conjoining each one's antecedent labels into a fresh label in turn; the
    /// consequent's other justifications are superseded. Everything derived
    /// from the consequent is recomputed.
    pub fn conjoin(&mut self, ids: &[JustificationId]) -> TmsResult<()> {
        let first = *ids.first().ok_or(TmsError::EmptyConjunction)?;
        let consequent = self
            .justifications
            .get(first)
            .ok_or(TmsError::UnrecordedJustification { id: first })?
            .consequent
            .clone();
        for id in ids {
            let j = self
                .justifications
                .get(*id)
                .ok_or(TmsError::UnrecordedJustification { id: *id })?;
            if j.consequent != consequent {
                return Err(TmsError::MismatchedConsequent {
                    expected: consequent,
                    found: j.consequent.clone(),
                });
            }
        }

        self.justifications.conjoin(ids);
        tracing::debug!(consequent = %consequent, count = ids.len(), "justifications conjoined");
        self.rebuild_downstream(&consequent);
        Ok(())
    }

    /// Clear all nodes, justifications and nogoods.
    pub fn reset(&mut self) {
        tracing::info!(
            nodes = self.nodes.len(),
            justifications = self.justifications.len(),
            "tms reset"
        );
        self.nodes.clear();
        self.justifications.clear();
    }

    /// Current nogood environments, if a contradiction node exists.
    pub fn nogoods(&self) -> Option<&Label> {
        self.nodes.get(&CONTRADICTION).map(|n| &n.label)
    }

    pub fn justification_store(&self) -> &JustificationStore {
        &self.justifications
    }

    // -----------------------------------------------------------------------
    // Label computation
    // -----------------------------------------------------------------------

    fn current_label(&self, id: &Identifier) -> Label {
        self.nodes
            .get(id)
            .map(|n| n.label.clone())
            .unwrap_or_default()
    }

    /// Recompute a consequent's label from all of its derivations.
    ///
    /// Each derivation (a single justification or a conjunction) starts from
    /// an empty label and conjoins in the antecedent labels of each of its
    /// justifications in turn. A justification whose antecedents are all out,
    /// or that has none left, leaves the contribution untouched. With
    /// `exclude` set, environments mentioning that identifier are dropped.
    fn derive_label(&self, consequent: &Identifier, exclude: Option<&Identifier>) -> Label {
        let mut label = Label::no_environment();
        for derivation in self.justifications.derivations_of(consequent) {
            let mut contribution = Label::no_environment();
            for justification in derivation.iter().filter_map(|id| self.justifications.get(*id)) {
                let operands: Vec<Label> = justification
                    .antecedents
                    .iter()
                    .map(|a| self.current_label(a))
                    .collect();
                contribution.conjoin(&operands);
            }
            if let Some(excluded) = exclude {
                contribution.remove_mentions(excluded);
            }
            if !consequent.is_contradiction() {
                if let Some(nogoods) = self.nogoods() {
                    contribution.filter_nogoods(nogoods);
                }
            }
            label.disjoin([&contribution]);
        }
        label.remove_subsumed();
        label
    }

    /// Store a recomputed label, returning whether it changed.
    fn set_label(&mut self, id: &Identifier, label: Label) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if node.kind.is_derived() && node.label != label => {
                node.label = label;
                true
            }
            _ => false,
        }
    }

    /// Push a grown label forward through everything derived from `origin`.
    fn propagate(&mut self, origin: &Identifier) {
        let mut queue: VecDeque<Identifier> = self.justifications.consequents_of(origin).into();
        let mut nogoods_changed = false;
        while let Some(current) = queue.pop_front() {
            let label = self.derive_label(&current, None);
            if self.set_label(&current, label) {
                self.check_label_size(&current);
                nogoods_changed |= current.is_contradiction();
                queue.extend(self.justifications.consequents_of(&current));
            }
        }
        if nogoods_changed {
            self.enforce_nogoods();
        }
    }

    /// Recompute `root` and everything derived from it, starting from empty
    /// labels so that cyclic derivations cannot keep stale support alive.
    fn rebuild_downstream(&mut self, root: &Identifier) {
        let mut closure: Vec<Identifier> = Vec::new();
        let mut seen: HashSet<Identifier> = HashSet::new();
        let mut frontier = VecDeque::from([root.clone()]);
        while let Some(current) = frontier.pop_front() {
            let derived = self
                .nodes
                .get(&current)
                .is_some_and(|n| n.kind.is_derived());
            if !derived || !seen.insert(current.clone()) {
                continue;
            }
            frontier.extend(self.justifications.consequents_of(&current));
            closure.push(current);
        }

        for id in &closure {
            self.set_label(id, Label::no_environment());
        }
        let mut queue: VecDeque<Identifier> = closure.iter().cloned().collect();
        let mut queued: HashSet<Identifier> = closure.iter().cloned().collect();
        while let Some(current) = queue.pop_front() {
            queued.remove(&current);
            let label = self.derive_label(&current, None);
            if self.set_label(&current, label) {
                for next in self.justifications.consequents_of(&current) {
                    if seen.contains(&next) && queued.insert(next.clone()) {
                        queue.push_back(next);
                    }
                }
            }
        }
        for id in &closure {
            self.check_label_size(id);
        }
        if seen.contains(&CONTRADICTION) {
            self.enforce_nogoods();
        }
    }

    /// Remove nogood environments from every derived label, returning the
    /// nodes whose label shrank, sorted.
    fn enforce_nogoods(&mut self) -> Vec<Identifier> {
        if !self.config.refilter_on_nogood {
            return Vec::new();
        }
        let Some(nogoods) = self.nogoods().cloned() else {
            return Vec::new();
        };
        let mut shrunk = Vec::new();
        for node in self.nodes.values_mut() {
            if node.kind == NodeKind::Justified {
                let before = node.label.len();
                node.label.filter_nogoods(&nogoods);
                if node.label.len() != before {
                    shrunk.push(node.id.clone());
                }
            }
        }
        shrunk.sort();
        if !shrunk.is_empty() {
            tracing::debug!(nodes = shrunk.len(), nogoods = %nogoods, "labels refiltered against nogoods");
        }
        shrunk
    }

    fn check_label_size(&self, id: &Identifier) {
        let (Some(max), Some(node)) = (self.config.max_label_environments, self.nodes.get(id)) else {
            return;
        };
        if node.label.len() > max {
            tracing::warn!(
                id = %id,
                environments = node.label.len(),
                max,
                "label exceeds configured size"
            );
        }
    }
}
