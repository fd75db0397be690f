//! Retraction: remove an assumption and everything that holds only through it.
//!
//! The cascade walks the justification graph forward from the retracted
//! assumption with an explicit worklist:
//!
//! 1. Strip every removed node from the antecedents of its dependents, or
//!    delete the justifications naming it under [`RetractionPolicy::Discard`]
//! 2. Recompute each dependent's label, dropping environments that mention
//!    the retracted assumption
//! 3. A dependent whose label is now empty and whose justifications only name
//!    removed nodes is removed too, and its own dependents are queued
//!
//! A dependent is only re-queued when its label changed, so cycles terminate.
//! Cycles that lost their only outside support keep each other "alive" in step
//! 3; once the worklist drains, those are found as the largest set of emptied
//! nodes whose justifications stay inside `removed ∪ set`, and removed as well.
//!
//! Stripping an assumption out of a nogood leaves a smaller nogood that rules
//! out more environments, so when `⊥`'s label changed every label is
//! re-filtered at the end.

use std::collections::{HashSet, VecDeque};

use crate::error::{TmsError, TmsResult};
use crate::identifier::{CONTRADICTION, Identifier};
use crate::justification::JustificationId;
use crate::label::Label;
use crate::node::NodeKind;

use super::{RetractionPolicy, Tms};

/// Result of a retraction cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetractionResult {
    /// Nodes deleted from the store, the retracted assumption first.
    pub retracted: Vec<Identifier>,
    /// Surviving nodes whose label changed, with their new label.
    pub re_evaluated: Vec<(Identifier, Label)>,
    /// Justifications deleted because they collapsed or derived a deleted node.
    pub removed_justifications: Vec<JustificationId>,
    /// Maximum cascade depth reached.
    pub cascade_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    /// The node is gone; dependents must drop it from their antecedents.
    Removed,
    /// The node's label shrank; dependents must be recomputed.
    Changed,
}

impl Tms {
    /// Retract an assumption and cascade through its dependents.
    ///
    /// Only assumptions are retractable. Nodes left without support through
    /// the retracted assumption are deleted along with their justifications;
    /// nodes with an independent derivation survive with a smaller label.
    pub fn retract(&mut self, id: &Identifier) -> TmsResult<RetractionResult> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TmsError::UnknownNode { id: id.clone() })?;
        if node.kind != NodeKind::Assumption {
            return Err(TmsError::InvalidRetraction {
                id: id.clone(),
                kind: node.kind,
            });
        }

        let target = id.clone();
        let mut retracted = vec![target.clone()];
        let mut removed: HashSet<Identifier> = HashSet::from([target.clone()]);
        let mut emptied: HashSet<Identifier> = HashSet::new();
        // Every consequent reached, with its label before the cascade.
        let mut touched: Vec<(Identifier, Option<Label>)> = Vec::new();
        let mut seen: HashSet<Identifier> = HashSet::new();
        let mut removed_justifications = Vec::new();
        let mut max_depth = 0;

        let mut queue: VecDeque<(Identifier, Change, usize)> = VecDeque::new();
        queue.push_back((target.clone(), Change::Removed, 0));

        loop {
            while let Some((current, change, depth)) = queue.pop_front() {
                max_depth = max_depth.max(depth);

                for consequent in self.justifications.consequents_of(&current) {
                    if change == Change::Removed {
                        self.detach(&consequent, &current, &mut removed_justifications);
                    }
                    if seen.insert(consequent.clone()) {
                        let before = self.nodes.get(&consequent).map(|n| n.label.clone());
                        touched.push((consequent.clone(), before));
                    }
                    if removed.contains(&consequent) {
                        continue;
                    }
                    let derived = self
                        .nodes
                        .get(&consequent)
                        .is_some_and(|n| n.kind.is_derived());
                    if !derived {
                        continue;
                    }

                    let label = self.derive_label(&consequent, Some(&target));
                    let changed = self.set_label(&consequent, label);
                    let now_empty = self
                        .nodes
                        .get(&consequent)
                        .is_some_and(|n| n.label.is_empty());
                    tracing::debug!(
                        consequent = %consequent,
                        via = %current,
                        changed,
                        now_empty,
                        depth = depth + 1,
                        "consequent re-evaluated"
                    );

                    if now_empty {
                        emptied.insert(consequent.clone());
                    }
                    if now_empty && self.only_removed_support(&consequent, &removed) {
                        removed.insert(consequent.clone());
                        retracted.push(consequent.clone());
                        queue.push_back((consequent, Change::Removed, depth + 1));
                    } else if changed {
                        queue.push_back((consequent, Change::Changed, depth + 1));
                    }
                }
            }

            let dead = self.unsupported_cycle(&emptied, &removed);
            if dead.is_empty() {
                break;
            }
            for id in dead {
                removed.insert(id.clone());
                retracted.push(id.clone());
                queue.push_back((id, Change::Removed, max_depth + 1));
            }
        }

        // Cleanup: collapsed justifications, justifications of deleted nodes,
        // then the nodes themselves.
        let mut cleanup: Vec<&Identifier> = touched.iter().map(|(id, _)| id).collect();
        cleanup.push(&target);
        for id in cleanup {
            let ids = self.justifications.for_consequent(id).to_vec();
            for jid in ids {
                let collapsed = self
                    .justifications
                    .get(jid)
                    .is_some_and(|j| j.is_collapsed());
                if (collapsed || removed.contains(id)) && self.justifications.remove(jid).is_some() {
                    removed_justifications.push(jid);
                }
            }
        }
        for (id, _) in &touched {
            let unjustified = self
                .nodes
                .get(id)
                .is_some_and(|n| n.kind.is_derived())
                && self.justifications.for_consequent(id).is_empty();
            if unjustified && removed.insert(id.clone()) {
                retracted.push(id.clone());
            }
        }
        for id in &retracted {
            self.nodes.remove(id);
        }

        let nogoods_changed = touched
            .iter()
            .any(|(id, before)| *id == CONTRADICTION && before.as_ref() != self.nogoods());
        let refiltered = if nogoods_changed {
            self.enforce_nogoods()
        } else {
            Vec::new()
        };

        let mut re_evaluated: Vec<(Identifier, Label)> = touched
            .into_iter()
            .filter(|(id, _)| !removed.contains(id))
            .filter_map(|(id, before)| {
                let after = self.nodes.get(&id)?.label.clone();
                (before.as_ref() != Some(&after)).then_some((id, after))
            })
            .collect();
        for id in refiltered {
            if re_evaluated.iter().any(|(seen, _)| *seen == id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                re_evaluated.push((id, node.label.clone()));
            }
        }

        tracing::info!(
            assumption = %target,
            retracted = retracted.len(),
            re_evaluated = re_evaluated.len(),
            removed_justifications = removed_justifications.len(),
            cascade_depth = max_depth,
            "retraction complete"
        );

        Ok(RetractionResult {
            retracted,
            re_evaluated,
            removed_justifications,
            cascade_depth: max_depth,
        })
    }

    /// Unhook the removed node `gone` from the justifications of `consequent`
    /// according to the configured [`RetractionPolicy`].
    fn detach(
        &mut self,
        consequent: &Identifier,
        gone: &Identifier,
        removed_justifications: &mut Vec<JustificationId>,
    ) {
        let ids = self.justifications.for_consequent(consequent).to_vec();
        for jid in ids {
            match self.config.retraction {
                RetractionPolicy::Strip => {
                    self.justifications.strip_antecedent(jid, gone);
                }
                RetractionPolicy::Discard => {
                    let names_gone = self
                        .justifications
                        .get(jid)
                        .is_some_and(|j| j.depends_on(gone));
                    if !names_gone {
                        continue;
                    }
                    for member in self.justifications.group_of(jid) {
                        if self.justifications.remove(member).is_some() {
                            removed_justifications.push(member);
                        }
                    }
                }
            }
        }
    }

    /// Whether every active justification of `id` names only removed nodes.
    fn only_removed_support(&self, id: &Identifier, removed: &HashSet<Identifier>) -> bool {
        self.justifications
            .active_for(id)
            .iter()
            .filter_map(|jid| self.justifications.get(*jid))
            .all(|j| j.antecedents.iter().all(|a| removed.contains(a)))
    }

    /// The largest set of emptied, still-present derived nodes whose
    /// justifications only name removed nodes or each other.
    fn unsupported_cycle(
        &self,
        emptied: &HashSet<Identifier>,
        removed: &HashSet<Identifier>,
    ) -> Vec<Identifier> {
        let mut dead: HashSet<&Identifier> = emptied
            .iter()
            .filter(|id| !removed.contains(*id))
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .is_some_and(|n| n.kind.is_derived() && n.label.is_empty())
            })
            .collect();

        loop {
            let supported: Vec<&Identifier> = dead
                .iter()
                .copied()
                .filter(|id| {
                    self.justifications
                        .active_for(id)
                        .iter()
                        .filter_map(|jid| self.justifications.get(*jid))
                        .any(|j| {
                            j.antecedents
                                .iter()
                                .any(|a| !removed.contains(a) && !dead.contains(a))
                        })
                })
                .collect();
            if supported.is_empty() {
                break;
            }
            for id in supported {
                dead.remove(id);
            }
        }

        let mut dead: Vec<Identifier> = dead.into_iter().cloned().collect();
        dead.sort();
        dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::justification::Justification;
    use crate::tms::TmsConfig;

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    fn label(text: &str) -> Label {
        text.parse().unwrap()
    }

    fn justify(tms: &mut Tms, consequent: &str, antecedents: &[&str]) -> JustificationId {
        tms.add_justification(Justification::new(
            id(consequent),
            antecedents.iter().map(|a| id(a)),
            None,
        ))
        .unwrap()
    }

    fn assume(tms: &mut Tms, names: &[&str]) {
        for name in names {
            tms.add_node(id(name), NodeKind::Assumption).unwrap();
        }
    }

    #[test]
    fn full_collapse() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A"]);
        let j = justify(&mut tms, "P", &["A"]);

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.retracted, vec![id("A"), id("P")]);
        assert_eq!(result.removed_justifications, vec![j]);
        assert_eq!(tms.node_count(), 0);
        assert_eq!(tms.justification_count(), 0);
    }

    #[test]
    fn partial_independence() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A", "B"]);
        justify(&mut tms, "Q", &["B"]);
        justify(&mut tms, "P", &["A"]);
        justify(&mut tms, "Q", &["P"]);
        assert_eq!(tms.label(&id("Q")).unwrap(), &label("{{A},{B}}"));

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.retracted, vec![id("A"), id("P")]);
        assert_eq!(result.re_evaluated, vec![(id("Q"), label("{{B}}"))]);

        let remaining = tms.justifications_for(&id("Q"));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].antecedents, vec![id("B")]);
    }

    #[test]
    fn cyclic_graph_terminates() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A"]);
        justify(&mut tms, "P", &["A"]);
        justify(&mut tms, "Q", &["P"]);
        justify(&mut tms, "R", &["Q"]);
        justify(&mut tms, "Q", &["R"]);
        assert_eq!(tms.label(&id("R")).unwrap(), &label("{{A}}"));

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.retracted.len(), 4);
        assert_eq!(tms.node_count(), 0);
        assert_eq!(tms.justification_count(), 0);
    }

    #[test]
    fn cycle_with_outside_support_survives() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A", "B"]);
        justify(&mut tms, "Q", &["A"]);
        justify(&mut tms, "R", &["Q"]);
        justify(&mut tms, "Q", &["R"]);
        justify(&mut tms, "R", &["B"]);

        tms.retract(&id("A")).unwrap();
        assert_eq!(tms.label(&id("Q")).unwrap(), &label("{{B}}"));
        assert_eq!(tms.label(&id("R")).unwrap(), &label("{{B}}"));
    }

    #[test]
    fn chain_cascade_depth() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A"]);
        justify(&mut tms, "x", &["A"]);
        justify(&mut tms, "y", &["x"]);
        justify(&mut tms, "z", &["y"]);

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.retracted, vec![id("A"), id("x"), id("y"), id("z")]);
        assert_eq!(result.cascade_depth, 3);
    }

    #[test]
    fn retraction_strips_assumption_from_conjunction() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A", "B", "C"]);
        justify(&mut tms, "r", &["A", "B"]);
        justify(&mut tms, "r", &["C"]);
        justify(&mut tms, "g", &["r"]);

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.retracted, vec![id("A")]);

        // The stripped justification keeps its other antecedent, and labels
        // follow the justifications as they now stand.
        let antecedents: Vec<Vec<Identifier>> = tms
            .justifications_for(&id("r"))
            .iter()
            .map(|j| j.antecedents.clone())
            .collect();
        assert_eq!(antecedents, vec![vec![id("B")], vec![id("C")]]);
        assert_eq!(tms.label(&id("r")).unwrap(), &label("{{B},{C}}"));
        assert_eq!(tms.label(&id("g")).unwrap(), &label("{{B},{C}}"));
    }

    fn discarding() -> Tms {
        Tms::with_config(TmsConfig {
            retraction: RetractionPolicy::Discard,
            ..Default::default()
        })
    }

    #[test]
    fn discard_deletes_justifications_naming_removed_nodes() {
        let mut tms = discarding();
        assume(&mut tms, &["A", "B", "C"]);
        let j1 = justify(&mut tms, "r", &["A", "B"]);
        justify(&mut tms, "r", &["C"]);
        justify(&mut tms, "g", &["r"]);

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.removed_justifications, vec![j1]);
        assert_eq!(tms.label(&id("r")).unwrap(), &label("{{C}}"));
        assert_eq!(tms.label(&id("g")).unwrap(), &label("{{C}}"));
        assert_eq!(tms.justifications_for(&id("r")).len(), 1);
    }

    #[test]
    fn discard_removes_nodes_left_without_justifications() {
        let mut tms = discarding();
        assume(&mut tms, &["A", "B"]);
        justify(&mut tms, "r", &["A", "B"]);

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.retracted, vec![id("A"), id("r")]);
        assert!(tms.has_node(&id("B")));
        assert_eq!(tms.justification_count(), 0);
    }

    #[test]
    fn discard_drops_whole_conjunction_group() {
        let mut tms = discarding();
        assume(&mut tms, &["A", "B", "C"]);
        let j1 = justify(&mut tms, "r", &["A"]);
        let j2 = justify(&mut tms, "r", &["B"]);
        justify(&mut tms, "r", &["C"]);
        tms.conjoin(&[j1, j2]).unwrap();
        assert_eq!(tms.label(&id("r")).unwrap(), &label("{{A,B}}"));

        // With the conjunction gone, the justification it superseded counts again.
        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.removed_justifications, vec![j1, j2]);
        assert_eq!(tms.label(&id("r")).unwrap(), &label("{{C}}"));
    }

    #[test]
    fn retraction_inside_conjunction_group() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A", "B"]);
        let j1 = justify(&mut tms, "r", &["A"]);
        let j2 = justify(&mut tms, "r", &["B"]);
        tms.conjoin(&[j1, j2]).unwrap();
        assert_eq!(tms.label(&id("r")).unwrap(), &label("{{A,B}}"));

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.removed_justifications, vec![j1]);
        assert_eq!(tms.label(&id("r")).unwrap(), &label("{{B}}"));
        assert_eq!(tms.justification_store().derivations_of(&id("r")), vec![vec![j2]]);
    }

    #[test]
    fn retracting_a_nogood_assumption_removes_contradiction() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A", "B"]);
        justify(&mut tms, "⊥", &["A"]);
        justify(&mut tms, "r", &["B"]);

        tms.retract(&id("A")).unwrap();
        assert!(tms.nogoods().is_none());
        assert!(!tms.is_false(&id("r")).unwrap());
    }

    #[test]
    fn stripped_nogood_refilters_unrelated_labels() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A", "B", "C"]);
        justify(&mut tms, "⊥", &["A", "B"]);
        justify(&mut tms, "y", &["B", "C"]);
        justify(&mut tms, "z", &["y"]);
        assert_eq!(tms.label(&id("y")).unwrap(), &label("{{B,C}}"));

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(tms.nogoods(), Some(&label("{{B}}")));
        assert!(tms.is_out(&id("y")).unwrap());
        assert!(tms.is_out(&id("z")).unwrap());
        assert_eq!(
            result.re_evaluated,
            vec![
                (id("⊥"), label("{{B}}")),
                (id("y"), Label::no_environment()),
                (id("z"), Label::no_environment()),
            ]
        );
    }

    #[test]
    fn discarded_nogood_leaves_unrelated_labels_alone() {
        let mut tms = discarding();
        assume(&mut tms, &["A", "B", "C"]);
        justify(&mut tms, "⊥", &["A", "B"]);
        justify(&mut tms, "y", &["B", "C"]);

        let result = tms.retract(&id("A")).unwrap();
        assert_eq!(result.retracted, vec![id("A"), id("⊥")]);
        assert!(tms.nogoods().is_none());
        assert_eq!(tms.label(&id("y")).unwrap(), &label("{{B,C}}"));
    }

    #[test]
    fn only_assumptions_are_retractable() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A"]);
        tms.add_node(id("P"), NodeKind::Premise).unwrap();
        justify(&mut tms, "r", &["A"]);
        justify(&mut tms, "⊥", &["A"]);

        for name in ["P", "r", "⊥"] {
            let err = tms.retract(&id(name)).unwrap_err();
            assert!(matches!(err, TmsError::InvalidRetraction { .. }));
        }
        assert!(matches!(
            tms.retract(&id("missing")),
            Err(TmsError::UnknownNode { .. })
        ));
        assert_eq!(tms.node_count(), 4);
    }

    #[test]
    fn justified_assumption_loses_stripped_justification() {
        let mut tms = Tms::new();
        assume(&mut tms, &["A", "B"]);
        justify(&mut tms, "A", &["B"]);

        let result = tms.retract(&id("B")).unwrap();
        assert_eq!(result.retracted, vec![id("B")]);
        assert_eq!(result.removed_justifications.len(), 1);
        assert!(tms.has_node(&id("A")));
        assert!(tms.justifications_for(&id("A")).is_empty());
    }

    #[test]
    fn retraction_keeps_labels_minimal() {
        let mut tms = Tms::with_config(TmsConfig::default());
        assume(&mut tms, &["A", "B", "C"]);
        justify(&mut tms, "x", &["A"]);
        justify(&mut tms, "x", &["B", "C"]);
        justify(&mut tms, "y", &["x", "C"]);

        tms.retract(&id("A")).unwrap();
        assert_eq!(tms.label(&id("x")).unwrap(), &label("{{B,C}}"));
        assert_eq!(tms.label(&id("y")).unwrap(), &label("{{B,C}}"));
        assert!(tms.label(&id("y")).unwrap().is_minimal());
    }
}
