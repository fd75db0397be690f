//! Read-only queries over a [`Tms`].

use crate::error::{TmsError, TmsResult};
use crate::identifier::Identifier;
use crate::justification::{Justification, JustificationId};
use crate::label::{Environment, Label};
use crate::node::{Node, NodeKind};

use super::Tms;

impl Tms {
    /// Look up a node by identifier.
    pub fn node(&self, id: &Identifier) -> TmsResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| TmsError::UnknownNode { id: id.clone() })
    }

    pub fn has_node(&self, id: &Identifier) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn label(&self, id: &Identifier) -> TmsResult<&Label> {
        self.node(id).map(|n| &n.label)
    }

    /// The node holds in no environment.
    pub fn is_out(&self, id: &Identifier) -> TmsResult<bool> {
        Ok(self.label(id)?.is_empty())
    }

    /// The node holds in at least one non-empty environment.
    pub fn is_in(&self, id: &Identifier) -> TmsResult<bool> {
        Ok(self.label(id)?.iter().any(|env| !env.is_empty()))
    }

    /// The node holds unconditionally.
    pub fn is_true(&self, id: &Identifier) -> TmsResult<bool> {
        Ok(self.label(id)?.contains_empty_environment())
    }

    /// Some nogood environment supports the node, so every environment in
    /// which it would be derived from that nogood is inconsistent.
    ///
    /// Always `false` while no contradiction has been recorded.
    pub fn is_false(&self, id: &Identifier) -> TmsResult<bool> {
        let label = self.label(id)?;
        Ok(self
            .nogoods()
            .is_some_and(|nogoods| nogoods.iter().any(|bad| label.is_supported_by(bad))))
    }

    /// The node's label has an environment equal to, or a subset of, `env`.
    pub fn is_supported_by(&self, id: &Identifier, env: &Environment) -> TmsResult<bool> {
        Ok(self.label(id)?.is_supported_by(env))
    }

    /// Every assumption mentioned by the node's label.
    pub fn environment(&self, id: &Identifier) -> TmsResult<Environment> {
        Ok(self.label(id)?.flatten())
    }

    /// Identifiers of all assumption nodes, sorted.
    pub fn assumptions(&self) -> Vec<Identifier> {
        let mut ids: Vec<Identifier> = self
            .nodes
            .values()
            .filter(|n| n.kind == NodeKind::Assumption)
            .map(|n| n.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Justifications recorded directly for `consequent`, in recording order.
    pub fn justifications_for(&self, consequent: &Identifier) -> Vec<&Justification> {
        self.justifications
            .for_consequent(consequent)
            .iter()
            .filter_map(|id| self.justifications.get(*id))
            .collect()
    }

    pub fn justification(&self, id: JustificationId) -> Option<&Justification> {
        self.justifications.get(id)
    }

    /// All nodes, sorted by identifier.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn justification_count(&self) -> usize {
        self.justifications.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    fn env(ids: &[&str]) -> Environment {
        ids.iter().map(|s| id(s)).collect()
    }

    fn sample() -> Tms {
        let mut tms = Tms::new();
        for name in ["A", "B", "D"] {
            tms.add_node(id(name), NodeKind::Assumption).unwrap();
        }
        tms.add_node(id("P"), NodeKind::Premise).unwrap();
        for (consequent, antecedents) in [("x", vec!["A", "D"]), ("x", vec!["B", "D"]), ("t", vec!["P"])] {
            tms.add_justification(Justification::new(
                id(consequent),
                antecedents.into_iter().map(id),
                None,
            ))
            .unwrap();
        }
        tms
    }

    #[test]
    fn unknown_node_lookup_fails() {
        let tms = sample();
        assert!(matches!(
            tms.node(&id("nope")),
            Err(TmsError::UnknownNode { .. })
        ));
        assert!(tms.is_out(&id("nope")).is_err());
    }

    #[test]
    fn in_out_true() {
        let mut tms = sample();
        tms.ensure_consequent(&id("empty"));

        assert!(tms.is_out(&id("empty")).unwrap());
        assert!(!tms.is_in(&id("empty")).unwrap());

        assert!(tms.is_in(&id("x")).unwrap());
        assert!(!tms.is_true(&id("x")).unwrap());

        assert!(tms.is_true(&id("t")).unwrap());
        assert!(!tms.is_in(&id("t")).unwrap());
        assert!(tms.is_true(&id("P")).unwrap());
    }

    #[test]
    fn supported_by_and_environment() {
        let tms = sample();
        assert!(tms.is_supported_by(&id("x"), &env(&["A", "D"])).unwrap());
        assert!(tms.is_supported_by(&id("x"), &env(&["A", "B", "D"])).unwrap());
        assert!(!tms.is_supported_by(&id("x"), &env(&["A", "B"])).unwrap());
        assert_eq!(tms.environment(&id("x")).unwrap(), env(&["A", "B", "D"]));
    }

    #[test]
    fn is_false_follows_nogoods() {
        let mut tms = sample();
        assert!(!tms.is_false(&id("A")).unwrap());

        tms.add_justification(Justification::new(id("⊥"), [id("A"), id("B")], None))
            .unwrap();
        assert!(tms.is_false(&id("A")).unwrap());
        assert!(tms.is_false(&id("B")).unwrap());
        assert!(!tms.is_false(&id("D")).unwrap());
    }

    #[test]
    fn listings_are_sorted() {
        let tms = sample();
        assert_eq!(tms.assumptions(), vec![id("A"), id("B"), id("D")]);
        let ids: Vec<&str> = tms.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "D", "P", "t", "x"]);
        assert_eq!(tms.justifications_for(&id("x")).len(), 2);
        assert_eq!(tms.justification_count(), 3);
    }
}
