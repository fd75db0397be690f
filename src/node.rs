//! Node records: a kind and a label.

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;
use crate::label::Label;

/// How a node came to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// True unless retracted; its own identifier is its sole support.
    Assumption,
    /// Always true, independent of any assumption.
    Premise,
    /// Derived solely through justifications.
    Justified,
    /// The reserved `⊥` node; its label is the set of nogoods.
    Contradiction,
}

impl NodeKind {
    /// Whether the label of this kind is recomputed from justifications.
    pub fn is_derived(self) -> bool {
        matches!(self, NodeKind::Justified | NodeKind::Contradiction)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Assumption => write!(f, "Assumption"),
            NodeKind::Premise => write!(f, "Premise"),
            NodeKind::Justified => write!(f, "Justified"),
            NodeKind::Contradiction => write!(f, "Contradiction"),
        }
    }
}

/// A node of the TMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Identifier,
    pub kind: NodeKind,
    pub label: Label,
}

impl Node {
    /// Create a node with the initial label its kind prescribes.
    pub fn new(id: Identifier, kind: NodeKind) -> Self {
        let label = match kind {
            NodeKind::Assumption => Label::singleton(id.clone()),
            NodeKind::Premise => Label::empty_environment(),
            NodeKind::Justified | NodeKind::Contradiction => Label::no_environment(),
        };
        Self { id, kind, label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_labels_follow_kind() {
        let a = Node::new(Identifier::new("A"), NodeKind::Assumption);
        assert_eq!(a.label, Label::singleton(Identifier::new("A")));

        let p = Node::new(Identifier::new("P"), NodeKind::Premise);
        assert_eq!(p.label, Label::empty_environment());

        let j = Node::new(Identifier::new("J"), NodeKind::Justified);
        assert!(j.label.is_empty());
    }

    #[test]
    fn derived_kinds() {
        assert!(NodeKind::Justified.is_derived());
        assert!(NodeKind::Contradiction.is_derived());
        assert!(!NodeKind::Assumption.is_derived());
        assert!(!NodeKind::Premise.is_derived());
    }
}
