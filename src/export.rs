//! Export types for serializing engine state.
//!
//! These types flatten nodes and justifications into plain, text-valued
//! records suitable for JSON export. Labels are rendered in their textual
//! form, e.g. `{ {A,B}, {C} }`.

use serde::{Deserialize, Serialize};

use crate::justification::{Justification, JustificationId};
use crate::node::Node;
use crate::tms::Tms;

/// Exported node with its label in textual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    /// Node identifier.
    pub id: String,
    /// Node kind (Assumption, Premise, Justified, Contradiction).
    pub kind: String,
    /// Label in textual form.
    pub label: String,
    /// Number of environments in the label.
    pub environments: usize,
}

impl From<&Node> for NodeExport {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.to_string(),
            kind: node.kind.to_string(),
            label: node.label.to_string(),
            environments: node.label.len(),
        }
    }
}

/// Exported justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationExport {
    /// Justification handle.
    pub handle: u64,
    pub consequent: String,
    pub antecedents: Vec<String>,
    pub informant: Option<String>,
}

impl JustificationExport {
    pub fn new(handle: JustificationId, justification: &Justification) -> Self {
        Self {
            handle: handle.get(),
            consequent: justification.consequent.to_string(),
            antecedents: justification
                .antecedents
                .iter()
                .map(|a| a.to_string())
                .collect(),
            informant: justification.informant.clone(),
        }
    }
}

/// Full snapshot of a TMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmsExport {
    /// Nodes sorted by identifier.
    pub nodes: Vec<NodeExport>,
    /// Justifications in recording order.
    pub justifications: Vec<JustificationExport>,
}

impl TmsExport {
    pub fn from_tms(tms: &Tms) -> Self {
        Self {
            nodes: tms.nodes().into_iter().map(NodeExport::from).collect(),
            justifications: tms
                .justification_store()
                .iter()
                .map(|(id, j)| JustificationExport::new(id, j))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Recorder;

    #[test]
    fn snapshot_of_small_tms() {
        let mut recorder = Recorder::new();
        recorder.assume("A").unwrap();
        recorder.assume("B").unwrap();
        recorder
            .justify("r")
            .informant("rule")
            .with_antecedents(["A", "B"])
            .unwrap();

        let export = TmsExport::from_tms(recorder.tms());
        let ids: Vec<&str> = export.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "r"]);

        let r = &export.nodes[2];
        assert_eq!(r.kind, "Justified");
        assert_eq!(r.label, "{ {A,B} }");
        assert_eq!(r.environments, 1);

        assert_eq!(export.justifications.len(), 1);
        assert_eq!(export.justifications[0].antecedents, vec!["A", "B"]);
        assert_eq!(export.justifications[0].informant.as_deref(), Some("rule"));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut recorder = Recorder::new();
        recorder.premise("P").unwrap();
        let export = TmsExport::from_tms(recorder.tms());
        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"label\":\"{ {} }\""));

        let back: TmsExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, export);
    }
}
