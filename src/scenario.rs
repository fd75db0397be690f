//! Scenario files: a whole TMS session described in TOML.
//!
//! ```toml
//! assumptions = ["A", "B"]
//! premises = ["P"]
//! retract = ["A"]
//!
//! [config]
//! refilter_on_nogood = true
//!
//! [[justify]]
//! consequent = "r"
//! antecedents = ["A", "P"]
//! informant = "rule 1"
//!
//! [[contradict]]
//! antecedents = ["A", "B"]
//!
//! [[conjoin]]
//! consequent = "r"
//! ```
//!
//! Sections are applied in a fixed order: assumptions, premises, every
//! justification consequent is declared, then justifications, contradictions,
//! conjunctions and finally retractions. Justifications may therefore name
//! consequents of entries further down the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, TmsResult};
use crate::identifier::Identifier;
use crate::recorder::Recorder;
use crate::tms::TmsConfig;

/// A `[[justify]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustifyEntry {
    pub consequent: String,
    pub antecedents: Vec<String>,
    #[serde(default)]
    pub informant: Option<String>,
}

/// A `[[contradict]]` entry: antecedents that never hold together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictEntry {
    pub antecedents: Vec<String>,
}

/// A `[[conjoin]]` entry: all justifications of `consequent` recorded so far
/// become one conjunctive derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjoinEntry {
    pub consequent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: TmsConfig,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub premises: Vec<String>,
    #[serde(default)]
    pub justify: Vec<JustifyEntry>,
    #[serde(default)]
    pub contradict: Vec<ContradictEntry>,
    #[serde(default)]
    pub conjoin: Vec<ConjoinEntry>,
    /// Assumptions to retract, in order, after everything else.
    #[serde(default)]
    pub retract: Vec<String>,
}

impl Scenario {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScenarioError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse TOML text; `origin` names the source in errors.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ScenarioError> {
        toml::from_str(content).map_err(|e| ScenarioError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Replay the scenario into a fresh recorder.
    pub fn apply(&self) -> TmsResult<Recorder> {
        let mut recorder = Recorder::with_config(self.config.clone());
        for id in &self.assumptions {
            recorder.assume(id)?;
        }
        for id in &self.premises {
            recorder.premise(id)?;
        }
        for entry in &self.justify {
            recorder.declare(&entry.consequent);
        }
        for entry in &self.justify {
            let mut builder = recorder.justify(&entry.consequent);
            if let Some(ref informant) = entry.informant {
                builder = builder.informant(informant.as_str());
            }
            builder.with_antecedents(&entry.antecedents)?;
        }
        for entry in &self.contradict {
            recorder.contradict(&entry.antecedents)?;
        }
        for entry in &self.conjoin {
            let handles = recorder
                .tms()
                .justification_store()
                .for_consequent(&Identifier::new(entry.consequent.as_str()))
                .to_vec();
            recorder.conjoin(&handles)?;
        }
        for id in &self.retract {
            recorder.retract(id)?;
        }
        tracing::debug!(
            nodes = recorder.tms().node_count(),
            justifications = recorder.tms().justification_count(),
            "scenario applied"
        );
        Ok(recorder)
    }
}
