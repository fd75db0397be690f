//! Fluent recording facade over the engine.
//!
//! [`Recorder`] is the usual entry point: it names nodes by plain text and
//! builds justifications step by step.
//!
//! ```
//! use atms::identifier::Identifier;
//! use atms::recorder::Recorder;
//!
//! let mut recorder = Recorder::new();
//! recorder.assume("rain").unwrap();
//! recorder
//!     .justify("wet_grass")
//!     .informant("rain wets grass")
//!     .with_antecedents(["rain"])
//!     .unwrap();
//! assert!(recorder.tms().is_in(&Identifier::new("wet_grass")).unwrap());
//! ```

use crate::error::{TmsError, TmsResult};
use crate::identifier::{CONTRADICTION, Identifier};
use crate::justification::{Justification, JustificationId};
use crate::node::NodeKind;
use crate::tms::{RetractionResult, Tms, TmsConfig};

/// Records assumptions, premises and justifications into a [`Tms`].
#[derive(Debug, Default)]
pub struct Recorder {
    tms: Tms,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TmsConfig) -> Self {
        Self {
            tms: Tms::with_config(config),
        }
    }

    /// Record an assumption: a fact that holds until retracted.
    pub fn assume(&mut self, id: &str) -> TmsResult<Identifier> {
        let id = Identifier::new(id);
        self.tms.add_node(id.clone(), NodeKind::Assumption)?;
        Ok(id)
    }

    /// Record a premise: a fact that always holds.
    pub fn premise(&mut self, id: &str) -> TmsResult<Identifier> {
        let id = Identifier::new(id);
        self.tms.add_node(id.clone(), NodeKind::Premise)?;
        Ok(id)
    }

    /// Declare a derived node without support, if it does not exist yet.
    pub fn declare(&mut self, id: &str) -> Identifier {
        let id = Identifier::new(id);
        self.tms.ensure_consequent(&id);
        id
    }

    /// Start a justification for `consequent`.
    ///
    /// The consequent is created right away (unsupported) if it does not
    /// exist yet.
    pub fn justify(&mut self, consequent: &str) -> JustificationBuilder<'_> {
        let consequent = Identifier::new(consequent);
        self.tms.ensure_consequent(&consequent);
        JustificationBuilder {
            tms: &mut self.tms,
            consequent,
            informant: None,
        }
    }

    /// Declare that the antecedents can never hold together.
    pub fn contradict<I>(&mut self, antecedents: I) -> TmsResult<JustificationId>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let antecedents: Vec<Identifier> = antecedents
            .into_iter()
            .map(|a| Identifier::new(a.as_ref()))
            .collect();
        if antecedents.is_empty() {
            return Err(TmsError::EmptyAntecedents {
                consequent: CONTRADICTION,
            });
        }
        self.tms
            .add_justification(Justification::new(CONTRADICTION, antecedents, None))
    }

    /// Treat recorded justifications as one conjunctive derivation.
    ///
    /// An empty list does nothing.
    pub fn conjoin(&mut self, justifications: &[JustificationId]) -> TmsResult<()> {
        if justifications.is_empty() {
            return Ok(());
        }
        self.tms.conjoin(justifications)
    }

    pub fn retract(&mut self, id: &str) -> TmsResult<RetractionResult> {
        self.tms.retract(&Identifier::new(id))
    }

    pub fn reset(&mut self) -> TmsResult<()> {
        self.tms.reset();
        Ok(())
    }

    /// Read access to the engine, for queries.
    pub fn tms(&self) -> &Tms {
        &self.tms
    }

    pub fn into_tms(self) -> Tms {
        self.tms
    }
}

impl From<Tms> for Recorder {
    fn from(tms: Tms) -> Self {
        Self { tms }
    }
}

/// A justification under construction. Finish it with
/// [`with_antecedents`](JustificationBuilder::with_antecedents).
#[must_use = "a justification is only recorded by `with_antecedents`"]
pub struct JustificationBuilder<'a> {
    tms: &'a mut Tms,
    consequent: Identifier,
    informant: Option<String>,
}

impl JustificationBuilder<'_> {
    /// Attach a human-readable annotation.
    pub fn informant(mut self, text: impl Into<String>) -> Self {
        self.informant = Some(text.into());
        self
    }

    /// Record the justification with these antecedents, all of which must
    /// hold together.
    pub fn with_antecedents<I>(self, antecedents: I) -> TmsResult<JustificationId>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let antecedents: Vec<Identifier> = antecedents
            .into_iter()
            .map(|a| Identifier::new(a.as_ref()))
            .collect();
        if antecedents.is_empty() {
            return Err(TmsError::EmptyAntecedents {
                consequent: self.consequent,
            });
        }
        self.tms.add_justification(Justification::new(
            self.consequent,
            antecedents,
            self.informant,
        ))
    }
}
