//! Scoped recording that is undone unless committed.
//!
//! A [`Transaction`] borrows a [`Recorder`] and remembers every assumption and
//! premise recorded through it. Dropping it without [`Transaction::commit`]
//! retracts those assumptions again, newest first, and everything derived
//! from them goes with them.

use crate::error::{TmsError, TmsResult};
use crate::identifier::Identifier;
use crate::justification::JustificationId;
use crate::node::NodeKind;
use crate::recorder::{JustificationBuilder, Recorder};
use crate::tms::{RetractionResult, Tms};

pub struct Transaction<'a> {
    recorder: &'a mut Recorder,
    recordings: Vec<(Identifier, NodeKind)>,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub fn new(recorder: &'a mut Recorder) -> Self {
        Self {
            recorder,
            recordings: Vec::new(),
            finished: false,
        }
    }

    pub fn assume(&mut self, id: &str) -> TmsResult<Identifier> {
        let id = self.recorder.assume(id)?;
        self.recordings.push((id.clone(), NodeKind::Assumption));
        Ok(id)
    }

    pub fn premise(&mut self, id: &str) -> TmsResult<Identifier> {
        let id = self.recorder.premise(id)?;
        self.recordings.push((id.clone(), NodeKind::Premise));
        Ok(id)
    }

    pub fn justify(&mut self, consequent: &str) -> JustificationBuilder<'_> {
        self.recorder.justify(consequent)
    }

    pub fn contradict<I>(&mut self, antecedents: I) -> TmsResult<JustificationId>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.recorder.contradict(antecedents)
    }

    pub fn conjoin(&mut self, justifications: &[JustificationId]) -> TmsResult<()> {
        self.recorder.conjoin(justifications)
    }

    pub fn retract(&mut self, id: &str) -> TmsResult<RetractionResult> {
        self.recorder.retract(id)
    }

    /// Always fails: a reset would discard state the rollback depends on.
    pub fn reset(&mut self) -> TmsResult<()> {
        Err(TmsError::ResetInTransaction)
    }

    pub fn tms(&self) -> &Tms {
        self.recorder.tms()
    }

    /// Keep everything recorded through this transaction.
    pub fn commit(mut self) {
        tracing::debug!(recorded = self.recordings.len(), "transaction committed");
        self.finished = true;
    }

    /// Undo the assumptions recorded through this transaction.
    pub fn rollback(mut self) {
        self.undo();
    }

    fn undo(&mut self) {
        self.finished = true;
        while let Some((id, kind)) = self.recordings.pop() {
            if kind == NodeKind::Premise {
                tracing::warn!(id = %id, "premise cannot be retracted, left in place on rollback");
                continue;
            }
            if let Err(err) = self.recorder.retract(id.as_str()) {
                tracing::warn!(id = %id, error = %err, "rollback could not retract assumption");
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    #[test]
    fn drop_rolls_back_assumptions() {
        let mut recorder = Recorder::new();
        recorder.assume("base").unwrap();
        {
            let mut tx = Transaction::new(&mut recorder);
            tx.assume("A").unwrap();
            tx.justify("P").with_antecedents(["A"]).unwrap();
            tx.justify("Q").with_antecedents(["base"]).unwrap();
            assert!(tx.tms().is_in(&id("P")).unwrap());
        }
        let tms = recorder.tms();
        assert!(!tms.has_node(&id("A")));
        assert!(!tms.has_node(&id("P")));
        assert!(tms.is_in(&id("Q")).unwrap());
    }

    #[test]
    fn commit_keeps_everything() {
        let mut recorder = Recorder::new();
        let mut tx = Transaction::new(&mut recorder);
        tx.assume("A").unwrap();
        tx.justify("P").with_antecedents(["A"]).unwrap();
        tx.commit();
        assert!(recorder.tms().is_in(&id("P")).unwrap());
    }

    #[test]
    fn rollback_leaves_premises() {
        let mut recorder = Recorder::new();
        let mut tx = Transaction::new(&mut recorder);
        tx.premise("P").unwrap();
        tx.assume("A").unwrap();
        tx.rollback();
        assert!(recorder.tms().has_node(&id("P")));
        assert!(!recorder.tms().has_node(&id("A")));
    }

    #[test]
    fn rollback_tolerates_manual_retraction() {
        let mut recorder = Recorder::new();
        let mut tx = Transaction::new(&mut recorder);
        tx.assume("A").unwrap();
        tx.assume("B").unwrap();
        tx.retract("A").unwrap();
        tx.rollback();
        assert_eq!(recorder.tms().node_count(), 0);
    }

    #[test]
    fn reset_is_refused() {
        let mut recorder = Recorder::new();
        let mut tx = Transaction::new(&mut recorder);
        tx.assume("A").unwrap();
        assert!(matches!(tx.reset(), Err(TmsError::ResetInTransaction)));
        assert!(tx.tms().has_node(&id("A")));
    }
}
