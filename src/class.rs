//! Node classes: named groups of nodes.
//!
//! A node may belong to any number of classes and a class may have any number
//! of members. Membership says nothing about whether a node holds. Members can
//! be added until the class is closed and can never be removed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ClassError;
use crate::identifier::Identifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeClass {
    name: String,
    members: BTreeSet<Identifier>,
    open: bool,
}

impl NodeClass {
    /// Create an empty, open class.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeSet::new(),
            open: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a member. Returns whether it was new.
    pub fn insert(&mut self, id: Identifier) -> Result<bool, ClassError> {
        if !self.open {
            return Err(ClassError::Closed {
                class: self.name.clone(),
                id,
            });
        }
        Ok(self.members.insert(id))
    }

    /// Refuse any further members.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.members.iter()
    }

    pub fn is_subset_of(&self, other: &NodeClass) -> bool {
        self.members.is_subset(&other.members)
    }

    pub fn is_superset_of(&self, other: &NodeClass) -> bool {
        self.members.is_superset(&other.members)
    }

    pub fn overlaps(&self, other: &NodeClass) -> bool {
        !self.members.is_disjoint(&other.members)
    }
}
