//! Node identifiers.
//!
//! Every assumption, premise and derived fact is named by an [`Identifier`].
//! Identifiers are opaque text tokens: two identifiers are equal iff their
//! text is equal. They compare only against other identifiers, never against
//! raw strings, so a lookup always goes through an explicit [`Identifier::new`].

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Text of the reserved contradiction node.
pub const CONTRADICTION_TEXT: &str = "⊥";

/// The reserved contradiction node `⊥`.
///
/// Any environment in this node's label is a nogood.
pub const CONTRADICTION: Identifier = Identifier(Cow::Borrowed(CONTRADICTION_TEXT));

/// Opaque, text-valued name of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Cow<'static, str>);

impl Identifier {
    /// Create an identifier from owned or borrowed text.
    pub fn new(text: impl Into<String>) -> Self {
        Identifier(Cow::Owned(text.into()))
    }

    /// Borrow the underlying text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier must be quoted in the textual label form: it is
    /// empty, or holds whitespace, a brace, a comma, a quote or a backslash.
    pub fn needs_quoting(&self) -> bool {
        self.0.is_empty()
            || self
                .0
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | ',' | '"' | '\\'))
    }

    /// Whether this is the reserved contradiction identifier.
    pub fn is_contradiction(&self) -> bool {
        self.0 == CONTRADICTION_TEXT
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
