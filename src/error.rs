//! Rich diagnostic error types for the ATMS.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly which usage
//! mistake was made and how to fix it. None of these are transient: the engine
//! never retries, it reports.

use miette::Diagnostic;
use thiserror::Error;

use crate::identifier::Identifier;
use crate::justification::JustificationId;
use crate::node::NodeKind;

/// Top-level error type for the crate.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum AtmsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Tms(#[from] TmsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Class(#[from] ClassError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scenario(#[from] ScenarioError),
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TmsError {
    #[error("unknown node: {id}")]
    #[diagnostic(
        code(atms::tms::unknown_node),
        help(
            "No node with this identifier is recorded. Assume or premise it first, \
             or name it as the consequent of a justification."
        )
    )]
    UnknownNode { id: Identifier },

    #[error("duplicate node: {id}")]
    #[diagnostic(
        code(atms::tms::duplicate_node),
        help("A node with this identifier already exists. Identifiers are unique per TMS.")
    )]
    DuplicateNode { id: Identifier },

    #[error("cannot retract {kind} node {id}")]
    #[diagnostic(
        code(atms::tms::invalid_retraction),
        help(
            "Only assumptions can be retracted. Justified nodes and contradictions \
             are derived, and premises always hold: retract the assumption that \
             supports them instead."
        )
    )]
    InvalidRetraction { id: Identifier, kind: NodeKind },

    #[error("justification {id} is not recorded")]
    #[diagnostic(
        code(atms::tms::unrecorded_justification),
        help("Record the justification before conjoining it.")
    )]
    UnrecordedJustification { id: JustificationId },

    #[error("conjoined justifications must share one consequent: expected {expected}, found {found}")]
    #[diagnostic(
        code(atms::tms::mismatched_consequent),
        help("Only justifications of the same consequent can be conjoined.")
    )]
    MismatchedConsequent {
        expected: Identifier,
        found: Identifier,
    },

    #[error("justification for {consequent} has no antecedents")]
    #[diagnostic(
        code(atms::tms::empty_antecedents),
        help("A justification needs at least one antecedent node.")
    )]
    EmptyAntecedents { consequent: Identifier },

    #[error("cannot conjoin an empty list of justifications")]
    #[diagnostic(
        code(atms::tms::empty_conjunction),
        help("Pass at least one recorded justification handle.")
    )]
    EmptyConjunction,

    #[error("reset is not allowed inside a transaction")]
    #[diagnostic(
        code(atms::tms::reset_in_transaction),
        help("Commit or roll back the transaction before resetting the TMS.")
    )]
    ResetInTransaction,
}

// ---------------------------------------------------------------------------
// Label parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LabelError {
    #[error("malformed label: nesting deeper than two levels at offset {offset}")]
    #[diagnostic(
        code(atms::label::too_deep),
        help("A label is a set of environments: `{{ {{A,B}}, {{C}} }}`. Only two levels of braces are allowed.")
    )]
    TooDeep { offset: usize },

    #[error("malformed label: {open} opening and {close} closing braces")]
    #[diagnostic(
        code(atms::label::unbalanced),
        help("Every `{{` needs a matching `}}`.")
    )]
    Unbalanced { open: usize, close: usize },

    #[error("malformed label: empty item at offset {offset}")]
    #[diagnostic(
        code(atms::label::empty_item),
        help("An item in a non-empty environment cannot be empty. Remove the stray comma.")
    )]
    EmptyItem { offset: usize },

    #[error("malformed label: unexpected {found:?} at offset {offset}")]
    #[diagnostic(
        code(atms::label::unexpected_token),
        help("Identifiers may only appear inside an environment, e.g. `{{ {{A}} }}`.")
    )]
    UnexpectedToken { offset: usize, found: char },

    #[error("malformed label: quoted identifier starting at offset {offset} is not closed")]
    #[diagnostic(
        code(atms::label::unterminated_quote),
        help("Close the identifier with `\"`. Inside quotes, write `\\\"` and `\\\\` for a quote and a backslash.")
    )]
    UnterminatedQuote { offset: usize },
}

// ---------------------------------------------------------------------------
// Node class errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClassError {
    #[error("class {class} is closed, cannot add {id}")]
    #[diagnostic(
        code(atms::class::closed),
        help("A closed class cannot be extended. Add members before calling `close()`.")
    )]
    Closed { class: String, id: Identifier },
}

// ---------------------------------------------------------------------------
// Scenario errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ScenarioError {
    #[error("failed to read scenario: {path}")]
    #[diagnostic(
        code(atms::scenario::read),
        help("Ensure the scenario file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario {path}: {message}")]
    #[diagnostic(
        code(atms::scenario::parse),
        help("Check the TOML syntax and the field names of the scenario file.")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for engine results.
pub type TmsResult<T> = std::result::Result<T, TmsError>;

/// Convenience alias for label parsing results.
pub type LabelResult<T> = std::result::Result<T, LabelError>;

/// Convenience alias for crate-level results.
pub type AtmsResult<T> = std::result::Result<T, AtmsError>;
