// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # atms
//!
//! An assumption-based truth maintenance system. Facts are derived from
//! assumptions through justifications, and every fact carries the minimal
//! sets of assumptions ("environments") under which it is provable.
//!
//! ## Architecture
//!
//! - **Labels** (`label`): environments, labels and their algebra (conjoin,
//!   disjoin, subsumption, nogood filtering), plus the textual form
//! - **Engine** (`tms`): label propagation, explicit conjunction, retraction
//!   with cycle-safe cascades, queries
//! - **Recording** (`recorder`, `transaction`): fluent facade and scoped
//!   rollback
//! - **Grouping** (`class`): named node classes
//! - **Files** (`scenario`, `export`): TOML sessions and JSON snapshots
//!
//! ## Library usage
//!
//! ```
//! use atms::identifier::Identifier;
//! use atms::recorder::Recorder;
//!
//! let mut recorder = Recorder::new();
//! recorder.assume("A").unwrap();
//! recorder.assume("B").unwrap();
//! recorder.justify("r").with_antecedents(["A"]).unwrap();
//! recorder.justify("r").with_antecedents(["B"]).unwrap();
//!
//! let r = Identifier::new("r");
//! assert_eq!(recorder.tms().label(&r).unwrap().to_string(), "{ {A}, {B} }");
//!
//! recorder.retract("A").unwrap();
//! assert_eq!(recorder.tms().label(&r).unwrap().to_string(), "{ {B} }");
//! ```

pub mod class;
pub mod error;
pub mod export;
pub mod identifier;
pub mod justification;
pub mod label;
pub mod node;
pub mod recorder;
pub mod scenario;
pub mod tms;
pub mod transaction;
