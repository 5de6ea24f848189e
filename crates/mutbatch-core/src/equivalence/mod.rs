//! Equivalence analysis over compiled variants.
//!
//! Two variants are *redundant* when they compiled to byte-identical units
//! under the same relative paths. A variant is *equivalent* when its units
//! are byte-identical to the baseline's units at those paths. The baseline
//! takes part in classes under the id [`BASELINE_ID`].

mod compare;
mod detect;

pub use compare::{EquivalenceDiff, Mismatch, compare_equivalences, parse_equivalences};
pub use detect::{DetectPhase, EquivalenceClass, EquivalenceReport, detect_equivalences};

/// Id standing for the baseline inside equivalence classes.
pub const BASELINE_ID: &str = "0";
