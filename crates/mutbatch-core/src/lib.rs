//! Core pipeline for batch-compiling mutant variants.
//!
//! This crate provides:
//! - Workspace management (one isolated, retained directory per run)
//! - Compilation pipeline (baseline packaging, variant lookup, compilation)
//! - Bytecode tool stage (one external invocation per compiled unit)
//! - Batch coordination with per-variant failure logs
//! - Equivalence detection over compiled variants

pub mod analyze;
pub mod batch;
pub mod compile;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod failure;
pub mod workspace;

mod walk;

pub use batch::{BatchCallback, BatchCoordinator, BatchReport, VariantOutcome, VariantStatus};
pub use config::{BatchConfig, ClasspathOrder, ClasspathSource, ToolStage};
pub use equivalence::{
    EquivalenceDiff, EquivalenceReport, compare_equivalences, detect_equivalences,
    parse_equivalences,
};
pub use error::{Error, Result};
pub use failure::{FailureLog, FailureRecord};
pub use workspace::{LocationReport, Workspace};
