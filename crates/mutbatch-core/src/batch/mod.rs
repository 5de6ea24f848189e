//! Batch coordination.
//!
//! Drives every variant through locate, compile and the optional tool stage,
//! one variant at a time. A variant's failure is recorded and the batch moves
//! on; only setup failures end the run.

mod callback;
mod coordinator;
mod report;

pub use callback::{BatchCallback, VariantStage};
pub use coordinator::BatchCoordinator;
pub use report::{BatchReport, VariantOutcome, VariantStatus};
