//! Progress reporting for batch runs.

use std::fmt;

use serde::Serialize;

use super::report::VariantOutcome;

/// Per-variant pipeline stage.
///
/// ```text
/// Pending ─► Located ─► Compiled ─► ToolRun ─► Done
///    │          │           │          │
///    └──────────┴───────────┴──────────┴──► Done (failed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantStage {
    Pending,
    Located,
    Compiled,
    ToolRun,
    Done,
}

impl fmt::Display for VariantStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Located => "located",
            Self::Compiled => "compiled",
            Self::ToolRun => "tool-run",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Callback trait for batch progress reporting.
pub trait BatchCallback: Send + Sync {
    /// Called once before the first variant.
    fn on_batch_started(&self, _variant_count: usize) {}

    /// Called when a variant enters a new stage.
    fn on_stage(&self, _variant_id: &str, _stage: VariantStage) {}

    /// Called when a variant is finished, successfully or not.
    fn on_variant_done(&self, _outcome: &VariantOutcome) {}
}
