//! Terminal progress reporting for batch runs.

use mutbatch_core::batch::VariantStage;
use mutbatch_core::{BatchCallback, VariantOutcome, VariantStatus};

use crate::colors;

/// Progress callback that prints one line per variant.
pub struct ProgressCallback {
    /// Whether to print stage transitions.
    verbose: bool,
}

impl ProgressCallback {
    /// Create a new progress callback.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl BatchCallback for ProgressCallback {
    fn on_batch_started(&self, variant_count: usize) {
        println!(
            "{}Compiling{} {} variant(s)",
            colors::BOLD,
            colors::RESET,
            variant_count
        );
    }

    fn on_stage(&self, variant_id: &str, stage: VariantStage) {
        if self.verbose {
            println!("{}  {} {}{}", colors::DIM, variant_id, stage, colors::RESET);
        }
    }

    fn on_variant_done(&self, outcome: &VariantOutcome) {
        let id = &outcome.variant_id;
        match &outcome.status {
            VariantStatus::Succeeded { units, tool_ran } => {
                let suffix = if *tool_ran { ", tool ok" } else { "" };
                println!(
                    "  {}✓{} {} ({} unit(s){})",
                    colors::GREEN,
                    colors::RESET,
                    id,
                    units,
                    suffix
                );
            }
            VariantStatus::LocateFailed { reason } => {
                println!(
                    "  {}?{} {} {}{}{}",
                    colors::YELLOW,
                    colors::RESET,
                    id,
                    colors::DIM,
                    reason,
                    colors::RESET
                );
            }
            VariantStatus::CompileFailed { exit_code } => {
                println!(
                    "  {}✗{} {} compile failed{}",
                    colors::RED,
                    colors::RESET,
                    id,
                    exit_suffix(*exit_code)
                );
            }
            VariantStatus::ToolFailed {
                unit, exit_code, ..
            } => {
                println!(
                    "  {}✗{} {} tool failed on {}{}",
                    colors::RED,
                    colors::RESET,
                    id,
                    unit,
                    exit_suffix(*exit_code)
                );
            }
        }
        colors::flush_stdout();
    }
}

fn exit_suffix(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" (exit {})", code),
        None => " (terminated by signal)".to_string(),
    }
}
