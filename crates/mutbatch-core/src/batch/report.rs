//! Batch results.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

use super::callback::VariantStage;

/// How a variant's pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum VariantStatus {
    /// Zero or several source files; never reached the compiler.
    LocateFailed { reason: String },

    /// The compiler exited non-zero; tool stage skipped.
    CompileFailed { exit_code: Option<i32> },

    /// Compiled, but the tool failed on `unit`; later units skipped.
    ToolFailed {
        units: usize,
        unit: String,
        exit_code: Option<i32>,
    },

    /// Compiled, and the tool (if configured) processed every unit.
    Succeeded { units: usize, tool_ran: bool },
}

/// Result of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOutcome {
    /// Variant id.
    pub variant_id: String,

    /// Located source file, if lookup succeeded.
    pub source: Option<PathBuf>,

    /// Stage the variant was in when its pipeline ended.
    pub reached: VariantStage,

    /// Final status.
    #[serde(flatten)]
    pub status: VariantStatus,
}

impl VariantOutcome {
    /// Returns true if the variant produced compiled output.
    pub fn compiled(&self) -> bool {
        matches!(
            self.status,
            VariantStatus::ToolFailed { .. } | VariantStatus::Succeeded { .. }
        )
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Per-variant outcomes, in processing order.
    pub variants: Vec<VariantOutcome>,

    /// Rendered compile classpath.
    pub classpath: String,
}

impl BatchReport {
    /// Total number of variants.
    pub fn total(&self) -> usize {
        self.variants.len()
    }

    /// Variants with compiled output.
    pub fn compiled(&self) -> usize {
        self.variants.iter().filter(|v| v.compiled()).count()
    }

    /// Variants whose source lookup failed.
    pub fn locate_failures(&self) -> usize {
        self.count(|s| matches!(s, VariantStatus::LocateFailed { .. }))
    }

    /// Variants that failed to compile.
    pub fn compile_failures(&self) -> usize {
        self.count(|s| matches!(s, VariantStatus::CompileFailed { .. }))
    }

    /// Variants whose tool stage failed.
    pub fn tool_failures(&self) -> usize {
        self.count(|s| matches!(s, VariantStatus::ToolFailed { .. }))
    }

    /// Variants that went through every configured stage.
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, VariantStatus::Succeeded { .. }))
    }

    /// Look up a variant's outcome.
    pub fn get(&self, variant_id: &str) -> Option<&VariantOutcome> {
        self.variants.iter().find(|v| v.variant_id == variant_id)
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn count(&self, pred: impl Fn(&VariantStatus) -> bool) -> usize {
        self.variants.iter().filter(|v| pred(&v.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outcome(id: &str, status: VariantStatus) -> VariantOutcome {
        VariantOutcome {
            variant_id: id.to_string(),
            source: None,
            reached: VariantStage::Done,
            status,
        }
    }

    fn sample() -> BatchReport {
        BatchReport {
            variants: vec![
                outcome("1", VariantStatus::Succeeded { units: 2, tool_ran: true }),
                outcome("2", VariantStatus::LocateFailed { reason: "none".into() }),
                outcome("3", VariantStatus::CompileFailed { exit_code: Some(1) }),
                outcome(
                    "4",
                    VariantStatus::ToolFailed {
                        units: 3,
                        unit: "p.B".into(),
                        exit_code: Some(1),
                    },
                ),
            ],
            classpath: "a.jar".to_string(),
        }
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.total(), 4);
        assert_eq!(report.compiled(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.locate_failures(), 1);
        assert_eq!(report.compile_failures(), 1);
        assert_eq!(report.tool_failures(), 1);
        assert_eq!(
            report.compiled() + report.compile_failures() + report.locate_failures(),
            report.total()
        );
    }

    #[test]
    fn test_write_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.json");
        sample().write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["variants"][2]["status"], "compile-failed");
        assert_eq!(value["variants"][2]["exit_code"], 1);
        assert_eq!(value["variants"][3]["unit"], "p.B");
        assert_eq!(value["classpath"], "a.jar");
    }
}
