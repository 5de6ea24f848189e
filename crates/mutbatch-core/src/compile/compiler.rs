//! Variant compiler.
//!
//! Compiles exactly one located source file per variant into that variant's
//! private output directory.

use std::ffi::OsString;
use std::path::Path;
use std::time::Instant;

use crate::error::Result;
use crate::failure::{FailureLog, FailureRecord};

use super::classpath::Classpath;
use super::locator::LocatedSource;
use super::process::Outcome;
use super::toolchain::Toolchain;

/// Compiles variant sources against a shared classpath.
pub struct VariantCompiler<'a> {
    /// Toolchain providing the compiler command
    toolchain: &'a Toolchain,

    /// Shared compile classpath
    classpath: &'a Classpath,

    /// Extra compiler flags
    compiler_args: &'a [String],

    /// Where failed compiles are recorded
    failures: FailureLog,
}

impl<'a> VariantCompiler<'a> {
    /// Create a compiler.
    pub fn new(
        toolchain: &'a Toolchain,
        classpath: &'a Classpath,
        compiler_args: &'a [String],
        failures: FailureLog,
    ) -> Self {
        Self {
            toolchain,
            classpath,
            compiler_args,
            failures,
        }
    }

    /// Arguments for compiling `source` into `output_dir`.
    pub fn arguments(&self, source: &LocatedSource, output_dir: &Path) -> Result<Vec<OsString>> {
        let mut args: Vec<OsString> = self.compiler_args.iter().map(OsString::from).collect();
        if !self.classpath.is_empty() {
            args.push("-cp".into());
            args.push(self.classpath.to_arg()?);
        }
        args.push("-d".into());
        args.push(output_dir.into());
        args.push(source.path().into());
        Ok(args)
    }

    /// Compile one variant.
    ///
    /// A compiler failure is recorded in the compile failure log and returned
    /// as [`Outcome::Failed`]; only a failure to run the compiler at all, or
    /// to write the log, is an error.
    pub fn compile(&self, source: &LocatedSource, output_dir: &Path) -> Result<Outcome> {
        let start = Instant::now();
        let outcome = self
            .toolchain
            .compiler
            .run(self.arguments(source, output_dir)?)?;

        match &outcome {
            Outcome::Success => {
                tracing::debug!(
                    "Variant {}: compiled in {}ms",
                    source.variant_id,
                    start.elapsed().as_millis()
                );
            }
            Outcome::Failed {
                exit_code,
                diagnostics,
            } => {
                tracing::warn!(
                    "Variant {}: compilation failed (exit {:?})",
                    source.variant_id,
                    exit_code
                );
                tracing::debug!("Variant {} diagnostics:\n{}", source.variant_id, diagnostics);
                self.failures
                    .append(&FailureRecord::new(&source.variant_id, source.path()))?;
            }
        }

        Ok(outcome)
    }
}
