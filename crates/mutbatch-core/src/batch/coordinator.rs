//! Batch coordinator.

use crate::analyze::{BytecodeToolRunner, ToolRun, collect_units};
use crate::compile::{
    Classpath, LocatedSource, Outcome, Toolchain, VariantCompiler, VariantLocator,
    compose_classpath, package_baseline,
};
use crate::config::BatchConfig;
use crate::error::{Error, Result};
use crate::failure::{FailureLog, FailureRecord};
use crate::workspace::Workspace;

use super::callback::{BatchCallback, VariantStage};
use super::report::{BatchReport, VariantOutcome, VariantStatus};

/// Runs every variant through the pipeline, one at a time.
pub struct BatchCoordinator<'a> {
    /// Batch configuration
    config: &'a BatchConfig,

    /// External programs
    toolchain: &'a Toolchain,

    /// Output directories and logs
    workspace: &'a Workspace,

    /// Compile classpath, composed once
    classpath: Classpath,

    /// Variant source lookup
    locator: VariantLocator,

    /// Progress callback
    callback: Option<&'a dyn BatchCallback>,
}

impl<'a> BatchCoordinator<'a> {
    /// Package the baseline (if any) and compose the classpath.
    ///
    /// # Errors
    /// Any error here affects every variant and is fatal to the run.
    pub fn prepare(
        config: &'a BatchConfig,
        toolchain: &'a Toolchain,
        workspace: &'a Workspace,
    ) -> Result<Self> {
        let baseline_archive = match config.classpath.baseline_dir() {
            Some(dir) => Some(package_baseline(
                toolchain,
                dir,
                &workspace.classpath_archive(),
            )?),
            None => None,
        };

        let classpath =
            compose_classpath(&config.classpath, config.order, baseline_archive.as_deref())?;
        tracing::info!("Classpath ({}): {}", config.order, classpath);

        Ok(Self {
            config,
            toolchain,
            workspace,
            classpath,
            locator: VariantLocator::new(&config.variants_root),
            callback: None,
        })
    }

    /// Set a progress callback.
    pub fn with_callback(mut self, callback: &'a dyn BatchCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// The composed compile classpath.
    pub fn classpath(&self) -> &Classpath {
        &self.classpath
    }

    /// Process every variant.
    ///
    /// Per-variant failures are recorded in the workspace logs and in the
    /// returned report; they never end the batch.
    ///
    /// # Errors
    /// Returns an error only if the variants root cannot be listed, the
    /// toolchain cannot be run, or the workspace cannot be written.
    pub fn run(&self) -> Result<BatchReport> {
        let ids = self.locator.variant_ids()?;
        tracing::info!("Found {} variant(s)", ids.len());
        if let Some(cb) = self.callback {
            cb.on_batch_started(ids.len());
        }

        let compiler = VariantCompiler::new(
            self.toolchain,
            &self.classpath,
            &self.config.compiler_args,
            FailureLog::new(self.workspace.compile_failure_log()),
        );
        let tool_runner = self.config.tool.as_ref().map(|stage| {
            BytecodeToolRunner::new(self.toolchain, stage, &self.classpath, self.workspace)
        });
        // Lookup failures share the compile log: every variant without
        // compiled output has exactly one entry there.
        let lookup_failures = FailureLog::new(self.workspace.compile_failure_log());

        let mut report = BatchReport {
            variants: Vec::with_capacity(ids.len()),
            classpath: self.classpath.to_string(),
        };

        for id in &ids {
            let outcome =
                self.process_variant(id, &compiler, tool_runner.as_ref(), &lookup_failures)?;
            if let Some(cb) = self.callback {
                cb.on_variant_done(&outcome);
            }
            report.variants.push(outcome);
        }

        report.write_json(&self.workspace.report_path())?;
        Ok(report)
    }

    fn process_variant(
        &self,
        id: &str,
        compiler: &VariantCompiler<'_>,
        tool_runner: Option<&BytecodeToolRunner<'_>>,
        lookup_failures: &FailureLog,
    ) -> Result<VariantOutcome> {
        self.enter(id, VariantStage::Pending);
        let output_dir = self.workspace.create_variant_output(id)?;

        let source = match self.locator.locate(id) {
            Ok(source) => source,
            Err(err @ (Error::Locate { .. } | Error::Io(_))) => {
                tracing::warn!("Skipping variant {}: {}", id, err);
                lookup_failures.append(&FailureRecord::new(id, self.locator.variant_dir(id)))?;
                return Ok(self.finish(
                    id,
                    None,
                    VariantStage::Pending,
                    VariantStatus::LocateFailed {
                        reason: err.to_string(),
                    },
                ));
            }
            Err(err) => return Err(err),
        };
        self.enter(id, VariantStage::Located);

        if let Outcome::Failed { exit_code, .. } = compiler.compile(&source, &output_dir)? {
            return Ok(self.finish(
                id,
                Some(&source),
                VariantStage::Located,
                VariantStatus::CompileFailed { exit_code },
            ));
        }
        self.enter(id, VariantStage::Compiled);

        let Some(tool_runner) = tool_runner else {
            let units = collect_units(&output_dir)?.len();
            return Ok(self.finish(
                id,
                Some(&source),
                VariantStage::Done,
                VariantStatus::Succeeded {
                    units,
                    tool_ran: false,
                },
            ));
        };

        self.enter(id, VariantStage::ToolRun);
        let outcome = match tool_runner.run(&source, &output_dir)? {
            ToolRun::Completed { units } => self.finish(
                id,
                Some(&source),
                VariantStage::Done,
                VariantStatus::Succeeded {
                    units,
                    tool_ran: true,
                },
            ),
            ToolRun::Failed {
                unit,
                units,
                outcome,
                ..
            } => self.finish(
                id,
                Some(&source),
                VariantStage::ToolRun,
                VariantStatus::ToolFailed {
                    units,
                    unit,
                    exit_code: outcome.exit_code(),
                },
            ),
        };

        Ok(outcome)
    }

    fn enter(&self, id: &str, stage: VariantStage) {
        tracing::debug!("Variant {}: {}", id, stage);
        if let Some(cb) = self.callback {
            cb.on_stage(id, stage);
        }
    }

    fn finish(
        &self,
        id: &str,
        source: Option<&LocatedSource>,
        reached: VariantStage,
        status: VariantStatus,
    ) -> VariantOutcome {
        if let Some(cb) = self.callback {
            cb.on_stage(id, VariantStage::Done);
        }
        VariantOutcome {
            variant_id: id.to_string(),
            source: source.map(LocatedSource::path),
            reached,
            status,
        }
    }
}
