//! Bytecode tool runner.
//!
//! Invokes the configured tool once per compiled unit of a variant:
//!
//! ```text
//! java [runner args] -jar <tool> -cp <output:classpath:runtime> -d <tool-output/id> <name>
//! ```
//!
//! The first failing unit ends the variant's tool stage.

use std::ffi::OsString;
use std::path::Path;

use crate::compile::{Classpath, LocatedSource, Outcome, Toolchain};
use crate::config::ToolStage;
use crate::error::Result;
use crate::failure::{FailureLog, FailureRecord};
use crate::workspace::Workspace;

use super::units::{CompiledUnit, collect_units};

/// Result of a variant's tool stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRun {
    /// Every unit was processed.
    Completed {
        /// Number of units processed.
        units: usize,
    },

    /// A unit failed; later units were skipped.
    Failed {
        /// Qualified name of the failing unit.
        unit: String,
        /// Units processed successfully before the failure.
        processed: usize,
        /// Units in the variant's output.
        units: usize,
        /// The failing invocation.
        outcome: Outcome,
    },
}

impl ToolRun {
    /// Returns true if every unit was processed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Runs the bytecode tool over compiled variants.
pub struct BytecodeToolRunner<'a> {
    /// Toolchain providing the runner command
    toolchain: &'a Toolchain,

    /// Tool archive, runtime archive and runner flags
    stage: &'a ToolStage,

    /// Shared compile classpath
    classpath: &'a Classpath,

    /// Workspace holding tool output directories
    workspace: &'a Workspace,

    /// Where failed tool stages are recorded
    failures: FailureLog,
}

impl<'a> BytecodeToolRunner<'a> {
    /// Create a runner.
    pub fn new(
        toolchain: &'a Toolchain,
        stage: &'a ToolStage,
        classpath: &'a Classpath,
        workspace: &'a Workspace,
    ) -> Self {
        Self {
            toolchain,
            stage,
            classpath,
            workspace,
            failures: FailureLog::new(workspace.tool_failure_log()),
        }
    }

    /// Arguments for one unit.
    pub fn arguments(
        &self,
        unit: &CompiledUnit,
        output_dir: &Path,
        tool_output_dir: &Path,
    ) -> Result<Vec<OsString>> {
        let classpath = self
            .classpath
            .surrounded_by(output_dir, &self.stage.runtime_archive);

        let mut args: Vec<OsString> = self.stage.runner_args.iter().map(OsString::from).collect();
        args.push("-jar".into());
        args.push(self.stage.tool_jar.as_os_str().to_owned());
        args.push("-cp".into());
        args.push(classpath.to_arg()?);
        args.push("-d".into());
        args.push(tool_output_dir.into());
        args.push(unit.qualified_name.as_str().into());
        Ok(args)
    }

    /// Run the tool over every unit in `output_dir`.
    pub fn run(&self, source: &LocatedSource, output_dir: &Path) -> Result<ToolRun> {
        let variant_id = source.variant_id.as_str();
        let units = collect_units(output_dir)?;
        let tool_output_dir = self.workspace.create_variant_tool_dir(variant_id)?;

        tracing::info!("Variant {}: running tool on {} unit(s)", variant_id, units.len());

        for (processed, unit) in units.iter().enumerate() {
            let args = self.arguments(unit, output_dir, &tool_output_dir)?;
            let outcome = self.toolchain.runner.run(args)?;

            if let Outcome::Failed { exit_code, .. } = &outcome {
                tracing::warn!(
                    "Variant {}: tool failed on {} (exit {:?}), skipping {} remaining unit(s)",
                    variant_id,
                    unit.qualified_name,
                    exit_code,
                    units.len() - processed - 1
                );
                self.failures
                    .append(&FailureRecord::new(variant_id, source.path()))?;

                return Ok(ToolRun::Failed {
                    unit: unit.qualified_name.clone(),
                    processed,
                    units: units.len(),
                    outcome,
                });
            }
        }

        Ok(ToolRun::Completed { units: units.len() })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::compile::ExternalCommand;
    use crate::workspace::LocationReport;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Runner that writes `<out>/<name>.done` and fails for names containing "Fail".
    const FAKE_RUNNER: &str = r#"
out=""
for arg in "$@"; do
  if [ "$prev" = "-d" ]; then out="$arg"; fi
  prev="$arg"
  name="$arg"
done
case "$name" in *Fail*) echo "cannot transform $name" >&2; exit 1;; esac
: > "$out/$name.done"
"#;

    struct Fixture {
        temp: TempDir,
        toolchain: Toolchain,
        stage: ToolStage,
        workspace: Workspace,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let sh = |s: &str| ExternalCommand::new("/bin/sh").with_args(["-c", s, "sh"]);
            let toolchain = Toolchain::from_commands(sh("exit 1"), sh("exit 1"), sh(FAKE_RUNNER));
            let stage = ToolStage {
                tool_jar: temp.path().join("tool.jar"),
                runtime_archive: temp.path().join("rt.jar"),
                runner_args: vec!["-Xmx1g".to_string()],
            };
            let workspace = Workspace::create(temp.path(), LocationReport::silent()).unwrap();
            Self {
                temp,
                toolchain,
                stage,
                workspace,
            }
        }

        fn compiled(&self, id: &str, units: &[&str]) -> (LocatedSource, PathBuf) {
            let out = self.workspace.create_variant_output(id).unwrap();
            for unit in units {
                let path = out.join(unit);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, "").unwrap();
            }
            let source = LocatedSource {
                variant_id: id.to_string(),
                variant_dir: self.temp.path().join("mutants").join(id),
                relative_path: PathBuf::from("Foo.java"),
            };
            (source, out)
        }
    }

    #[test]
    fn test_arguments() {
        let fx = Fixture::new();
        let classpath = Classpath::new(vec![PathBuf::from("dep.jar")]);
        let runner = BytecodeToolRunner::new(&fx.toolchain, &fx.stage, &classpath, &fx.workspace);
        let unit = CompiledUnit {
            relative_path: PathBuf::from("p/A.class"),
            qualified_name: "p.A".to_string(),
        };

        let args = runner
            .arguments(&unit, Path::new("out/4"), Path::new("tool/4"))
            .unwrap();
        let expected_cp = format!("out/4:dep.jar:{}", fx.stage.runtime_archive.display());
        assert_eq!(
            args,
            vec![
                OsString::from("-Xmx1g"),
                OsString::from("-jar"),
                fx.stage.tool_jar.clone().into_os_string(),
                OsString::from("-cp"),
                OsString::from(expected_cp),
                OsString::from("-d"),
                OsString::from("tool/4"),
                OsString::from("p.A"),
            ]
        );
    }

    #[test]
    fn test_all_units_processed() {
        let fx = Fixture::new();
        let classpath = Classpath::default();
        let runner = BytecodeToolRunner::new(&fx.toolchain, &fx.stage, &classpath, &fx.workspace);
        let (source, out) = fx.compiled("1", &["p/A.class", "p/B.class"]);

        let run = runner.run(&source, &out).unwrap();
        assert_eq!(run, ToolRun::Completed { units: 2 });

        let tool_dir = fx.workspace.variant_tool_dir("1");
        assert!(tool_dir.join("p.A.done").exists());
        assert!(tool_dir.join("p.B.done").exists());
        assert!(!fx.workspace.tool_failure_log().exists());
    }

    #[test]
    fn test_stops_at_first_failure() {
        let fx = Fixture::new();
        let classpath = Classpath::default();
        let runner = BytecodeToolRunner::new(&fx.toolchain, &fx.stage, &classpath, &fx.workspace);
        let (source, out) = fx.compiled("4", &["p/A.class", "p/BFail.class", "p/C.class"]);

        let run = runner.run(&source, &out).unwrap();
        match run {
            ToolRun::Failed {
                unit,
                processed,
                units,
                ..
            } => {
                assert_eq!(unit, "p.BFail");
                assert_eq!(processed, 1);
                assert_eq!(units, 3);
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let tool_dir = fx.workspace.variant_tool_dir("4");
        assert!(tool_dir.join("p.A.done").exists());
        assert!(!tool_dir.join("p.C.done").exists());

        let log = fs::read_to_string(fx.workspace.tool_failure_log()).unwrap();
        assert_eq!(log, format!("4 {}\n", source.path().display()));
    }

    #[test]
    fn test_no_units_creates_empty_tool_dir() {
        let fx = Fixture::new();
        let classpath = Classpath::default();
        let runner = BytecodeToolRunner::new(&fx.toolchain, &fx.stage, &classpath, &fx.workspace);
        let (source, out) = fx.compiled("9", &[]);

        assert_eq!(runner.run(&source, &out).unwrap(), ToolRun::Completed { units: 0 });
        assert!(fx.workspace.variant_tool_dir("9").is_dir());
    }
}
