//! Run command implementation for mutbatch CLI.
//!
//! Compiles every variant, optionally runs the bytecode tool over each
//! compiled unit, and prints a summary. The workspace location is printed
//! exactly once, whether the run completes, fails or is interrupted.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use mutbatch_core::compile::{Toolchain, compose_classpath};
use mutbatch_core::{
    BatchConfig, BatchCoordinator, BatchReport, ClasspathOrder, ClasspathSource, LocationReport,
    ToolStage, Workspace,
};

use crate::colors;
use crate::progress::ProgressCallback;
use crate::tce;

/// Exit status after Ctrl+C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Args)]
pub struct RunArgs {
    /// Directory with one subdirectory per variant
    #[arg(long, value_name = "DIR")]
    mutants: PathBuf,

    /// Compiled classes of the original program, packaged into the classpath
    #[arg(
        long,
        value_name = "DIR",
        conflicts_with_all = ["classpath", "lib_dir", "dry_run"],
        required_unless_present_any = ["classpath", "lib_dir"]
    )]
    baseline: Option<PathBuf>,

    /// Classpath entry (repeatable, in order)
    #[arg(long = "classpath", value_name = "ENTRY")]
    classpath: Vec<PathBuf>,

    /// Directory whose jar files are appended to the classpath
    #[arg(long, value_name = "DIR")]
    lib_dir: Option<PathBuf>,

    /// Dependency placed next to the baseline archive (repeatable)
    #[arg(long = "dependency", value_name = "ENTRY", requires = "baseline")]
    dependencies: Vec<PathBuf>,

    /// Order of dependencies relative to the baseline archive
    #[arg(long, value_enum, default_value_t = OrderArg::DepsFirst)]
    order: OrderArg,

    /// Bytecode tool archive, run once per compiled unit
    #[arg(long, value_name = "JAR", requires = "runtime")]
    tool: Option<PathBuf>,

    /// Runtime library archive for the bytecode tool
    #[arg(long, value_name = "JAR", requires = "tool")]
    runtime: Option<PathBuf>,

    /// Validate and print the resolved configuration and tools without compiling
    #[arg(long, alias = "dryrun")]
    dry_run: bool,

    /// Parent directory for the run's workspace (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    workspace_root: Option<PathBuf>,

    /// Extra compiler argument (repeatable)
    #[arg(long = "javac-arg", value_name = "ARG", allow_hyphen_values = true)]
    javac_args: Vec<String>,

    /// Extra runner argument for the tool stage (repeatable)
    #[arg(
        long = "tool-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "tool"
    )]
    tool_args: Vec<String>,

    /// JDK home; its bin directory must hold javac, jar and java
    #[arg(long, value_name = "DIR")]
    java_home: Option<PathBuf>,

    /// Detect equivalent and redundant variants after the batch
    #[arg(long, requires = "baseline")]
    tce: bool,

    /// Print every stage transition
    #[arg(long)]
    stages: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    DepsFirst,
    BaselineFirst,
}

impl From<OrderArg> for ClasspathOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::DepsFirst => ClasspathOrder::DependenciesFirst,
            OrderArg::BaselineFirst => ClasspathOrder::BaselineFirst,
        }
    }
}

impl RunArgs {
    fn into_config(self) -> BatchConfig {
        let classpath = match self.baseline {
            Some(dir) => ClasspathSource::Baseline {
                dir,
                dependencies: self.dependencies,
            },
            None => ClasspathSource::Explicit {
                entries: self.classpath,
                lib_dir: self.lib_dir,
            },
        };

        let parent = self.workspace_root.unwrap_or_else(std::env::temp_dir);
        let mut config = BatchConfig::new(self.mutants, classpath, parent)
            .with_order(self.order.into())
            .with_compiler_args(self.javac_args);

        if let (Some(tool_jar), Some(runtime_archive)) = (self.tool, self.runtime) {
            config = config.with_tool(ToolStage {
                tool_jar,
                runtime_archive,
                runner_args: self.tool_args,
            });
        }
        config
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let dry_run = args.dry_run;
    let detect = args.tce;
    let verbose_stages = args.stages;
    let java_home = args
        .java_home
        .clone()
        .or_else(|| std::env::var_os("JAVA_HOME").map(PathBuf::from));

    let config = args.into_config();
    config.validate()?;

    let toolchain = Toolchain::discover(java_home.as_deref())?;

    if dry_run {
        return print_dry_run(&config, &toolchain);
    }

    let report = LocationReport::new(|path| {
        println!(
            "{}Workspace:{} {}",
            colors::BOLD,
            colors::RESET,
            path.display()
        );
    });
    let interrupt_report = report.clone();
    let workspace = Workspace::create(&config.workspace_parent, report)?;
    let baseline_dir = config.classpath.baseline_dir().map(Path::to_path_buf);

    // The batch and detection are synchronous; run them off the runtime so
    // Ctrl+C stays live until the very end.
    let batch = tokio::task::spawn_blocking(move || {
        let callback = ProgressCallback::new(verbose_stages);
        let coordinator =
            BatchCoordinator::prepare(&config, &toolchain, &workspace)?.with_callback(&callback);
        let report = coordinator.run()?;
        print_summary(&report, start);

        if let Some(baseline_dir) = baseline_dir.filter(|_| detect) {
            tce::detect_into(workspace.compiled_dir(), &baseline_dir, workspace.root())?;
        }
        Ok::<_, anyhow::Error>(workspace)
    });

    tokio::select! {
        joined = batch => {
            let workspace = joined??;
            workspace.finish();
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!("\n{}Interrupted{}", colors::YELLOW, colors::RESET);
            interrupt_report.report();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }
}

fn print_dry_run(config: &BatchConfig, toolchain: &Toolchain) -> anyhow::Result<()> {
    let classpath = compose_classpath(&config.classpath, config.order, None)?;

    println!("{}Dry run{} - nothing will be created", colors::BOLD, colors::RESET);
    println!("{}", "─".repeat(50));
    println!("{}", serde_json::to_string_pretty(config)?);
    println!("{}Classpath:{} {}", colors::CYAN, colors::RESET, classpath);
    for (name, command) in [
        ("javac", &toolchain.compiler),
        ("jar", &toolchain.archiver),
        ("java", &toolchain.runner),
    ] {
        println!("{}{:<6}{} {}", colors::CYAN, name, colors::RESET, command.program().display());
    }
    Ok(())
}

fn print_summary(report: &BatchReport, start: Instant) {
    println!("\n{}", "─".repeat(50));
    println!(
        "{}Completed{} {} variant(s) in {:.2}s",
        colors::GREEN,
        colors::RESET,
        report.total(),
        start.elapsed().as_secs_f64()
    );
    println!("  compiled:         {}", report.compiled());
    println!("  lookup failures:  {}", report.locate_failures());
    println!("  compile failures: {}", report.compile_failures());
    println!("  tool failures:    {}", report.tool_failures());
}
