//! mutbatch CLI - Batch compiler for mutant variants.

mod colors;
mod compare;
mod progress;
mod run;
mod tce;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mutbatch")]
#[command(about = "Batch-compile mutant variants and run a bytecode tool over the results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every variant under a mutants directory
    Run(run::RunArgs),

    /// Detect equivalent and redundant variants among compiled outputs
    Tce {
        /// Directory with one compiled output directory per variant
        compiled_mutants: PathBuf,

        /// Compiled classes of the original program
        compiled_program: PathBuf,

        /// Where to write the result files (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two equivalence listings
    Compare {
        /// First listing
        left: PathBuf,

        /// Second listing
        right: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Helper to format mutbatch-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<mutbatch_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Run(args) => run::execute(args).await.map_err(format_error)?,

        Commands::Tce {
            compiled_mutants,
            compiled_program,
            output,
        } => {
            let output = match output {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            tce::execute(&compiled_mutants, &compiled_program, &output).map_err(format_error)?;
        }

        Commands::Compare { left, right } => {
            compare::execute(&left, &right).map_err(format_error)?;
        }
    }

    Ok(())
}
