//! Batch configuration.
//!
//! A [`BatchConfig`] is built once from command-line arguments and passed by
//! reference into every component. Nothing downstream reads the environment.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Where the compile classpath comes from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ClasspathSource {
    /// Compile against a freshly packaged baseline (mode A).
    Baseline {
        /// Directory of already-compiled baseline classes.
        dir: PathBuf,
        /// Extra dependency archives or directories.
        dependencies: Vec<PathBuf>,
    },

    /// Compile against an explicitly supplied classpath (mode B).
    Explicit {
        /// Ordered archive or directory entries.
        entries: Vec<PathBuf>,
        /// Directory whose `*.jar` files are all appended.
        lib_dir: Option<PathBuf>,
    },
}

impl ClasspathSource {
    /// Baseline directory, if compiling against a packaged baseline.
    pub fn baseline_dir(&self) -> Option<&Path> {
        match self {
            Self::Baseline { dir, .. } => Some(dir),
            Self::Explicit { .. } => None,
        }
    }
}

/// Relative order of dependency entries and the packaged baseline archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClasspathOrder {
    /// Dependencies precede the baseline archive.
    #[default]
    #[serde(rename = "deps-first")]
    DependenciesFirst,
    /// The baseline archive precedes dependencies.
    BaselineFirst,
}

impl fmt::Display for ClasspathOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependenciesFirst => write!(f, "deps-first"),
            Self::BaselineFirst => write!(f, "baseline-first"),
        }
    }
}

/// Optional bytecode tool stage.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStage {
    /// The tool's executable archive, run with `java -jar`.
    pub tool_jar: PathBuf,
    /// Runtime library archive appended to the tool's classpath.
    pub runtime_archive: PathBuf,
    /// Extra arguments passed to the runner before `-jar`.
    pub runner_args: Vec<String>,
}

/// Immutable configuration for one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchConfig {
    /// Directory whose immediate subdirectories are variant ids.
    pub variants_root: PathBuf,

    /// Classpath inputs.
    pub classpath: ClasspathSource,

    /// Order of dependencies relative to the baseline archive.
    pub order: ClasspathOrder,

    /// Bytecode tool stage, skipped entirely when `None`.
    pub tool: Option<ToolStage>,

    /// Extra compiler flags, placed before `-cp`.
    pub compiler_args: Vec<String>,

    /// Parent directory for the run's workspace.
    pub workspace_parent: PathBuf,
}

impl BatchConfig {
    /// Create a config with defaults for everything but the required inputs.
    pub fn new(
        variants_root: impl Into<PathBuf>,
        classpath: ClasspathSource,
        workspace_parent: impl Into<PathBuf>,
    ) -> Self {
        Self {
            variants_root: variants_root.into(),
            classpath,
            order: ClasspathOrder::default(),
            tool: None,
            compiler_args: Vec::new(),
            workspace_parent: workspace_parent.into(),
        }
    }

    /// Set the classpath order.
    pub fn with_order(mut self, order: ClasspathOrder) -> Self {
        self.order = order;
        self
    }

    /// Enable the bytecode tool stage.
    pub fn with_tool(mut self, tool: ToolStage) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Set extra compiler flags.
    pub fn with_compiler_args(mut self, args: Vec<String>) -> Self {
        self.compiler_args = args;
        self
    }

    /// Check that every input the run reads actually exists.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first missing or mistyped input.
    pub fn validate(&self) -> Result<()> {
        require_dir(&self.variants_root, "variants root")?;

        match &self.classpath {
            ClasspathSource::Baseline { dir, dependencies } => {
                require_dir(dir, "baseline directory")?;
                for dep in dependencies {
                    require_exists(dep, "dependency")?;
                }
            }
            ClasspathSource::Explicit { entries, lib_dir } => {
                for entry in entries {
                    require_exists(entry, "classpath entry")?;
                }
                if let Some(lib_dir) = lib_dir {
                    require_dir(lib_dir, "library directory")?;
                }
            }
        }

        if let Some(tool) = &self.tool {
            require_file(&tool.tool_jar, "tool archive")?;
            require_file(&tool.runtime_archive, "runtime archive")?;
        }

        require_dir(&self.workspace_parent, "workspace root")?;
        Ok(())
    }
}

fn require_exists(path: &Path, what: &str) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::Config(format!("{} not found: {}", what, path.display())))
    }
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    require_exists(path, what)?;
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} is not a directory: {}",
            what,
            path.display()
        )))
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    require_exists(path, what)?;
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::Config(format!("{} is not a file: {}", what, path.display())))
    }
}
