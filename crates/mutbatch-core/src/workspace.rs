//! Per-run workspace management.
//!
//! Every batch run writes into its own freshly allocated directory:
//!
//! ```text
//! mutbatch-XXXXXX/
//! ├── classpath.jar          # Packaged baseline (baseline mode only)
//! ├── compiled/<id>/         # Per-variant compiler output
//! ├── tool-output/<id>/      # Per-variant bytecode tool output
//! ├── compile-failures.txt   # "<id> <source>" per failed compile,
//! │                          # "<id> <variant dir>" per failed lookup
//! ├── tool-failures.txt      # "<id> <source>" per failed tool stage
//! └── report.json            # Batch report
//! ```
//!
//! The workspace is never deleted. Its location is reported exactly once,
//! whichever way the run ends, so partial artifacts can be inspected.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};

const PREFIX: &str = "mutbatch-";

type ReportSink = Box<dyn Fn(&Path) + Send + Sync>;

struct ReportInner {
    path: OnceLock<PathBuf>,
    reported: AtomicBool,
    sink: ReportSink,
}

/// Handle that reports the workspace location at most once.
///
/// Clones share state, so the CLI can keep one clone for its interrupt
/// handler while the workspace itself reports on completion or drop.
#[derive(Clone)]
pub struct LocationReport {
    inner: Arc<ReportInner>,
}

impl LocationReport {
    /// Create a report handle that passes the location to `sink`.
    pub fn new(sink: impl Fn(&Path) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(ReportInner {
                path: OnceLock::new(),
                reported: AtomicBool::new(false),
                sink: Box::new(sink),
            }),
        }
    }

    /// A report handle that discards the location.
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// The workspace path, once a workspace has been attached.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.get().map(PathBuf::as_path)
    }

    /// Whether the location has already been reported.
    pub fn is_reported(&self) -> bool {
        self.inner.reported.load(Ordering::SeqCst)
    }

    /// Report the location.
    ///
    /// Returns `true` if this call emitted the report. Does nothing before a
    /// workspace is attached or after the first report.
    pub fn report(&self) -> bool {
        let Some(path) = self.inner.path.get() else {
            return false;
        };
        if self.inner.reported.swap(true, Ordering::SeqCst) {
            return false;
        }
        (self.inner.sink)(path);
        true
    }

    fn attach(&self, path: PathBuf) -> Result<()> {
        self.inner.path.set(path).map_err(|path| Error::Workspace {
            parent: path,
            message: "location report is already attached to a workspace".to_string(),
        })
    }
}

/// Directory layout for one batch run.
pub struct Workspace {
    root: PathBuf,
    compiled_dir: PathBuf,
    tool_dir: PathBuf,
    report: LocationReport,
}

impl Workspace {
    /// Allocate a unique workspace under `parent`.
    ///
    /// # Errors
    /// Returns [`Error::Workspace`] if no unique writable directory can be
    /// created.
    pub fn create(parent: &Path, report: LocationReport) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(parent)
            .map_err(|e| Error::Workspace {
                parent: parent.to_path_buf(),
                message: e.to_string(),
            })?
            .keep();

        let compiled_dir = root.join("compiled");
        fs::create_dir(&compiled_dir).map_err(|e| Error::Workspace {
            parent: parent.to_path_buf(),
            message: format!("cannot create {}: {}", compiled_dir.display(), e),
        })?;

        report.attach(root.clone())?;
        tracing::info!("Workspace created at {}", root.display());

        Ok(Self {
            tool_dir: root.join("tool-output"),
            compiled_dir,
            root,
            report,
        })
    }

    /// Root directory of the workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the packaged baseline archive.
    pub fn classpath_archive(&self) -> PathBuf {
        self.root.join("classpath.jar")
    }

    /// Directory holding every variant's compiled output.
    pub fn compiled_dir(&self) -> &Path {
        &self.compiled_dir
    }

    /// Directory holding every variant's tool output.
    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    /// Compiled output directory for a variant.
    pub fn variant_output_dir(&self, variant_id: &str) -> PathBuf {
        self.compiled_dir.join(variant_id)
    }

    /// Tool output directory for a variant.
    pub fn variant_tool_dir(&self, variant_id: &str) -> PathBuf {
        self.tool_dir.join(variant_id)
    }

    /// Create a variant's compiled output directory.
    ///
    /// Fails if the directory already exists, so output is never reused.
    pub fn create_variant_output(&self, variant_id: &str) -> Result<PathBuf> {
        let dir = self.variant_output_dir(variant_id);
        fs::create_dir(&dir)?;
        Ok(dir)
    }

    /// Create a variant's tool output directory.
    pub fn create_variant_tool_dir(&self, variant_id: &str) -> Result<PathBuf> {
        let dir = self.variant_tool_dir(variant_id);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Log of variants that produced no compiled output: failed lookups and
    /// failed compilations.
    pub fn compile_failure_log(&self) -> PathBuf {
        self.root.join("compile-failures.txt")
    }

    /// Log of failed tool stages.
    pub fn tool_failure_log(&self) -> PathBuf {
        self.root.join("tool-failures.txt")
    }

    /// Path of the JSON batch report.
    pub fn report_path(&self) -> PathBuf {
        self.root.join("report.json")
    }

    /// Another handle to this workspace's location report.
    pub fn reporter(&self) -> LocationReport {
        self.report.clone()
    }

    /// Finish the run and report the workspace location.
    ///
    /// The directory stays on disk.
    pub fn finish(self) -> PathBuf {
        self.report.report();
        self.root.clone()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.report.report();
    }
}
