//! Classpath composition.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ClasspathOrder, ClasspathSource};
use crate::error::{Error, Result};

/// Extension of archives picked up from a library directory.
const ARCHIVE_EXTENSION: &str = "jar";

/// Ordered list of archive and directory entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    /// Classpath with the given entries, in order.
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    /// Entries in order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New classpath with `first` in front and `last` at the end.
    ///
    /// The tool stage uses this to wrap a variant's output directory and the
    /// runtime archive around the shared compile classpath.
    pub fn surrounded_by(&self, first: &Path, last: &Path) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 2);
        entries.push(first.to_path_buf());
        entries.extend(self.entries.iter().cloned());
        entries.push(last.to_path_buf());
        Self { entries }
    }

    /// Render as a single `-cp` argument using the platform separator.
    ///
    /// # Errors
    /// Returns [`Error::Classpath`] if an entry contains the separator.
    pub fn to_arg(&self) -> Result<OsString> {
        std::env::join_paths(&self.entries).map_err(|e| Error::Classpath(e.to_string()))
    }
}

impl fmt::Display for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_arg() {
            Ok(arg) => write!(f, "{}", arg.to_string_lossy()),
            Err(_) => write!(f, "{:?}", self.entries),
        }
    }
}

/// Compose the compile classpath.
///
/// `baseline_archive` is the packaged baseline in baseline mode and ignored
/// otherwise. Archives found in a library directory are sorted by file name
/// so the result is identical across runs.
///
/// # Errors
/// Returns an error if the library directory cannot be read or the result
/// cannot be rendered.
pub fn compose_classpath(
    source: &ClasspathSource,
    order: ClasspathOrder,
    baseline_archive: Option<&Path>,
) -> Result<Classpath> {
    let entries = match source {
        ClasspathSource::Baseline { dependencies, .. } => {
            let baseline = baseline_archive.ok_or_else(|| {
                Error::Classpath("baseline mode requires a packaged baseline archive".to_string())
            })?;

            let mut entries = Vec::with_capacity(dependencies.len() + 1);
            match order {
                ClasspathOrder::DependenciesFirst => {
                    entries.extend(dependencies.iter().cloned());
                    entries.push(baseline.to_path_buf());
                }
                ClasspathOrder::BaselineFirst => {
                    entries.push(baseline.to_path_buf());
                    entries.extend(dependencies.iter().cloned());
                }
            }
            entries
        }
        ClasspathSource::Explicit { entries, lib_dir } => {
            let mut all = entries.clone();
            if let Some(lib_dir) = lib_dir {
                all.extend(list_archives(lib_dir)?);
            }
            all
        }
    };

    let classpath = Classpath::new(entries);
    // Fail here, once, rather than in every variant's compile.
    classpath.to_arg()?;
    Ok(classpath)
}

/// All archives directly inside `dir`, sorted by file name.
fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_archive = path.extension().is_some_and(|ext| ext == ARCHIVE_EXTENSION);
        if is_archive && path.is_file() {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}
