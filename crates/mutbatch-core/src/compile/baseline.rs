//! Baseline packaging.
//!
//! Bundles the baseline's compiled classes into one archive so every variant
//! compile can put it on the classpath as a single entry.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::process::Outcome;
use super::toolchain::Toolchain;

/// Package `baseline_dir` into the archive at `archive_path`.
///
/// Runs `jar cf <archive> -C <baseline_dir> .` so entries keep their paths
/// relative to the baseline root.
///
/// # Errors
/// Returns [`Error::Baseline`] if the directory cannot be read or the
/// archiver fails.
pub fn package_baseline(
    toolchain: &Toolchain,
    baseline_dir: &Path,
    archive_path: &Path,
) -> Result<PathBuf> {
    fs::read_dir(baseline_dir).map_err(|e| Error::Baseline {
        dir: baseline_dir.to_path_buf(),
        message: format!("cannot read directory: {}", e),
    })?;

    tracing::info!(
        "Packaging baseline {} into {}",
        baseline_dir.display(),
        archive_path.display()
    );

    let outcome = toolchain.archiver.run([
        OsStr::new("cf"),
        archive_path.as_os_str(),
        OsStr::new("-C"),
        baseline_dir.as_os_str(),
        OsStr::new("."),
    ])?;

    match outcome {
        Outcome::Success if archive_path.is_file() => Ok(archive_path.to_path_buf()),
        Outcome::Success => Err(Error::Baseline {
            dir: baseline_dir.to_path_buf(),
            message: format!("archiver did not produce {}", archive_path.display()),
        }),
        Outcome::Failed {
            exit_code,
            diagnostics,
        } => Err(Error::Baseline {
            dir: baseline_dir.to_path_buf(),
            message: format!(
                "archiver exited with {}: {}",
                exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                diagnostics
            ),
        }),
    }
}
