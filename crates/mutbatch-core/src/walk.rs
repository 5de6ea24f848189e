//! Recursive directory listing shared by unit discovery and equivalence
//! detection.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Regular files under `root` accepted by `keep`, relative to `root`,
/// sorted by path.
pub(crate) fn relative_files(root: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() || !keep(entry.path()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }
    // Directory order and component order can differ ("a.b" vs "a/b").
    files.sort();
    Ok(files)
}
