//! Append-only failure logs.
//!
//! Each record is one line, `"<variant id> <path>"`. Logs are created on the
//! first record, so a stage that never fails leaves no file behind.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// One failed variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Variant id.
    pub variant_id: String,

    /// Source file for compile and tool failures, variant directory for
    /// lookup failures.
    pub path: PathBuf,
}

impl FailureRecord {
    /// Create a record.
    pub fn new(variant_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            variant_id: variant_id.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.variant_id, self.path.display())
    }
}

/// An append-only log file.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    /// Log writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, record: &FailureRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_created_lazily() {
        let temp = TempDir::new().unwrap();
        let log = FailureLog::new(temp.path().join("compile-failures.txt"));
        assert!(!log.path().exists());

        let record = FailureRecord::new("3", "mutants/3/Foo.java");
        log.append(&record).unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_append_keeps_earlier_lines() {
        let temp = TempDir::new().unwrap();
        let log = FailureLog::new(temp.path().join("tool-failures.txt"));

        log.append(&FailureRecord::new("1", "a/A.java")).unwrap();
        log.append(&FailureRecord::new("4", "b/B.java")).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents, "1 a/A.java\n4 b/B.java\n");
    }
}
