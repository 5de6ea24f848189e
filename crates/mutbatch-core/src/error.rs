//! Error types for mutbatch-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for mutbatch-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mutbatch-core.
///
/// Everything here except [`Error::Locate`] is fatal to a run. Locate errors
/// are caught by the batch coordinator and recorded per variant.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid batch configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Toolchain discovery or invocation error.
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// The workspace directory could not be allocated.
    #[error("failed to create workspace under {}: {message}", parent.display())]
    Workspace { parent: PathBuf, message: String },

    /// Packaging the baseline into an archive failed.
    #[error("failed to package baseline {}: {message}", dir.display())]
    Baseline { dir: PathBuf, message: String },

    /// The classpath could not be composed.
    #[error("classpath error: {0}")]
    Classpath(String),

    /// A variant directory did not contain exactly one source file.
    #[error("variant {variant}: expected exactly one source file, found {}", describe_found(.found))]
    Locate { variant: String, found: Vec<PathBuf> },

    /// Equivalence file could not be parsed or produced.
    #[error("equivalence error: {0}")]
    Equivalence(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_found(found: &[PathBuf]) -> String {
    if found.is_empty() {
        return "none".to_string();
    }
    let names: Vec<String> = found.iter().map(|p| p.display().to_string()).collect();
    format!("{} ({})", found.len(), names.join(", "))
}

impl Error {
    /// Render the error with a recovery hint, if one applies.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Error::Toolchain(_) => {
                Some("set JAVA_HOME (or --java-home) to a JDK, or put javac, jar and java on PATH")
            }
            Error::Workspace { .. } => Some("pass --workspace-root pointing at a writable directory"),
            Error::Baseline { .. } => {
                Some("check that --baseline points at a readable directory of compiled classes")
            }
            Error::Classpath(_) => {
                Some("classpath entries must not contain the platform path separator")
            }
            _ => None,
        };

        match hint {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_error_names_variant() {
        let err = Error::Locate {
            variant: "17".to_string(),
            found: vec![],
        };
        assert_eq!(
            err.to_string(),
            "variant 17: expected exactly one source file, found none"
        );

        let err = Error::Locate {
            variant: "3".to_string(),
            found: vec![PathBuf::from("A.java"), PathBuf::from("B.java")],
        };
        let message = err.to_string();
        assert!(message.contains("variant 3"));
        assert!(message.contains("found 2 (A.java, B.java)"));
    }

    #[test]
    fn test_with_hint() {
        let err = Error::Toolchain("javac not found".to_string());
        assert!(err.with_hint().contains("hint: set JAVA_HOME"));

        let err = Error::Config("bad".to_string());
        assert_eq!(err.with_hint(), "invalid configuration: bad");
    }
}
