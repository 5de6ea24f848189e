//! External process invocation.
//!
//! Compiler, archiver and bytecode tool are opaque processes judged by their
//! exit status alone.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Result of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The process exited with status zero.
    Success,

    /// The process exited non-zero or was killed by a signal.
    Failed {
        /// Exit code, `None` if terminated by a signal.
        exit_code: Option<i32>,
        /// Captured stderr, followed by stdout if stderr was empty.
        diagnostics: String,
    },
}

impl Outcome {
    /// Returns true if the process succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Exit code of a failed invocation.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Success => Some(0),
            Self::Failed { exit_code, .. } => *exit_code,
        }
    }
}

/// A program plus the leading arguments every invocation shares.
///
/// `java -jar tool.jar` is `program = java`, `base_args = ["-jar", "tool.jar"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: PathBuf,
    base_args: Vec<OsString>,
}

impl ExternalCommand {
    /// Command running `program` with no leading arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// Append leading arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.base_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run to completion with extra arguments, capturing output.
    ///
    /// # Errors
    /// Returns [`Error::Toolchain`] only if the process cannot be spawned.
    /// A non-zero exit is an [`Outcome::Failed`], not an error.
    pub fn run<I, S>(&self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args).args(&args);

        tracing::debug!("Running {} {:?} {:?}", self.program.display(), self.base_args, args);

        let output = cmd.output().map_err(|e| {
            Error::Toolchain(format!("failed to run {}: {}", self.program.display(), e))
        })?;

        if output.status.success() {
            return Ok(Outcome::Success);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };

        Ok(Outcome::Failed {
            exit_code: output.status.code(),
            diagnostics,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ExternalCommand {
        ExternalCommand::new("/bin/sh").with_args(["-c", script, "sh"])
    }

    #[test]
    fn test_success() {
        let outcome = sh("exit 0").run(Vec::<OsString>::new()).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.exit_code(), Some(0));
    }

    #[test]
    fn test_failure_captures_stderr() {
        let outcome = sh("echo broken >&2; exit 3")
            .run(Vec::<OsString>::new())
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed {
                exit_code: Some(3),
                diagnostics: "broken".to_string(),
            }
        );
    }

    #[test]
    fn test_failure_falls_back_to_stdout() {
        let outcome = sh("echo on stdout; exit 1").run(Vec::<OsString>::new()).unwrap();
        match outcome {
            Outcome::Failed { diagnostics, .. } => assert_eq!(diagnostics, "on stdout"),
            Outcome::Success => panic!("expected failure"),
        }
    }

    #[test]
    fn test_extra_args_follow_base_args() {
        let outcome = sh(r#"[ "$1" = "a" ] && [ "$2" = "b" ]"#)
            .run(["a", "b"])
            .unwrap();
        assert!(outcome.is_success());
    }

    #[test]
    fn test_missing_program_is_toolchain_error() {
        let result = ExternalCommand::new("/nonexistent/javac").run(["-version"]);
        assert!(matches!(result, Err(Error::Toolchain(_))));
    }
}
