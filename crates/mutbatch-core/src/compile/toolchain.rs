//! Toolchain discovery.
//!
//! Locates the compiler, archiver and runner once at startup. The caller
//! passes in `JAVA_HOME` explicitly; nothing here reads the environment
//! except `PATH` lookups through `which`.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::process::ExternalCommand;

/// The external programs a batch run invokes.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Source compiler (`javac`).
    pub compiler: ExternalCommand,

    /// Archive builder (`jar`).
    pub archiver: ExternalCommand,

    /// Bytecode runner (`java`), used for the tool stage.
    pub runner: ExternalCommand,
}

impl Toolchain {
    /// Discover the toolchain.
    ///
    /// When `java_home` is set, every tool must exist under `java_home/bin`;
    /// a set but broken `JAVA_HOME` is an error rather than a silent
    /// fallback to `PATH`. Otherwise each tool is looked up on `PATH`.
    ///
    /// # Errors
    /// Returns [`Error::Toolchain`] naming the first tool that is missing.
    pub fn discover(java_home: Option<&Path>) -> Result<Self> {
        let find = |name: &str| match java_home {
            Some(home) => Self::find_in_home(home, name),
            None => Self::find_on_path(name),
        };

        let toolchain = Self {
            compiler: ExternalCommand::new(find("javac")?),
            archiver: ExternalCommand::new(find("jar")?),
            runner: ExternalCommand::new(find("java")?),
        };

        tracing::debug!(
            "Toolchain: javac={} jar={} java={}",
            toolchain.compiler.program().display(),
            toolchain.archiver.program().display(),
            toolchain.runner.program().display()
        );

        Ok(toolchain)
    }

    /// Build a toolchain from explicit commands.
    pub fn from_commands(
        compiler: ExternalCommand,
        archiver: ExternalCommand,
        runner: ExternalCommand,
    ) -> Self {
        Self {
            compiler,
            archiver,
            runner,
        }
    }

    fn find_in_home(home: &Path, name: &str) -> Result<PathBuf> {
        let bin = home.join("bin");
        let candidates = [bin.join(name), bin.join(format!("{}.exe", name))];

        candidates
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| {
                Error::Toolchain(format!(
                    "{} not found in {} (JAVA_HOME={})",
                    name,
                    bin.display(),
                    home.display()
                ))
            })
    }

    fn find_on_path(name: &str) -> Result<PathBuf> {
        which::which(name).map_err(|_| Error::Toolchain(format!("{} not found in PATH", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_from_java_home() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir(&bin).unwrap();
        for tool in ["javac", "jar", "java"] {
            fs::write(bin.join(tool), "").unwrap();
        }

        let toolchain = Toolchain::discover(Some(temp.path())).unwrap();
        assert_eq!(toolchain.compiler.program(), bin.join("javac"));
        assert_eq!(toolchain.archiver.program(), bin.join("jar"));
        assert_eq!(toolchain.runner.program(), bin.join("java"));
    }

    #[test]
    fn test_broken_java_home_is_an_error() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir(&bin).unwrap();
        fs::write(bin.join("javac"), "").unwrap();

        let err = Toolchain::discover(Some(temp.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("jar not found"), "{}", message);
    }
}
