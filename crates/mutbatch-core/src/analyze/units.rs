//! Compiled unit discovery.

use std::path::{Component, Path, PathBuf};

use crate::error::Result;
use crate::walk::relative_files;

/// Extension of compiled units.
pub const COMPILED_EXTENSION: &str = "class";

/// One compiled artifact inside a variant's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    /// Path relative to the output directory.
    pub relative_path: PathBuf,

    /// Fully-qualified name derived from `relative_path`.
    pub qualified_name: String,
}

/// Derive a fully-qualified name from a unit's relative path.
///
/// `org/example/Foo$Inner.class` becomes `org.example.Foo$Inner`.
pub fn qualified_name(relative_path: &Path) -> String {
    let stem = relative_path.with_extension("");
    stem.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// All compiled units under `output_dir`, recursively, sorted by path.
pub fn collect_units(output_dir: &Path) -> Result<Vec<CompiledUnit>> {
    let paths = relative_files(output_dir, |path| {
        path.extension().is_some_and(|ext| ext == COMPILED_EXTENSION)
    })?;

    Ok(paths
        .into_iter()
        .map(|relative_path| CompiledUnit {
            qualified_name: qualified_name(&relative_path),
            relative_path,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name(Path::new("Foo.class")), "Foo");
        assert_eq!(
            qualified_name(Path::new("org/example/Foo.class")),
            "org.example.Foo"
        );
        assert_eq!(
            qualified_name(Path::new("org/example/Foo$Inner.class")),
            "org.example.Foo$Inner"
        );
    }

    #[test]
    fn test_collect_units_recursive_and_sorted() {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("org").join("example");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("Zed.class"), "").unwrap();
        fs::write(pkg.join("Alpha.class"), "").unwrap();
        fs::write(pkg.join("Alpha.java"), "").unwrap();
        fs::write(temp.path().join("Top.class"), "").unwrap();

        let units = collect_units(temp.path()).unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["Top", "org.example.Alpha", "org.example.Zed"]);
        assert_eq!(
            units[1].relative_path,
            PathBuf::from("org/example/Alpha.class")
        );
    }

    #[test]
    fn test_collect_units_empty() {
        let temp = TempDir::new().unwrap();
        assert!(collect_units(temp.path()).unwrap().is_empty());
    }
}
