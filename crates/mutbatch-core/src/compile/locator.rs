//! Variant source lookup.

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Extension of variant source files.
pub const SOURCE_EXTENSION: &str = "java";

/// The single source file of a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    /// Variant id.
    pub variant_id: String,

    /// The variant's directory.
    pub variant_dir: PathBuf,

    /// Source file path relative to `variant_dir`.
    pub relative_path: PathBuf,
}

impl LocatedSource {
    /// Full path of the source file.
    pub fn path(&self) -> PathBuf {
        self.variant_dir.join(&self.relative_path)
    }
}

/// Finds the one source file in each variant directory.
#[derive(Debug, Clone)]
pub struct VariantLocator {
    variants_root: PathBuf,
}

impl VariantLocator {
    /// Create a locator for variants under `variants_root`.
    pub fn new(variants_root: impl Into<PathBuf>) -> Self {
        Self {
            variants_root: variants_root.into(),
        }
    }

    /// Directory of a variant.
    pub fn variant_dir(&self, variant_id: &str) -> PathBuf {
        self.variants_root.join(variant_id)
    }

    /// All variant ids, numeric ids first in numeric order, then the rest
    /// lexically.
    pub fn variant_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.variants_root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(id) => ids.push(id),
                Err(name) => tracing::warn!("Skipping variant with non UTF-8 name {:?}", name),
            }
        }
        ids.sort_by(|a, b| compare_ids(a, b));
        Ok(ids)
    }

    /// Find the variant's source file.
    ///
    /// Only files directly inside the variant directory are considered.
    ///
    /// # Errors
    /// Returns [`Error::Locate`] unless exactly one candidate exists, or
    /// [`Error::Io`] if the directory cannot be read.
    pub fn locate(&self, variant_id: &str) -> Result<LocatedSource> {
        let variant_dir = self.variant_dir(variant_id);

        let mut found = Vec::new();
        for entry in fs::read_dir(&variant_dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_source = path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION);
            if is_source && entry.file_type()?.is_file() {
                found.push(PathBuf::from(entry.file_name()));
            }
        }
        found.sort();

        if found.len() != 1 {
            return Err(Error::Locate {
                variant: variant_id.to_string(),
                found,
            });
        }

        let relative_path = found.remove(0);
        tracing::debug!("Variant {}: located {}", variant_id, relative_path.display());

        Ok(LocatedSource {
            variant_id: variant_id.to_string(),
            variant_dir,
            relative_path,
        })
    }
}

/// Order variant ids: numeric ids numerically, then the rest lexically.
pub(crate) fn compare_ids(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
