//! Equivalence detection.
//!
//! Variants are bucketed by the sorted list of their unit paths, then by the
//! contents of those units. Every bucket with two or more members is a
//! class. Finally the baseline's units are looked up for each path list and
//! join the matching bucket, if any.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::compile::{VariantLocator, compare_ids};
use crate::error::{Error, Result};
use crate::walk::relative_files;

use super::BASELINE_ID;

/// Which pass of the detection is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectPhase {
    /// Reading compiled variants.
    Variants,
    /// Reading the baseline.
    Baseline,
}

/// A set of ids whose compiled units are identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceClass {
    members: Vec<String>,
}

impl EquivalenceClass {
    pub(super) fn new(mut members: Vec<String>) -> Self {
        members.sort_by(|a, b| compare_ids(a, b));
        Self { members }
    }

    /// Member ids, sorted.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns true if the baseline is a member.
    pub fn contains_baseline(&self) -> bool {
        self.members.iter().any(|m| m == BASELINE_ID)
    }

    /// Number of members beyond the first one.
    pub fn extra_members(&self) -> usize {
        self.members.len().saturating_sub(1)
    }
}

impl fmt::Display for EquivalenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.members.join(" "))
    }
}

/// Classes found by [`detect_equivalences`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct EquivalenceReport {
    /// Variants that had compiled units.
    pub variants_scanned: usize,

    /// All non-singleton classes.
    pub classes: Vec<EquivalenceClass>,
}

impl EquivalenceReport {
    /// Classes containing the baseline.
    pub fn equivalent(&self) -> impl Iterator<Item = &EquivalenceClass> {
        self.classes.iter().filter(|c| c.contains_baseline())
    }

    /// Classes not containing the baseline.
    pub fn redundant(&self) -> impl Iterator<Item = &EquivalenceClass> {
        self.classes.iter().filter(|c| !c.contains_baseline())
    }

    /// Total equivalences: each class of `n` members counts `n - 1`.
    pub fn total_equivalences(&self) -> usize {
        self.classes.iter().map(EquivalenceClass::extra_members).sum()
    }

    /// Variants equivalent to the baseline.
    pub fn equivalent_mutants(&self) -> usize {
        self.equivalent().map(EquivalenceClass::extra_members).sum()
    }

    /// Variants redundant with another variant.
    pub fn redundant_mutants(&self) -> usize {
        self.redundant().map(EquivalenceClass::extra_members).sum()
    }

    /// Write `all-equivalences.txt`, `equivalent-mutants.txt` and
    /// `redundant-mutants.txt` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let files: [(&str, Vec<&EquivalenceClass>); 3] = [
            ("all-equivalences.txt", self.classes.iter().collect()),
            ("equivalent-mutants.txt", self.equivalent().collect()),
            ("redundant-mutants.txt", self.redundant().collect()),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, classes) in files {
            let path = dir.join(name);
            let body: String = classes.iter().map(|c| format!("{}\n", c)).collect();
            fs::write(&path, body)?;
            written.push(path);
        }
        Ok(written)
    }
}

type UnitPaths = Vec<PathBuf>;
type UnitContents = Vec<Vec<u8>>;

/// Group compiled variants into equivalence classes.
///
/// `compiled_variants` holds one directory per variant containing only the
/// variant's units; `baseline` is the root the same relative paths resolve
/// against. Variants without units are skipped. `progress` is called with
/// `(phase, done, total)`.
///
/// # Errors
/// Returns an error if a directory or unit cannot be read.
pub fn detect_equivalences(
    compiled_variants: &Path,
    baseline: &Path,
    mut progress: impl FnMut(DetectPhase, usize, usize),
) -> Result<EquivalenceReport> {
    if !baseline.is_dir() {
        return Err(Error::Equivalence(format!(
            "baseline is not a directory: {}",
            baseline.display()
        )));
    }

    let ids = VariantLocator::new(compiled_variants).variant_ids()?;
    tracing::info!("Looking for redundant variants among {}", ids.len());

    // Insertion order of buckets, so classes come out in a stable order.
    let mut order: Vec<(UnitPaths, UnitContents)> = Vec::new();
    let mut buckets: FxHashMap<UnitPaths, FxHashMap<UnitContents, Vec<String>>> =
        FxHashMap::default();
    // Distinct unit path lists, in first-seen order.
    let mut path_lists: Vec<UnitPaths> = Vec::new();
    let mut variants_scanned = 0;

    for (i, id) in ids.iter().enumerate() {
        let root = compiled_variants.join(id);
        let paths = relative_files(&root, |_| true)?;
        if !paths.is_empty() {
            variants_scanned += 1;
            let contents = read_all(&root, &paths)?;
            if !buckets.contains_key(&paths) {
                path_lists.push(paths.clone());
            }
            let members = buckets
                .entry(paths.clone())
                .or_default()
                .entry(contents.clone())
                .or_default();
            if members.is_empty() {
                order.push((paths, contents));
            }
            members.push(id.clone());
        }
        progress(DetectPhase::Variants, i + 1, ids.len());
    }

    tracing::info!("Looking for variants equivalent to the baseline");

    for (i, paths) in path_lists.iter().enumerate() {
        if let Some(contents) = read_baseline(baseline, paths)? {
            if let Some(members) = buckets.get_mut(paths).and_then(|b| b.get_mut(&contents)) {
                members.push(BASELINE_ID.to_string());
            }
        }
        progress(DetectPhase::Baseline, i + 1, path_lists.len());
    }

    let classes = order
        .iter()
        .filter_map(|(paths, contents)| buckets.get(paths).and_then(|b| b.get(contents)))
        .filter(|members| members.len() >= 2)
        .map(|members| EquivalenceClass::new(members.clone()))
        .collect();

    Ok(EquivalenceReport {
        variants_scanned,
        classes,
    })
}

fn read_all(root: &Path, paths: &[PathBuf]) -> Result<UnitContents> {
    paths
        .iter()
        .map(|p| fs::read(root.join(p)).map_err(Error::from))
        .collect()
}

/// Baseline contents for `paths`, or `None` if any of them is missing.
fn read_baseline(baseline: &Path, paths: &[PathBuf]) -> Result<Option<UnitContents>> {
    if paths.iter().any(|p| !baseline.join(p).is_file()) {
        return Ok(None);
    }
    read_all(baseline, paths).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn unit(root: &Path, relative: &str, bytes: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    struct Layout {
        _temp: TempDir,
        variants: PathBuf,
        baseline: PathBuf,
    }

    fn layout() -> Layout {
        let temp = TempDir::new().unwrap();
        let variants = temp.path().join("compiled");
        let baseline = temp.path().join("classes");
        fs::create_dir_all(&variants).unwrap();
        fs::create_dir_all(&baseline).unwrap();

        unit(&baseline, "p/A.class", b"original A");
        unit(&baseline, "p/B.class", b"original B");

        // 1 and 4 are equivalent to the baseline.
        unit(&variants, "1/p/A.class", b"original A");
        unit(&variants, "4/p/A.class", b"original A");
        // 2 and 3 are redundant with each other.
        unit(&variants, "2/p/A.class", b"mutated A");
        unit(&variants, "3/p/A.class", b"mutated A");
        // 5 is unique; 6 failed to compile.
        unit(&variants, "5/p/B.class", b"mutated B");
        fs::create_dir_all(variants.join("6")).unwrap();

        Layout {
            _temp: temp,
            variants,
            baseline,
        }
    }

    fn members(class: &EquivalenceClass) -> Vec<&str> {
        class.members().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_detect_classes() {
        let layout = layout();
        let report = detect_equivalences(&layout.variants, &layout.baseline, |_, _, _| {}).unwrap();

        assert_eq!(report.variants_scanned, 5);
        assert_eq!(report.classes.len(), 2);

        let equivalent: Vec<_> = report.equivalent().collect();
        assert_eq!(equivalent.len(), 1);
        assert_eq!(members(equivalent[0]), vec!["0", "1", "4"]);

        let redundant: Vec<_> = report.redundant().collect();
        assert_eq!(redundant.len(), 1);
        assert_eq!(members(redundant[0]), vec!["2", "3"]);

        assert_eq!(report.equivalent_mutants(), 2);
        assert_eq!(report.redundant_mutants(), 1);
        assert_eq!(report.total_equivalences(), 3);
    }

    #[test]
    fn test_single_variant_equivalent_to_baseline() {
        let layout = layout();
        unit(&layout.variants, "7/p/B.class", b"original B");

        let report = detect_equivalences(&layout.variants, &layout.baseline, |_, _, _| {}).unwrap();
        let equivalent: Vec<Vec<&str>> = report.equivalent().map(members).collect();
        assert!(equivalent.contains(&vec!["0", "7"]));
    }

    #[test]
    fn test_missing_baseline_unit_never_matches() {
        let layout = layout();
        unit(&layout.variants, "8/q/New.class", b"x");
        unit(&layout.variants, "9/q/New.class", b"x");

        let report = detect_equivalences(&layout.variants, &layout.baseline, |_, _, _| {}).unwrap();
        let redundant: Vec<Vec<&str>> = report.redundant().map(members).collect();
        assert!(redundant.contains(&vec!["8", "9"]));
    }

    #[test]
    fn test_progress_reaches_total() {
        let layout = layout();
        let mut last = Vec::new();
        detect_equivalences(&layout.variants, &layout.baseline, |phase, done, total| {
            last.push((phase, done, total));
        })
        .unwrap();

        assert!(last.contains(&(DetectPhase::Variants, 6, 6)));
        assert!(last.contains(&(DetectPhase::Baseline, 2, 2)));
    }

    #[test]
    fn test_baseline_checked_once_per_path_list() {
        let layout = layout();
        for id in 10..40 {
            unit(
                &layout.variants,
                &format!("{id}/p/A.class"),
                format!("mutant {id}").as_bytes(),
            );
        }

        let mut baseline_steps = Vec::new();
        detect_equivalences(&layout.variants, &layout.baseline, |phase, done, total| {
            if phase == DetectPhase::Baseline {
                baseline_steps.push((done, total));
            }
        })
        .unwrap();

        // Only "p/A.class" and "p/B.class" occur as unit path lists.
        assert_eq!(baseline_steps, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_write_to() {
        let layout = layout();
        let report = detect_equivalences(&layout.variants, &layout.baseline, |_, _, _| {}).unwrap();

        let out = TempDir::new().unwrap();
        let written = report.write_to(out.path()).unwrap();
        assert_eq!(written.len(), 3);

        let all = fs::read_to_string(out.path().join("all-equivalences.txt")).unwrap();
        assert_eq!(all, "0 1 4\n2 3\n");
        let equivalent = fs::read_to_string(out.path().join("equivalent-mutants.txt")).unwrap();
        assert_eq!(equivalent, "0 1 4\n");
        let redundant = fs::read_to_string(out.path().join("redundant-mutants.txt")).unwrap();
        assert_eq!(redundant, "2 3\n");
    }

    #[test]
    fn test_baseline_must_exist() {
        let layout = layout();
        let result = detect_equivalences(
            &layout.variants,
            &layout.baseline.join("missing"),
            |_, _, _| {},
        );
        assert!(matches!(result, Err(Error::Equivalence(_))));
    }
}
