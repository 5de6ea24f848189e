//! Comparison of two equivalence listings.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use super::{BASELINE_ID, EquivalenceClass};

/// A class with no exact counterpart on the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// The class being inspected.
    pub class: EquivalenceClass,

    /// Classes on the other side sharing at least one member with it.
    pub counterparts: Vec<EquivalenceClass>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        if !self.counterparts.is_empty() {
            let others: Vec<String> = self.counterparts.iter().map(|c| format!("[{}]", c)).collect();
            write!(f, " : {}", others.join(" "))?;
        }
        Ok(())
    }
}

/// Result of [`compare_equivalences`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct EquivalenceDiff {
    /// Left classes contained in exactly one right class.
    pub matched: usize,

    /// Left classes without a single right counterpart containing them.
    pub left_mismatches: Vec<Mismatch>,

    /// Right classes without a single left counterpart containing them.
    pub right_mismatches: Vec<Mismatch>,
}

impl EquivalenceDiff {
    /// Returns true if both sides agree.
    pub fn is_empty(&self) -> bool {
        self.left_mismatches.is_empty() && self.right_mismatches.is_empty()
    }
}

/// Parse a listing with one whitespace-separated class per line.
///
/// Blank lines are skipped.
pub fn parse_equivalences(text: &str) -> Vec<EquivalenceClass> {
    text.lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|members| !members.is_empty())
        .map(EquivalenceClass::new)
        .collect()
}

/// Compare two listings in both directions.
///
/// The baseline id appears in every equivalent class, so it never links a
/// class to its counterparts. It still takes part in the subset test.
pub fn compare_equivalences(left: &[EquivalenceClass], right: &[EquivalenceClass]) -> EquivalenceDiff {
    let (matched, left_mismatches) = one_way(left, right);
    let (_, right_mismatches) = one_way(right, left);
    EquivalenceDiff {
        matched,
        left_mismatches,
        right_mismatches,
    }
}

fn one_way(from: &[EquivalenceClass], to: &[EquivalenceClass]) -> (usize, Vec<Mismatch>) {
    let mut index: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, class) in to.iter().enumerate() {
        for member in class.members() {
            index.entry(member.as_str()).or_default().push(i);
        }
    }

    let mut matched = 0;
    let mut mismatches = Vec::new();

    for class in from {
        let mut touched: Vec<usize> = class
            .members()
            .iter()
            .filter(|m| m.as_str() != BASELINE_ID)
            .filter_map(|m| index.get(m.as_str()))
            .flatten()
            .copied()
            .collect();
        touched.sort_unstable();
        touched.dedup();

        let contained = match touched.as_slice() {
            [only] => {
                let target: FxHashSet<&String> = to[*only].members().iter().collect();
                class.members().iter().all(|m| target.contains(m))
            }
            _ => false,
        };

        if contained {
            matched += 1;
        } else {
            mismatches.push(Mismatch {
                class: class.clone(),
                counterparts: touched.iter().map(|&i| to[i].clone()).collect(),
            });
        }
    }

    (matched, mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(class: &EquivalenceClass) -> Vec<&str> {
        class.members().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let classes = parse_equivalences("3 2\n\n  \n0 10 4\n");
        assert_eq!(classes.len(), 2);
        assert_eq!(members(&classes[0]), vec!["2", "3"]);
        assert_eq!(members(&classes[1]), vec!["0", "4", "10"]);
    }

    #[test]
    fn test_identical_listings() {
        let left = parse_equivalences("0 1 4\n0 7\n2 3\n");
        let right = parse_equivalences("2 3\n0 4 1\n0 7\n");

        let diff = compare_equivalences(&left, &right);
        assert!(diff.is_empty());
        assert_eq!(diff.matched, 3);
    }

    #[test]
    fn test_subset_matches_one_way_only() {
        let left = parse_equivalences("2 3\n");
        let right = parse_equivalences("2 3 5\n");

        let diff = compare_equivalences(&left, &right);
        assert_eq!(diff.matched, 1);
        assert!(diff.left_mismatches.is_empty());
        assert_eq!(diff.right_mismatches.len(), 1);
        assert_eq!(members(&diff.right_mismatches[0].class), vec!["2", "3", "5"]);
        assert_eq!(diff.right_mismatches[0].counterparts.len(), 1);
    }

    #[test]
    fn test_split_class_is_reported() {
        let left = parse_equivalences("1 2 3 4\n");
        let right = parse_equivalences("1 2\n3 4\n");

        let diff = compare_equivalences(&left, &right);
        assert_eq!(diff.left_mismatches.len(), 1);
        assert_eq!(diff.left_mismatches[0].counterparts.len(), 2);
        assert_eq!(diff.right_mismatches.len(), 0);
    }

    #[test]
    fn test_missing_class_is_reported() {
        let left = parse_equivalences("5 6\n");
        let right = parse_equivalences("");

        let diff = compare_equivalences(&left, &right);
        assert_eq!(diff.left_mismatches.len(), 1);
        assert!(diff.left_mismatches[0].counterparts.is_empty());
        assert_eq!(diff.left_mismatches[0].to_string(), "5 6");
    }

    #[test]
    fn test_baseline_counts_in_subset_test() {
        let left = parse_equivalences("0 1\n");
        let right = parse_equivalences("1 2\n");

        let diff = compare_equivalences(&left, &right);
        assert_eq!(diff.left_mismatches.len(), 1);
        assert_eq!(diff.left_mismatches[0].to_string(), "0 1 : [1 2]");
        assert_eq!(diff.right_mismatches.len(), 1);
    }
}
