//! Equivalence listing comparison command.

use std::fs;
use std::path::Path;

use mutbatch_core::equivalence::Mismatch;
use mutbatch_core::{compare_equivalences, parse_equivalences};

use crate::colors;

/// Execute the compare command.
pub fn execute(left: &Path, right: &Path) -> anyhow::Result<()> {
    let left_text = read(left)?;
    let right_text = read(right)?;

    let diff = compare_equivalences(
        &parse_equivalences(&left_text),
        &parse_equivalences(&right_text),
    );

    print_side(left, &diff.left_mismatches);
    print_side(right, &diff.right_mismatches);

    println!("\n{}", "─".repeat(50));
    if diff.is_empty() {
        println!("{}Listings agree{} ({} class(es))", colors::GREEN, colors::RESET, diff.matched);
    } else {
        println!(
            "{}Listings differ{}: {} matched, {} only in {}, {} only in {}",
            colors::YELLOW,
            colors::RESET,
            diff.matched,
            diff.left_mismatches.len(),
            left.display(),
            diff.right_mismatches.len(),
            right.display()
        );
    }
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

fn print_side(path: &Path, mismatches: &[Mismatch]) {
    println!("{}Inspecting{} {}", colors::BOLD, colors::RESET, path.display());
    for mismatch in mismatches {
        println!("    {}", mismatch);
    }
}
