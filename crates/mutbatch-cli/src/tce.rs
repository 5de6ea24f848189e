//! Equivalence detection command.

use std::path::Path;

use mutbatch_core::detect_equivalences;
use mutbatch_core::equivalence::DetectPhase;

use crate::colors;

/// Execute the tce command.
pub fn execute(compiled_mutants: &Path, compiled_program: &Path, output: &Path) -> anyhow::Result<()> {
    if !compiled_mutants.is_dir() {
        anyhow::bail!("Compiled mutants directory not found: {}", compiled_mutants.display());
    }
    std::fs::create_dir_all(output)?;
    detect_into(compiled_mutants, compiled_program, output)
}

/// Detect classes and write the result files into `output`.
pub fn detect_into(compiled_mutants: &Path, baseline: &Path, output: &Path) -> anyhow::Result<()> {
    println!(
        "\n{}Detecting equivalences{} among {}",
        colors::BOLD,
        colors::RESET,
        compiled_mutants.display()
    );

    let report = detect_equivalences(compiled_mutants, baseline, |phase, done, total| {
        let label = match phase {
            DetectPhase::Variants => "variants",
            DetectPhase::Baseline => "baseline",
        };
        print!("\r  {}{} {}/{}{}", colors::DIM, label, done, total, colors::RESET);
        if done == total {
            println!();
        }
        colors::flush_stdout();
    })?;

    let written = report.write_to(output)?;

    println!(
        "  {}{}{} variant(s) scanned, {} class(es)",
        colors::CYAN,
        report.variants_scanned,
        colors::RESET,
        report.classes.len()
    );
    println!("  equivalent mutants: {}", report.equivalent_mutants());
    println!("  redundant mutants:  {}", report.redundant_mutants());
    println!("  total equivalences: {}", report.total_equivalences());
    for path in written {
        println!("  {}wrote{} {}", colors::GREEN, colors::RESET, path.display());
    }
    Ok(())
}
