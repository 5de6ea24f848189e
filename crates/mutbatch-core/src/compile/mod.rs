//! Compilation pipeline for mutant variants.
//!
//! This module provides:
//! - Toolchain discovery (compiler, archiver, runner)
//! - External process invocation with two-outcome results
//! - Baseline packaging and classpath composition
//! - Variant source lookup and compilation
//!
//! # Architecture
//!
//! ```text
//! Baseline classes ──► package_baseline ──► classpath.jar ──┐
//! Dependencies / lib dir ───────────────────────────────────┴─► Classpath
//!                                                                   │
//! mutants/<id>/ ──► VariantLocator ──► VariantCompiler ◄────────────┘
//!                                            │
//!                                            └──► compiled/<id>/
//! ```

mod baseline;
mod classpath;
mod compiler;
mod locator;
mod process;
mod toolchain;

pub use baseline::package_baseline;
pub use classpath::{Classpath, compose_classpath};
pub use compiler::VariantCompiler;
pub use locator::{LocatedSource, SOURCE_EXTENSION, VariantLocator};
pub(crate) use locator::compare_ids;
pub use process::{ExternalCommand, Outcome};
pub use toolchain::Toolchain;
