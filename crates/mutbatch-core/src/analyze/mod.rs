//! Post-compile analysis stage.
//!
//! Runs an external bytecode tool over every compiled unit of a variant.

mod tool;
mod units;

pub use tool::{BytecodeToolRunner, ToolRun};
pub use units::{COMPILED_EXTENSION, CompiledUnit, collect_units, qualified_name};
