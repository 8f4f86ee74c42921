//! CLI command implementations.

mod build;
mod glyphs;

pub use build::{BuildOutcome, BuildPlan, build, describe_outputs};
pub use glyphs::{glyphs, list_glyphs};
