//! Ligafont CLI library.

pub mod check;
pub mod cli;
pub mod commands;
pub mod io;
pub mod mapping;
pub mod preview;
pub mod settings;

pub use commands::{BuildOutcome, BuildPlan, build};
pub use settings::Settings;
