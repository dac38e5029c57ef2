//! Command-line interface for earshot.
//!
//! Commands for identifying audio, recording captures and managing config.

mod commands;

pub use commands::{Cli, Commands, run_command};
