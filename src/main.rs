//! Earshot - identify the song that's playing.
//!
//! Captures audio from an input device (or decodes a file), packs it into a
//! mono 16-bit WAV container and asks a fingerprint provider what it is.

pub mod audio;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod recognition;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("earshot=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
