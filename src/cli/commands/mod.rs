//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `identify`: capture or decode audio and identify the track
//! - `record`: capture to a WAV file, list input devices
//! - `config`: inspect or initialize the config file

mod config;
mod identify;
mod record;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

pub use config::cmd_config;
pub use identify::cmd_identify;
pub use record::{cmd_devices, cmd_record};

use crate::capture::{AudioSnapshot, LiveCapture, MAX_CAPTURE_DURATION};
use crate::config::{Config, ProviderConfig};
use crate::error::{Result, ResultExt};

/// Earshot CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Listen (or read a file) and identify the playing track
    Identify {
        /// Identify an audio file instead of the live input
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Seconds of audio to capture (default from config)
        #[arg(short, long, value_parser = parse_seconds)]
        seconds: Option<u64>,
        /// Start offset into --file, in seconds
        #[arg(long, value_parser = parse_offset, default_value = "0")]
        offset: Duration,
        /// Input device name (default from config, then system default)
        #[arg(short, long)]
        device: Option<String>,
        #[command(flatten)]
        provider: ProviderArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Capture audio to a WAV file
    Record {
        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,
        /// Seconds of audio to capture (default from config)
        #[arg(short, long, value_parser = parse_seconds)]
        seconds: Option<u64>,
        /// Input device name
        #[arg(short, long)]
        device: Option<String>,
    },
    /// List audio input devices
    Devices,
    /// Show the config file location and provider settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Provider settings that override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ProviderArgs {
    /// Provider host (or set ACR_HOST env var)
    #[arg(long, env = "ACR_HOST")]
    pub host: Option<String>,
    /// Provider access key (or set ACR_ACCESS_KEY env var)
    #[arg(long, env = "ACR_ACCESS_KEY")]
    pub access_key: Option<String>,
    /// Provider access secret (or set ACR_ACCESS_SECRET env var)
    #[arg(long, env = "ACR_ACCESS_SECRET", hide_env_values = true)]
    pub access_secret: Option<String>,
}

impl ProviderArgs {
    /// Layer these arguments over the configured provider settings.
    pub fn apply(&self, provider: ProviderConfig) -> ProviderConfig {
        provider.with_overrides(
            self.host.clone(),
            self.access_key.clone(),
            self.access_secret.clone(),
        )
    }
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    match &cli.command {
        Commands::Identify {
            file,
            seconds,
            offset,
            device,
            provider,
            json,
        } => cmd_identify(
            &rt,
            identify::IdentifyOptions {
                file: file.as_deref(),
                seconds: *seconds,
                offset: *offset,
                device: device.as_deref(),
                provider,
                json: *json,
            },
        ),
        Commands::Record {
            output,
            seconds,
            device,
        } => cmd_record(output, *seconds, device.as_deref()),
        Commands::Devices => cmd_devices(),
        Commands::Config { init } => cmd_config(*init),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// `--seconds`: whole seconds between 1 and the capture limit.
fn parse_seconds(value: &str) -> std::result::Result<u64, String> {
    let max = MAX_CAPTURE_DURATION.as_secs();
    let seconds: u64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a whole number of seconds", value))?;
    if seconds == 0 || seconds > max {
        return Err(format!("must be between 1 and {} seconds", max));
    }
    Ok(seconds)
}

/// `--offset`: non-negative seconds, fractions allowed.
fn parse_offset(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", value))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("`{}` is not a usable offset in seconds", value))
}

/// Capture length: the flag if given, else the configured window.
pub(crate) fn capture_duration(seconds: Option<u64>, config: &Config) -> Duration {
    seconds
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.capture.max_duration())
        .min(MAX_CAPTURE_DURATION)
}

/// Record from the live input for `duration`.
pub(crate) fn capture_live(device: Option<&str>, duration: Duration) -> Result<Option<AudioSnapshot>> {
    let mut capture =
        LiveCapture::start(device, duration).with_context("opening audio input")?;
    eprintln!(
        "Listening on {} for {}s...",
        capture.device_name(),
        duration.as_secs()
    );
    capture.record_for(duration);
    let snapshot = capture.snapshot();
    tracing::debug!(
        "Buffered {:.1}s at {}Hz from {}",
        capture.buffered().as_secs_f64(),
        capture.sample_rate(),
        capture.device_name()
    );
    capture.stop();
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identify_defaults() {
        let cli = Cli::try_parse_from(["earshot", "identify"]).unwrap();
        match cli.command {
            Commands::Identify {
                file,
                seconds,
                offset,
                json,
                ..
            } => {
                assert!(file.is_none());
                assert!(seconds.is_none());
                assert_eq!(offset, Duration::ZERO);
                assert!(!json);
            }
            _ => panic!("expected identify"),
        }
    }

    #[test]
    fn test_parse_identify_file_with_credentials() {
        let cli = Cli::try_parse_from([
            "earshot",
            "identify",
            "--file",
            "song.flac",
            "--offset",
            "30",
            "--host",
            "identify.example",
            "--access-key",
            "key",
            "--access-secret",
            "secret",
            "--json",
        ])
        .unwrap();

        let Commands::Identify {
            file,
            offset,
            provider,
            json,
            ..
        } = cli.command
        else {
            panic!("expected identify");
        };
        assert_eq!(file, Some(PathBuf::from("song.flac")));
        assert_eq!(offset, Duration::from_secs(30));
        assert!(json);

        let merged = provider.apply(ProviderConfig::default());
        assert_eq!(merged.host.as_deref(), Some("identify.example"));
        assert!(merged.credentials().is_ok());
    }

    #[test]
    fn test_record_requires_output() {
        assert!(Cli::try_parse_from(["earshot", "record"]).is_err());
        assert!(Cli::try_parse_from(["earshot", "record", "-o", "out.wav"]).is_ok());
    }

    #[test]
    fn test_capture_duration() {
        let config = Config::default();
        assert_eq!(capture_duration(Some(5), &config).as_secs(), 5);
        assert_eq!(capture_duration(Some(0), &config).as_secs(), 15);
        assert_eq!(capture_duration(None, &config).as_secs(), 15);
    }

    #[test]
    fn test_capture_duration_is_clamped() {
        let mut config = Config::default();
        config.capture.max_duration_secs = u64::MAX;
        assert_eq!(capture_duration(None, &config), MAX_CAPTURE_DURATION);
        assert_eq!(capture_duration(Some(u64::MAX), &config), MAX_CAPTURE_DURATION);
    }

    #[test]
    fn test_seconds_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["earshot", "identify", "--seconds", "0"]).is_err());
        assert!(Cli::try_parse_from(["earshot", "identify", "--seconds", "3600"]).is_err());
        assert!(Cli::try_parse_from(["earshot", "record", "-o", "x.wav", "-s", "100000"]).is_err());
        assert!(Cli::try_parse_from(["earshot", "identify", "--seconds", "300"]).is_ok());
    }

    #[test]
    fn test_bad_offsets_rejected() {
        for offset in ["1e30", "-1", "NaN", "inf", "soon"] {
            let result = Cli::try_parse_from(["earshot", "identify", "--offset", offset]);
            assert!(result.is_err(), "offset {} should be rejected", offset);
        }
        assert_eq!(parse_offset("2.5"), Ok(Duration::from_millis(2500)));
    }
}
