//! Audio capture commands.

use std::path::Path;

use crate::audio::wav;
use crate::capture;
use crate::config;
use crate::error::{Result, ResultExt};

use super::{capture_duration, capture_live};

/// Capture from the input device and write a WAV file
pub fn cmd_record(output: &Path, seconds: Option<u64>, device: Option<&str>) -> anyhow::Result<()> {
    let config = config::load();
    let duration = capture_duration(seconds, &config);
    let device = device.or_else(|| config.capture.device());

    let Some(snapshot) = capture_live(device, duration)? else {
        anyhow::bail!("No audio captured");
    };

    let container = wav::encode(&snapshot);
    write_checked(&container, output)?;

    println!(
        "✓ Wrote {:.1}s of {}Hz mono audio ({} bytes) to {:?}",
        snapshot.duration().as_secs_f64(),
        snapshot.sample_rate,
        container.len(),
        output
    );
    Ok(())
}

/// Write `container` and read it back to confirm the header is intact.
fn write_checked(container: &wav::Container, output: &Path) -> Result<()> {
    container
        .write_to(output)
        .with_context(format!("writing {}", output.display()))?;

    let written = std::fs::read(output).with_context(format!("reading back {}", output.display()))?;
    let decoded = wav::decode(&written)?;
    tracing::debug!(
        "Verified {:?}: {} samples at {}Hz",
        output,
        decoded.samples.len(),
        decoded.sample_rate
    );
    Ok(())
}

/// List available input devices
pub fn cmd_devices() -> anyhow::Result<()> {
    let names = capture::input_device_names()?;
    let configured = config::load().capture.device;

    if names.is_empty() {
        println!("No input devices found.");
        return Ok(());
    }

    println!("Input devices:");
    for (i, name) in names.iter().enumerate() {
        let marker = if !configured.is_empty() && name.to_lowercase().contains(&configured.to_lowercase()) {
            " (configured)"
        } else {
            ""
        };
        println!("  {}. {}{}", i + 1, name, marker);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::AudioSnapshot;

    #[test]
    fn test_write_checked_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let container = wav::encode(&AudioSnapshot::new(vec![0.0, 0.5, -0.5], 16_000));

        write_checked(&container, &path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), container.as_bytes());
    }

    #[test]
    fn test_write_checked_reports_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("take.wav");
        let container = wav::encode(&AudioSnapshot::new(vec![0.1], 8_000));

        let err = write_checked(&container, &path).unwrap_err();

        assert!(err.to_string().contains("writing"));
    }
}
