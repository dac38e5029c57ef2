//! Track identification command.

use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::capture::{AudioSnapshot, decode};
use crate::config::{self, Config};
use crate::error::{Result, ResultExt};
use crate::recognition::{LabeledRecognition, Recognition, Recognizer, fallback};

use super::{ProviderArgs, capture_duration, capture_live};

/// Parsed `identify` arguments
pub struct IdentifyOptions<'a> {
    pub file: Option<&'a Path>,
    pub seconds: Option<u64>,
    pub offset: Duration,
    pub device: Option<&'a str>,
    pub provider: &'a ProviderArgs,
    pub json: bool,
}

/// Capture (or decode) audio and identify the track
pub fn cmd_identify(rt: &Runtime, opts: IdentifyOptions<'_>) -> anyhow::Result<()> {
    let mut config = config::load();
    config.provider = opts.provider.apply(config.provider);
    let recognizer = Recognizer::from_config(&config);

    // Fail on missing credentials before spending time on capture
    if let Err(e) = recognizer.credentials() {
        eprintln!("Error: {}", e);
        eprintln!("Set it in the config file, with --host/--access-key/--access-secret,");
        eprintln!("or via ACR_HOST, ACR_ACCESS_KEY and ACR_ACCESS_SECRET.");
        return Err(e.into());
    }

    let snapshot = acquire(&opts, &config)?;
    let result = match snapshot {
        Some(snapshot) => identify_snapshot(rt, &recognizer, &snapshot)?,
        None => {
            tracing::warn!("No audio captured");
            None
        }
    };

    let labeled = fallback::resolve(result);
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&labeled)?);
    } else {
        print_recognition(&labeled);
    }
    Ok(())
}

/// Decode the requested file window, or record from the input device.
fn acquire(opts: &IdentifyOptions<'_>, config: &Config) -> Result<Option<AudioSnapshot>> {
    let duration = capture_duration(opts.seconds, config);
    match opts.file {
        Some(path) => {
            if !opts.json {
                println!("Identifying: {:?}", path);
            }
            decode::decode_file(path, opts.offset, duration)
                .with_context(format!("decoding {}", path.display()))
        }
        None => capture_live(opts.device.or_else(|| config.capture.device()), duration),
    }
}

fn identify_snapshot(
    rt: &Runtime,
    recognizer: &Recognizer,
    snapshot: &AudioSnapshot,
) -> Result<Option<Recognition>> {
    tracing::debug!(
        "Captured {:.1}s at {}Hz",
        snapshot.duration().as_secs_f64(),
        snapshot.sample_rate
    );
    Ok(rt.block_on(recognizer.identify_snapshot(snapshot))?)
}

fn print_recognition(labeled: &LabeledRecognition) {
    let r = &labeled.recognition;
    println!();
    if labeled.is_fallback() {
        println!("✗ No match found");
        println!();
    } else {
        println!("✓ Match found! (confidence: {}%)", r.confidence);
        println!();
    }

    println!("  Title:  {}", r.title);
    println!("  Artist: {}", r.artist);
    if let Some(album) = &r.album {
        println!("  Album:  {}", album);
    }
    if let Some(duration) = &r.duration_text {
        println!("  Length: {}", duration);
    }
    if let Some(art) = &r.album_art_url {
        println!("  Cover:  {}", art);
    }
    if let Some(link) = &r.external_link {
        println!();
        println!("  Listen: {}", link);
    }
    println!("  Source: {}", labeled.provenance);
}
