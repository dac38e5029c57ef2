//! Decode an audio file into a mono snapshot using symphonia.
//!
//! Lets a file stand in for the microphone: the same window of audio that
//! live capture would have buffered is cut from the file and handed on.
//!
//! Supported formats:
//! - MP3
//! - FLAC
//! - OGG Vorbis
//! - WAV/PCM
//! - AAC (in MP4 container)

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioSnapshot, CaptureError, RingAccumulator, downmix};

/// Decode `max_duration` of audio starting at `offset` into a mono snapshot.
///
/// Returns `Ok(None)` if the file has no audio in the requested window.
pub fn decode_file(
    path: &Path,
    offset: Duration,
    max_duration: Duration,
) -> Result<Option<AudioSnapshot>, CaptureError> {
    let file = File::open(path)
        .map_err(|e| CaptureError::FileOpen(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(&ext.to_string_lossy());
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CaptureError::UnsupportedFormat(e.to_string()))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| CaptureError::UnsupportedFormat("No audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| CaptureError::Decode("Unknown sample rate".to_string()))?;
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(2);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| CaptureError::Decode(e.to_string()))?;

    let skip = (offset.as_secs_f64() * sample_rate as f64) as usize;
    let mut accumulator = RingAccumulator::new(sample_rate, max_duration);
    let end_of_window = skip.saturating_add(accumulator.capacity());
    let mut seen = 0usize;
    let mut mono = Vec::new();

    while seen < end_of_window {
        let packet = match reader.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(CaptureError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!("Skipping bad frame: {}", e);
                continue;
            }
            Err(e) => return Err(CaptureError::Decode(e.to_string())),
        };

        downmix(&interleave(&decoded), channels, &mut mono);

        // Keep only the part of this packet that falls inside the window
        let start = skip.saturating_sub(seen).min(mono.len());
        let end = end_of_window.saturating_sub(seen).min(mono.len());
        accumulator.push(&mono[start..end]);
        seen = seen.saturating_add(mono.len());
    }

    tracing::debug!(
        "Decoded {:?} from {} ({}Hz, {} channels)",
        accumulator.duration(),
        path.display(),
        sample_rate,
        channels
    );

    Ok(accumulator.snapshot())
}

/// Convert a decoded buffer to interleaved f32 samples.
fn interleave(buffer: &AudioBufferRef) -> Vec<f32> {
    match buffer {
        AudioBufferRef::F32(buf) => interleave_with(buf.planes().planes(), buf.frames(), |s| *s),
        AudioBufferRef::S16(buf) => {
            interleave_with(buf.planes().planes(), buf.frames(), |s| *s as f32 / 32768.0)
        }
        AudioBufferRef::S24(buf) => {
            interleave_with(buf.planes().planes(), buf.frames(), |s| s.0 as f32 / 8388608.0)
        }
        AudioBufferRef::S32(buf) => {
            interleave_with(buf.planes().planes(), buf.frames(), |s| *s as f32 / 2147483648.0)
        }
        AudioBufferRef::U8(buf) => {
            interleave_with(buf.planes().planes(), buf.frames(), |s| (*s as f32 - 128.0) / 128.0)
        }
        _ => Vec::new(),
    }
}

fn interleave_with<S>(planes: &[&[S]], frames: usize, convert: impl Fn(&S) -> f32) -> Vec<f32> {
    let mut output = Vec::with_capacity(frames * planes.len());
    for frame in 0..frames {
        for plane in planes {
            output.push(convert(&plane[frame]));
        }
    }
    output
}
