//! Canonical RIFF/WAVE encoding.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! 0..4    "RIFF"
//! 4..8    u32  36 + data_size
//! 8..12   "WAVE"
//! 12..16  "fmt "
//! 16..20  u32  16        (fmt chunk size)
//! 20..22  u16  1         (PCM)
//! 22..24  u16  1         (mono)
//! 24..28  u32  sample rate
//! 28..32  u32  byte rate = sample_rate * block_align
//! 32..34  u16  2         (block align)
//! 34..36  u16  16        (bits per sample)
//! 36..40  "data"
//! 40..44  u32  data_size
//! 44..    i16 samples
//! ```
//!
//! Only this exact layout is produced and accepted. There is no support for
//! extra chunks, compression or more than one channel.

use std::path::Path;

use crate::capture::AudioSnapshot;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;
const FORMAT_PCM: u16 = 1;

/// Most samples one container can hold. The RIFF size field is a u32 that
/// also counts the 36 bytes after it.
pub const MAX_SAMPLES: usize = (u32::MAX as usize - 36) / BLOCK_ALIGN as usize;

/// An encoded WAV buffer (header + PCM data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    bytes: Vec<u8>,
}

impl Container {
    /// Total length in bytes, header included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_size() == 0
    }

    /// Length of the PCM payload in bytes.
    pub fn data_size(&self) -> usize {
        self.bytes.len() - HEADER_LEN
    }

    /// Sample rate recorded in the header.
    pub fn sample_rate(&self) -> u32 {
        read_u32(&self.bytes, 24)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the container to disk as a `.wav` file.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Errors from parsing a WAV buffer.
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    #[error("Buffer too short for WAV header: {0} bytes")]
    TooShort(usize),

    #[error("Missing {0} tag")]
    MissingTag(&'static str),

    #[error("Unsupported format: {0}")]
    Unsupported(String),

    #[error("Data size mismatch: header says {declared} bytes, buffer holds {actual}")]
    SizeMismatch { declared: usize, actual: usize },
}

/// Encode a snapshot as a mono 16-bit PCM WAV container.
///
/// Samples are clamped to [-1, 1] and scaled asymmetrically so that -1.0
/// maps to -32768 and +1.0 to 32767 without overflowing.
///
/// Snapshots longer than [`MAX_SAMPLES`] are truncated to fit the header.
pub fn encode(snapshot: &AudioSnapshot) -> Container {
    let kept = snapshot.samples.len().min(MAX_SAMPLES);
    if kept < snapshot.samples.len() {
        tracing::warn!(
            "Truncating {} samples to {} to fit the WAV header",
            snapshot.samples.len(),
            kept
        );
    }
    let samples = &snapshot.samples[..kept];
    let (riff_size, data_size) = chunk_sizes(kept);
    let byte_rate = snapshot.sample_rate.saturating_mul(BLOCK_ALIGN as u32);

    let mut bytes = Vec::with_capacity(HEADER_LEN + data_size as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&riff_size.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    bytes.extend_from_slice(&CHANNELS.to_le_bytes());
    bytes.extend_from_slice(&snapshot.sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_size.to_le_bytes());

    for &sample in samples {
        bytes.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    Container { bytes }
}

/// Parse a canonical container back into samples.
pub fn decode(bytes: &[u8]) -> Result<AudioSnapshot, WavError> {
    if bytes.len() < HEADER_LEN {
        return Err(WavError::TooShort(bytes.len()));
    }
    expect_tag(bytes, 0, b"RIFF", "RIFF")?;
    expect_tag(bytes, 8, b"WAVE", "WAVE")?;
    expect_tag(bytes, 12, b"fmt ", "fmt")?;
    expect_tag(bytes, 36, b"data", "data")?;

    let format = read_u16(bytes, 20);
    let channels = read_u16(bytes, 22);
    let bits = read_u16(bytes, 34);
    if format != FORMAT_PCM || channels != CHANNELS || bits != BITS_PER_SAMPLE {
        return Err(WavError::Unsupported(format!(
            "format {format}, {channels} channels, {bits} bits"
        )));
    }

    let declared = read_u32(bytes, 40) as usize;
    let actual = bytes.len() - HEADER_LEN;
    if declared != actual {
        return Err(WavError::SizeMismatch { declared, actual });
    }

    let samples = bytes[HEADER_LEN..]
        .chunks_exact(2)
        .map(|pair| {
            let value = i16::from_le_bytes([pair[0], pair[1]]);
            if value < 0 {
                value as f32 / 32768.0
            } else {
                value as f32 / 32767.0
            }
        })
        .collect();

    Ok(AudioSnapshot {
        samples,
        sample_rate: read_u32(bytes, 24),
    })
}

/// RIFF and data chunk sizes for `samples` samples, capped at [`MAX_SAMPLES`].
fn chunk_sizes(samples: usize) -> (u32, u32) {
    let data = u32::try_from(samples.min(MAX_SAMPLES) * BLOCK_ALIGN as usize)
        .unwrap_or(u32::MAX - 36);
    (data + 36, data)
}

fn quantize(sample: f32) -> i16 {
    // NaN survives the clamp and casts to 0
    let v = sample.clamp(-1.0, 1.0);
    if v < 0.0 {
        (v * 32768.0) as i16
    } else {
        (v * 32767.0) as i16
    }
}

fn expect_tag(bytes: &[u8], at: usize, tag: &[u8; 4], name: &'static str) -> Result<(), WavError> {
    if &bytes[at..at + 4] == tag {
        Ok(())
    } else {
        Err(WavError::MissingTag(name))
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn samples() -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(-1.0f32..=1.0, 0..2048)
    }

    proptest! {
        /// Decoding an encoded buffer reproduces each sample within one quantization step
        #[test]
        fn roundtrip_within_one_step(samples in samples(), rate in 8_000u32..96_000) {
            let original = AudioSnapshot { samples, sample_rate: rate };
            let decoded = decode(encode(&original).as_bytes()).unwrap();

            prop_assert_eq!(decoded.sample_rate, rate);
            prop_assert_eq!(decoded.samples.len(), original.samples.len());
            for (a, b) in original.samples.iter().zip(&decoded.samples) {
                prop_assert!((a - b).abs() <= 1.0 / 32768.0 + f32::EPSILON, "{} vs {}", a, b);
            }
        }

        /// Header sizes always agree with the sample count
        #[test]
        fn header_sizes_match_sample_count(samples in samples(), rate in 8_000u32..96_000) {
            let count = samples.len();
            let container = encode(&AudioSnapshot { samples, sample_rate: rate });
            let bytes = container.as_bytes();

            prop_assert_eq!(container.data_size(), 2 * count);
            prop_assert_eq!(container.len(), HEADER_LEN + container.data_size());
            prop_assert_eq!(read_u32(bytes, 40) as usize, 2 * count);
            prop_assert_eq!(read_u32(bytes, 4) as usize, 36 + 2 * count);
            prop_assert_eq!(read_u32(bytes, 28), rate * 2);
        }
    }
}
