//! Audio capture.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  cpal input callback (RT)    │  down-mix to mono, push into rtrb
//! └──────────────┬───────────────┘
//!                │ lock-free SPSC ring
//!                ▼
//! ┌──────────────────────────────┐
//! │  LiveCapture::pump()         │  drain into RingAccumulator
//! └──────────────┬───────────────┘
//!                │ snapshot() = owned copy
//!                ▼
//!          AudioSnapshot  ──▶  audio::wav::encode
//! ```
//!
//! The real-time callback never touches the accumulator directly and never
//! triggers I/O. Identification only ever sees an owned [`AudioSnapshot`], so
//! stopping or clearing capture cannot disturb a request already in flight.

mod accumulator;
pub mod decode;
mod stream;

use std::time::Duration;

pub use accumulator::{DEFAULT_MAX_DURATION, MAX_CAPTURE_DURATION, RingAccumulator};
pub use stream::{LiveCapture, input_device_names};

/// An immutable, owned copy of captured mono samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSnapshot {
    /// Samples in [-1, 1]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioSnapshot {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length of the captured audio.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Errors from opening or running a capture source.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No input device found")]
    NoDevice,

    #[error("Input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to initialize audio input: {0}")]
    Init(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to open {0}")]
    FileOpen(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Average interleaved frames down to a single channel.
pub(crate) fn downmix(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    out.clear();
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_duration() {
        let snap = AudioSnapshot::new(vec![0.0; 22_050], 44_100);
        assert_eq!(snap.duration(), Duration::from_millis(500));
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_snapshot_zero_rate() {
        let snap = AudioSnapshot::new(vec![0.0; 10], 0);
        assert_eq!(snap.duration(), Duration::ZERO);
    }

    #[test]
    fn test_downmix_stereo() {
        let mut out = Vec::new();
        downmix(&[1.0, 0.0, -0.5, -0.5, 0.25, 0.75], 2, &mut out);
        assert_eq!(out, vec![0.5, -0.5, 0.5]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let mut out = vec![9.0];
        downmix(&[0.1, 0.2], 1, &mut out);
        assert_eq!(out, vec![0.1, 0.2]);
    }

    #[test]
    fn test_downmix_drops_partial_frame() {
        let mut out = Vec::new();
        downmix(&[0.2, 0.4, 0.6], 2, &mut out);
        assert_eq!(out.len(), 1);
    }
}
