//! Rolling capture buffer.
//!
//! Keeps only the most recent `max_duration` of mono samples. Old audio is
//! discarded as new frames arrive; nothing here can fail.

use std::collections::VecDeque;
use std::time::Duration;

use super::AudioSnapshot;

/// Default retention window.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(15);

/// Longest retention window accepted. Longer requests are clamped.
pub const MAX_CAPTURE_DURATION: Duration = Duration::from_secs(300);

/// Fixed-capacity buffer of the most recent captured samples.
#[derive(Debug, Clone)]
pub struct RingAccumulator {
    samples: VecDeque<f32>,
    sample_rate: u32,
    max_duration: Duration,
    capacity: usize,
}

impl RingAccumulator {
    /// Create an accumulator retaining `max_duration` at `sample_rate`.
    ///
    /// The window is clamped to [`MAX_CAPTURE_DURATION`]. Storage grows with
    /// the audio actually pushed, up to the capacity.
    pub fn new(sample_rate: u32, max_duration: Duration) -> Self {
        let max_duration = max_duration.min(MAX_CAPTURE_DURATION);
        let capacity = capacity_for(sample_rate, max_duration);
        Self {
            samples: VecDeque::new(),
            sample_rate,
            max_duration,
            capacity,
        }
    }

    /// Append a frame, dropping the oldest samples once over capacity.
    pub fn push(&mut self, frame: &[f32]) {
        if self.capacity == 0 {
            return;
        }
        // Only the tail of an oversized frame can survive
        let frame = if frame.len() > self.capacity {
            &frame[frame.len() - self.capacity..]
        } else {
            frame
        };

        let overflow = (self.samples.len() + frame.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.samples.drain(..overflow);
        }
        self.samples.extend(frame.iter().copied());
    }

    /// Copy out the current contents. `None` when nothing has been captured.
    pub fn snapshot(&self) -> Option<AudioSnapshot> {
        if self.samples.is_empty() {
            return None;
        }
        Some(AudioSnapshot {
            samples: self.samples.iter().copied().collect(),
            sample_rate: self.sample_rate,
        })
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Switch to a new sample rate. Buffered audio at the old rate is discarded.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        if sample_rate == self.sample_rate {
            return;
        }
        tracing::debug!(
            from = self.sample_rate,
            to = sample_rate,
            "Sample rate changed, clearing capture buffer"
        );
        self.sample_rate = sample_rate;
        self.capacity = capacity_for(sample_rate, self.max_duration);
        self.samples = VecDeque::new();
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retention window after clamping.
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of audio currently buffered.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

fn capacity_for(sample_rate: u32, max_duration: Duration) -> usize {
    (max_duration.as_secs_f64() * sample_rate as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_is_none() {
        let acc = RingAccumulator::new(44_100, DEFAULT_MAX_DURATION);
        assert!(acc.snapshot().is_none());
        assert!(acc.is_empty());
    }

    #[test]
    fn test_capacity_from_duration() {
        let acc = RingAccumulator::new(44_100, DEFAULT_MAX_DURATION);
        assert_eq!(acc.capacity(), 15 * 44_100);
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut acc = RingAccumulator::new(10, Duration::from_secs(1));
        acc.push(&[0.1, 0.2, 0.3]);
        acc.push(&[0.4]);

        let snap = acc.snapshot().unwrap();
        assert_eq!(snap.samples, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(snap.sample_rate, 10);
    }

    #[test]
    fn test_push_drops_oldest_over_capacity() {
        let mut acc = RingAccumulator::new(4, Duration::from_secs(1));
        acc.push(&[1.0, 2.0, 3.0]);
        acc.push(&[4.0, 5.0, 6.0]);

        assert_eq!(acc.len(), 4);
        assert_eq!(acc.snapshot().unwrap().samples, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_oversized_frame_keeps_tail() {
        let mut acc = RingAccumulator::new(3, Duration::from_secs(1));
        acc.push(&[0.0]);
        acc.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(acc.snapshot().unwrap().samples, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_snapshot_is_independent_of_later_writes() {
        let mut acc = RingAccumulator::new(8, Duration::from_secs(1));
        acc.push(&[0.5, 0.5]);
        let snap = acc.snapshot().unwrap();

        acc.clear();
        acc.push(&[-0.5]);

        assert_eq!(snap.samples, vec![0.5, 0.5]);
        assert_eq!(acc.snapshot().unwrap().samples, vec![-0.5]);
    }

    #[test]
    fn test_clear() {
        let mut acc = RingAccumulator::new(8, Duration::from_secs(1));
        acc.push(&[0.1; 5]);
        acc.clear();
        assert!(acc.snapshot().is_none());
        assert_eq!(acc.duration(), Duration::ZERO);
    }

    #[test]
    fn test_sample_rate_change_resets() {
        let mut acc = RingAccumulator::new(8, Duration::from_secs(2));
        acc.push(&[0.1; 5]);

        acc.set_sample_rate(16);

        assert!(acc.is_empty());
        assert_eq!(acc.capacity(), 32);
        assert_eq!(acc.sample_rate(), 16);
    }

    #[test]
    fn test_same_sample_rate_keeps_audio() {
        let mut acc = RingAccumulator::new(8, Duration::from_secs(2));
        acc.push(&[0.1; 5]);
        acc.set_sample_rate(8);
        assert_eq!(acc.len(), 5);
    }

    #[test]
    fn test_zero_capacity_ignores_frames() {
        let mut acc = RingAccumulator::new(0, DEFAULT_MAX_DURATION);
        acc.push(&[0.3; 10]);
        assert!(acc.snapshot().is_none());
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let acc = RingAccumulator::new(48_000, Duration::from_secs(u64::MAX));
        assert_eq!(acc.max_duration(), MAX_CAPTURE_DURATION);
        assert_eq!(acc.capacity(), 300 * 48_000);
    }

    #[test]
    fn test_storage_grows_with_audio() {
        let mut acc = RingAccumulator::new(48_000, Duration::from_secs(3600));
        assert!(acc.samples.capacity() < 48_000);

        acc.push(&[0.1; 100]);
        assert_eq!(acc.len(), 100);
        assert!(acc.samples.capacity() < acc.capacity());
    }

    #[test]
    fn test_duration() {
        let mut acc = RingAccumulator::new(100, Duration::from_secs(15));
        acc.push(&[0.0; 250]);
        assert_eq!(acc.duration(), Duration::from_millis(2500));
    }
}
