//! Split a container into the byte ranges submitted to the provider.
//!
//! Short captures go up whole. Longer ones are cut into at most three windows
//! of `OPTIMAL_SEGMENT_BYTES` covering the start, middle and end, since we
//! don't know where in the capture the song is clearest.

/// Preferred upload size (10 s of 44.1 kHz stereo 16-bit).
pub const OPTIMAL_SEGMENT_BYTES: usize = 1_764_000;

/// Hard provider upload limit.
pub const MAX_SEGMENT_BYTES: usize = 5_242_880;

/// Most segments tried per identification.
pub const MAX_SEGMENTS: usize = 3;

/// A half-open byte range `[start, end)` into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position in try order
    pub ordinal: usize,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    fn new(ordinal: usize, start: usize, end: usize) -> Self {
        Self { ordinal, start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The bytes this segment covers.
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.start..self.end]
    }
}

/// Plan the segments to try for a container of `len` bytes.
pub fn plan(len: usize) -> Vec<Segment> {
    if len == 0 {
        return Vec::new();
    }
    if len <= OPTIMAL_SEGMENT_BYTES {
        return vec![Segment::new(1, 0, len)];
    }

    match len.div_ceil(OPTIMAL_SEGMENT_BYTES).min(MAX_SEGMENTS) {
        1 => vec![Segment::new(1, 0, len.min(MAX_SEGMENT_BYTES))],
        2 => vec![
            Segment::new(1, 0, OPTIMAL_SEGMENT_BYTES.min(len)),
            Segment::new(
                2,
                (len - OPTIMAL_SEGMENT_BYTES).max(OPTIMAL_SEGMENT_BYTES),
                len,
            ),
        ],
        _ => {
            let mid = (len - OPTIMAL_SEGMENT_BYTES) / 2;
            vec![
                Segment::new(1, 0, OPTIMAL_SEGMENT_BYTES),
                Segment::new(2, mid, mid + OPTIMAL_SEGMENT_BYTES),
                Segment::new(3, len - OPTIMAL_SEGMENT_BYTES, len),
            ]
        }
    }
}
