//! Live microphone capture using cpal.
//!
//! The input callback runs on the platform's real-time audio thread. It only
//! down-mixes and pushes into a lock-free `rtrb` ring; the [`RingAccumulator`]
//! is filled on the caller's thread by [`LiveCapture::pump`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};

use super::{AudioSnapshot, CaptureError, RingAccumulator, downmix};

/// Seconds of audio the lock-free ring can hold between pumps.
const RING_SECONDS: usize = 2;

/// How often `record_for` drains the ring.
const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// A running input stream feeding a rolling buffer.
pub struct LiveCapture {
    stream: Option<Stream>,
    consumer: Consumer<f32>,
    accumulator: RingAccumulator,
    dropped: Arc<AtomicU64>,
    errored: Arc<AtomicBool>,
    device_name: String,
}

impl LiveCapture {
    /// Open an input device and start capturing.
    ///
    /// `device` selects an input by (case-insensitive) name; `None` or an empty
    /// name uses the host default.
    pub fn start(device: Option<&str>, max_duration: Duration) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = select_device(&host, device)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::Init(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();

        tracing::info!(
            "Capturing from {} ({}Hz, {} channels, {:?})",
            device_name,
            sample_rate,
            channels,
            supported.sample_format()
        );

        let config = StreamConfig {
            channels,
            sample_rate: supported.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let (producer, consumer) = RingBuffer::<f32>::new(sample_rate as usize * RING_SECONDS);
        let dropped = Arc::new(AtomicU64::new(0));
        let errored = Arc::new(AtomicBool::new(false));

        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, producer, &dropped, &errored),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, producer, &dropped, &errored),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, producer, &dropped, &errored),
            format => return Err(CaptureError::UnsupportedFormat(format!("{:?}", format))),
        }
        .map_err(|e| CaptureError::Init(e.to_string()))?;

        stream.play().map_err(|e| CaptureError::Init(e.to_string()))?;

        Ok(Self {
            stream: Some(stream),
            consumer,
            accumulator: RingAccumulator::new(sample_rate, max_duration),
            dropped,
            errored,
            device_name,
        })
    }

    /// Move everything queued by the callback into the rolling buffer.
    ///
    /// Returns the number of samples moved.
    pub fn pump(&mut self) -> usize {
        drain_into(&mut self.consumer, &mut self.accumulator)
    }

    /// Capture for `duration` (bounded by the retention window), pumping as we go.
    pub fn record_for(&mut self, duration: Duration) {
        let Some(deadline) = Instant::now().checked_add(duration.min(self.accumulator.max_duration()))
        else {
            return;
        };
        while Instant::now() < deadline {
            std::thread::sleep(PUMP_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
            self.pump();
            if self.has_error() {
                tracing::warn!("Capture stream reported an error, stopping early");
                break;
            }
        }
        self.pump();
    }

    /// Owned copy of the most recent audio.
    pub fn snapshot(&mut self) -> Option<AudioSnapshot> {
        self.pump();
        self.accumulator.snapshot()
    }

    /// Discard everything captured so far.
    pub fn clear(&mut self) {
        self.pump();
        self.accumulator.clear();
    }

    /// Stop the input stream. Already-buffered audio stays available.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::debug!("Failed to pause input stream: {}", e);
            }
            drop(stream);
            self.pump();

            let dropped = self.dropped_samples();
            if dropped > 0 {
                tracing::warn!("Capture ring overflowed, {} samples dropped", dropped);
            }
            tracing::info!("Stopped capture on {}", self.device_name);
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.accumulator.sample_rate()
    }

    /// Buffered audio length.
    pub fn buffered(&self) -> Duration {
        self.accumulator.duration()
    }

    /// Samples lost because the ring was full when the callback ran.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn has_error(&self) -> bool {
        self.errored.load(Ordering::Relaxed)
    }
}

impl Drop for LiveCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Names of all available input devices.
pub fn input_device_names() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::Init(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

fn select_device(host: &cpal::Host, wanted: Option<&str>) -> Result<Device, CaptureError> {
    match wanted.filter(|name| !name.is_empty()) {
        Some(name) => {
            let wanted_lower = name.to_lowercase();
            host.input_devices()
                .map_err(|e| CaptureError::Init(e.to_string()))?
                .find(|d| {
                    d.name()
                        .map(|n| n.to_lowercase().contains(&wanted_lower))
                        .unwrap_or(false)
                })
                .ok_or_else(|| CaptureError::DeviceNotFound(name.to_string()))
        }
        None => host.default_input_device().ok_or(CaptureError::NoDevice),
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut producer: Producer<f32>,
    dropped: &Arc<AtomicU64>,
    errored: &Arc<AtomicBool>,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let dropped = Arc::clone(dropped);
    let errored = Arc::clone(errored);

    // Reused across callbacks so the steady state does not allocate
    let mut converted: Vec<f32> = Vec::with_capacity(8192);
    let mut mono: Vec<f32> = Vec::with_capacity(8192);

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            converted.clear();
            converted.extend(data.iter().map(|&s| f32::from_sample(s)));
            downmix(&converted, channels, &mut mono);
            let lost = push_mono(&mut producer, &mono);
            if lost > 0 {
                dropped.fetch_add(lost as u64, Ordering::Relaxed);
            }
        },
        move |err| {
            tracing::error!("Capture stream error: {}", err);
            errored.store(true, Ordering::Relaxed);
        },
        None,
    )
}

/// Push as much as fits; returns how many samples did not.
fn push_mono(producer: &mut Producer<f32>, mono: &[f32]) -> usize {
    let n = mono.len().min(producer.slots());
    if let Ok(chunk) = producer.write_chunk_uninit(n) {
        chunk.fill_from_iter(mono.iter().copied());
    }
    mono.len() - n
}

fn drain_into(consumer: &mut Consumer<f32>, accumulator: &mut RingAccumulator) -> usize {
    let available = consumer.slots();
    if available == 0 {
        return 0;
    }
    match consumer.read_chunk(available) {
        Ok(chunk) => {
            let (first, second) = chunk.as_slices();
            accumulator.push(first);
            accumulator.push(second);
            chunk.commit_all();
            available
        }
        Err(_) => 0,
    }
}
