//! Audio containers.
//!
//! Captured samples leave the capture layer as an [`AudioSnapshot`] and are
//! wrapped into a canonical mono 16-bit PCM WAV [`Container`] before they are
//! sent anywhere.
//!
//! [`AudioSnapshot`]: crate::capture::AudioSnapshot

pub mod wav;

pub use wav::{Container, WavError, decode, encode};
