//! Track recognition - identifies captured audio through a remote fingerprint provider.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - `Recognition`, credentials and errors
//! - **Segment planning** (`segment.rs`) - which byte ranges of a container to submit
//! - **Signing** (`signing.rs`) - HMAC request signing with an injectable clock
//! - **Provider** (`acrcloud/`) - response DTOs, adapter and HTTP client
//! - **Client** (`client.rs`) - sequential per-segment state machine
//! - **Service** (`service.rs`) - the `Recognizer` entry point
//! - **Fallback** (`fallback.rs`) - placeholder and provenance labels for callers
//!
//! # Usage
//!
//! ```ignore
//! use recognition::{Recognizer, fallback};
//!
//! let recognizer = Recognizer::from_config(&config);
//! let result = recognizer.identify(&samples, 44_100).await?;
//! let labeled = fallback::resolve(result);
//! println!("{} - {} ({})", labeled.recognition.artist, labeled.recognition.title, labeled.provenance);
//! ```

pub mod acrcloud;
pub mod client;
pub mod domain;
pub mod fallback;
pub mod segment;
pub mod service;
pub mod signing;
pub mod traits;

pub use domain::{ConfigurationError, Credentials, Recognition, RecognitionError};
pub use fallback::{LabeledRecognition, Provenance};
pub use service::{Recognizer, RecognizerOptions};
