//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`CaptureError`], [`WavError`]) for detailed handling
//! - Per-segment recognition failures never show up here; only a missing
//!   credential escapes the recognizer
//!
//! # Example
//!
//! ```ignore
//! use earshot::error::{Result, ResultExt};
//!
//! fn save_capture(snapshot: &AudioSnapshot, path: &Path) -> Result<()> {
//!     wav::encode(snapshot).write_to(path).with_context("writing capture")?;
//!     Ok(())
//! }
//! ```

use crate::audio::WavError;
use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::recognition::ConfigurationError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV container error
    #[error("WAV error: {0}")]
    Wav(#[from] WavError),

    /// Audio capture or decode error
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Config file error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Provider credentials missing
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, CaptureError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Capture(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err: Error = ConfigurationError::MissingCredential("access_key").into();
        assert!(err.to_string().contains("access_key"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::from(WavError::TooShort(3)).context("while checking recording");
        let msg = err.to_string();
        assert!(msg.contains("while checking recording"));
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let with_ctx = result.with_context("writing sample.wav");
        let msg = with_ctx.unwrap_err().to_string();
        assert!(msg.contains("writing sample.wav"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::from(CaptureError::NoDevice));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }
}
